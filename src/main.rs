mod agent_client;
mod cli;
mod config;
mod message;
mod normalize;

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use crate::agent_client::AgentClient;
use crate::cli::chat::ChatContext;
use crate::config::AgentConfig;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Send a single question, print the reply and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Agent endpoint URL (overrides AGENT_API_URL)
    #[arg(long)]
    endpoint: Option<String>,

    /// Seconds to wait for the agent before giving up
    #[arg(long)]
    timeout: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = match AgentConfig::from_env()
        .and_then(|config| config.with_overrides(cli.endpoint.as_deref(), cli.timeout))
    {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            eprintln!("Failed to load agent configuration: {:#}", e);
            return Ok(ExitCode::FAILURE);
        }
    };

    info!(endpoint = %config.endpoint, timeout = ?config.timeout, "Starting agent chat");

    let client = Arc::new(AgentClient::from_config(&config)?);
    let interactive = cli.input.is_none() && io::stdout().is_terminal();

    let mut chat_context = ChatContext::new(Box::new(io::stdout()), cli.input, interactive, client);
    chat_context.run().await
}

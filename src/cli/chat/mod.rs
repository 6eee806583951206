pub mod categories;
pub mod command;
pub mod conversation;
pub mod conversation_state;
pub mod prompt;
pub mod render;

use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use command::Command;
use conversation::Conversation;
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use eyre::Result;
use prompt::generate_prompt;
use tracing::error;

use crate::agent_client::AgentClient;

const HELP_TEXT: &str = "
HC Demo Agent

/new              Start a new session
/categories       List the example prompt categories
/category <name>  Switch the active category
/examples         Show example prompts for the active category
/example <n>      Ask example prompt number <n>
/help             Show this help dialogue
/quit             Quit the application
";

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation: Conversation,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        client: Arc<AgentClient>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation: Conversation::new(client),
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Single query, print the reply and leave
        if let Some(input) = self.input.take() {
            if !self.submit(&input).await? {
                writeln!(self.output, "Nothing to send.")?;
                return Ok(ExitCode::FAILURE);
            }
            if let Some(reply) = self.conversation.state().messages().last() {
                writeln!(self.output, "{}", reply.content)?;
            }
            return Ok(ExitCode::SUCCESS);
        }

        self.run_interactive().await?;
        Ok(ExitCode::SUCCESS)
    }

    fn redraw(&mut self) -> Result<()> {
        let stats = self.conversation.client().cache_stats();
        let state = self.conversation.state();
        render::full_view(self.output.as_mut(), state, stats, self.interactive)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;
        self.redraw()?;

        loop {
            let prompt_text = generate_prompt(self.conversation.state().active_category());
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    match self.handle_input(&line).await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            error!("Failed to handle input: {}", e);
                            writeln!(self.output, "Error: {}", e)?;
                        }
                    }
                }
                Err(rustyline::error::ReadlineError::Interrupted | rustyline::error::ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    /// Returns `false` when the user asked to quit.
    async fn handle_input(&mut self, input: &str) -> Result<bool> {
        match Command::parse(input) {
            Command::Help => writeln!(self.output, "{}", HELP_TEXT)?,
            Command::Quit => return Ok(false),
            Command::NewSession => {
                self.conversation.reset();
                self.redraw()?;
            }
            Command::Categories => {
                let active = self.conversation.state().active_category().to_string();
                render::category_list(self.output.as_mut(), &active)?;
            }
            Command::Category(name) => {
                self.conversation.set_category(name)?;
                let active = self.conversation.state().active_category().to_string();
                render::example_list(self.output.as_mut(), &active)?;
            }
            Command::Examples => {
                let active = self.conversation.state().active_category().to_string();
                render::example_list(self.output.as_mut(), &active)?;
            }
            Command::Example(n) => {
                let Self { output, conversation, interactive, .. } = self;
                let work = conversation.submit_example(n);
                if with_indicator(output.as_mut(), *interactive, work).await?? {
                    self.redraw()?;
                }
            }
            Command::Prompt(text) => {
                if self.submit(text).await? {
                    self.redraw()?;
                }
            }
            Command::Invalid(message) => writeln!(self.output, "{}", message)?,
        }

        Ok(true)
    }

    async fn submit(&mut self, text: &str) -> Result<bool> {
        let Self { output, conversation, interactive, .. } = self;
        with_indicator(output.as_mut(), *interactive, conversation.submit(text)).await
    }
}

/// Animate a spinner on the current line until `work` finishes.
/// Without a terminal the work is awaited silently.
async fn with_indicator<F: Future>(out: &mut dyn Write, animate: bool, work: F) -> Result<F::Output> {
    if !animate {
        return Ok(work.await);
    }

    tokio::pin!(work);
    let mut ticker = tokio::time::interval(Duration::from_millis(120));
    let mut tick = 0;

    let output = loop {
        tokio::select! {
            output = &mut work => break output,
            _ = ticker.tick() => {
                let frame = SPINNER_FRAMES[tick % SPINNER_FRAMES.len()];
                write!(out, "\r{} Agent is thinking...", frame)?;
                out.flush()?;
                tick += 1;
            }
        }
    };

    out.queue(MoveToColumn(0))?.queue(Clear(ClearType::CurrentLine))?;
    out.flush()?;
    Ok(output)
}

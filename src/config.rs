use std::env;
use std::time::Duration;

use eyre::{Result, WrapErr, eyre};
use url::Url;

pub const API_URL_VAR: &str = "AGENT_API_URL";
pub const API_TOKEN_VAR: &str = "AGENT_API_TOKEN";
pub const TIMEOUT_VAR: &str = "AGENT_TIMEOUT_SECS";
pub const CACHE_TTL_VAR: &str = "AGENT_CACHE_TTL_SECS";

/// Hard ceiling on how long a single agent call may take.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(180);

/// How long an agent reply is reused for an identical conversation.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

/// Connection settings for the agent endpoint.
#[derive(Clone)]
pub struct AgentConfig {
    pub endpoint: Url,
    pub token: String,
    pub timeout: Duration,
    pub cache_ttl: Duration,
}

impl std::fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}

impl AgentConfig {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let endpoint = lookup(API_URL_VAR)
            .ok_or_else(|| eyre!("{} environment variable not set", API_URL_VAR))?;
        let endpoint = parse_endpoint(&endpoint)?;

        let token = lookup(API_TOKEN_VAR)
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| eyre!("{} environment variable not set", API_TOKEN_VAR))?;

        let timeout = parse_secs(&lookup, TIMEOUT_VAR)?.unwrap_or(DEFAULT_TIMEOUT);
        let cache_ttl = parse_secs(&lookup, CACHE_TTL_VAR)?.unwrap_or(DEFAULT_CACHE_TTL);

        Ok(Self {
            endpoint,
            token,
            timeout,
            cache_ttl,
        })
    }

    /// Apply command line overrides on top of the loaded values.
    pub fn with_overrides(mut self, endpoint: Option<&str>, timeout_secs: Option<u64>) -> Result<Self> {
        if let Some(endpoint) = endpoint {
            self.endpoint = parse_endpoint(endpoint)?;
        }
        if let Some(secs) = timeout_secs {
            self.timeout = Duration::from_secs(secs);
        }
        Ok(self)
    }
}

fn parse_endpoint(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).wrap_err_with(|| format!("invalid agent endpoint: {}", raw))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(eyre!("unsupported endpoint scheme: {}", other)),
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<Duration>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => {
            let secs: u64 = raw
                .trim()
                .parse()
                .wrap_err_with(|| format!("{} must be a whole number of seconds", key))?;
            Ok(Some(Duration::from_secs(secs)))
        }
        None => Ok(None),
    }
}

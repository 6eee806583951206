use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AgentConfig;
use crate::message::{ConversationId, Message};

/// Failures talking to the agent. These never reach the caller of
/// [`AgentClient::get_reply`]; they are turned into an `{"error": ...}` reply.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Transport(reqwest::Error),
    #[error("agent returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("response was not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Something that can deliver a request body to the agent.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    async fn post(&self, body: &Value) -> Result<Value, AgentError>;
}

/// Sends requests over HTTPS with a bearer token.
pub struct HttpTransport {
    endpoint: Url,
    token: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: &AgentConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            timeout: config.timeout,
            client,
        })
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn post(&self, body: &Value) -> Result<Value, AgentError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            return Err(AgentError::Status { status, body: text });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

impl HttpTransport {
    fn classify(&self, err: reqwest::Error) -> AgentError {
        if err.is_timeout() {
            AgentError::Timeout(self.timeout)
        } else {
            AgentError::Transport(err)
        }
    }
}

#[derive(Serialize)]
struct AgentRequest<'a> {
    session_id: ConversationId,
    messages: &'a [Message],
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    conversation_id: ConversationId,
    messages: Vec<Message>,
}

struct CacheEntry {
    reply: Value,
    expires_at: Instant,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Default)]
struct ReplyCache {
    entries: HashMap<CacheKey, CacheEntry>,
    hits: u64,
    misses: u64,
}

impl ReplyCache {
    fn get(&mut self, key: &CacheKey, now: Instant) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.expires_at > now => {
                self.hits += 1;
                Some(entry.reply.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    fn insert(&mut self, key: CacheKey, reply: Value, now: Instant, ttl: Duration) {
        self.entries.retain(|_, entry| entry.expires_at > now);
        self.entries.insert(
            key,
            CacheEntry {
                reply,
                expires_at: now + ttl,
            },
        );
    }
}

/// Calls the agent and memoizes replies per (conversation, message sequence).
pub struct AgentClient<T = HttpTransport> {
    transport: T,
    ttl: Duration,
    cache: Mutex<ReplyCache>,
}

impl AgentClient<HttpTransport> {
    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Ok(Self::new(HttpTransport::new(config)?, config.cache_ttl))
    }
}

impl<T: AgentTransport> AgentClient<T> {
    pub fn new(transport: T, ttl: Duration) -> Self {
        Self {
            transport,
            ttl,
            cache: Mutex::new(ReplyCache::default()),
        }
    }

    /// Get the agent's reply for the full conversation so far.
    ///
    /// Transport, status and decoding failures come back as
    /// `{"error": "Error communicating with agent: ..."}`.
    pub async fn get_reply(&self, conversation_id: ConversationId, messages: &[Message]) -> Value {
        let key = CacheKey {
            conversation_id,
            messages: messages.to_vec(),
        };

        if let Some(reply) = self.lock_cache().get(&key, Instant::now()) {
            info!(%conversation_id, turns = messages.len(), "Serving agent reply from cache");
            return reply;
        }

        let request = AgentRequest {
            session_id: conversation_id,
            messages,
        };
        let body = json!([request]);
        debug!("Sending request to agent: {}", body);

        let reply = match self.transport.post(&body).await {
            Ok(reply) => {
                debug!("Received response from agent: {}", reply);
                reply
            }
            Err(e) => {
                warn!(%conversation_id, "Agent request failed: {}", e);
                json!({ "error": format!("Error communicating with agent: {}", e) })
            }
        };

        self.lock_cache()
            .insert(key, reply.clone(), Instant::now(), self.ttl);
        reply
    }

    pub fn cache_stats(&self) -> CacheStats {
        let now = Instant::now();
        let cache = self.lock_cache();
        CacheStats {
            hits: cache.hits,
            misses: cache.misses,
            entries: cache.entries.values().filter(|e| e.expires_at > now).count(),
        }
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ReplyCache> {
        // The cache holds no invariants a panicking writer could break.
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

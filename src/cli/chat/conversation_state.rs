use chrono::{DateTime, Local};
use serde_json::Value;

use super::categories::DEFAULT_CATEGORY;
use crate::message::{ConversationId, Message, Role};

/// Everything the chat screen knows about one conversation.
pub struct ConversationState {
    conversation_id: ConversationId,
    messages: Vec<Message>,
    active_category: String,
    raw_response: Option<Value>,
    raw_response_at: Option<DateTime<Local>>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            conversation_id: ConversationId::generate(),
            messages: Vec::new(),
            active_category: DEFAULT_CATEGORY.to_string(),
            raw_response: None,
            raw_response_at: None,
        }
    }

    /// Create the state in `slot` unless it already holds one.
    pub fn initialize(slot: &mut Option<Self>) -> &mut Self {
        slot.get_or_insert_with(Self::new)
    }

    /// Start over with a fresh conversation id and an empty transcript.
    pub fn reset(&mut self) {
        let previous = self.conversation_id;
        self.conversation_id = loop {
            let id = ConversationId::generate();
            if id != previous {
                break id;
            }
        };
        self.messages.clear();
        self.raw_response = None;
        self.raw_response_at = None;
    }

    pub fn append_message(&mut self, role: Role, content: &str) {
        self.messages.push(Message::new(role, content));
    }

    pub fn set_raw_response(&mut self, value: Value) {
        self.raw_response = Some(value);
        self.raw_response_at = Some(Local::now());
    }

    pub fn set_active_category(&mut self, label: &str) {
        self.active_category = label.to_string();
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn active_category(&self) -> &str {
        &self.active_category
    }

    pub fn raw_response(&self) -> Option<&Value> {
        self.raw_response.as_ref()
    }

    pub fn raw_response_at(&self) -> Option<DateTime<Local>> {
        self.raw_response_at
    }
}

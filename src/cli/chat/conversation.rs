use std::sync::Arc;

use eyre::{Result, eyre};
use tracing::info;

use super::categories;
use super::conversation_state::ConversationState;
use crate::agent_client::{AgentClient, AgentTransport, HttpTransport};
use crate::message::Role;
use crate::normalize::normalize;

/// Drives one conversation: records turns and asks the agent for replies.
pub struct Conversation<T = HttpTransport> {
    client: Arc<AgentClient<T>>,
    state: Option<ConversationState>,
}

impl<T: AgentTransport> Conversation<T> {
    pub fn new(client: Arc<AgentClient<T>>) -> Self {
        Self { client, state: None }
    }

    /// The conversation state, created on first use.
    pub fn state(&mut self) -> &mut ConversationState {
        ConversationState::initialize(&mut self.state)
    }

    pub fn client(&self) -> &AgentClient<T> {
        &self.client
    }

    /// Send `prompt` to the agent and record both sides of the turn.
    ///
    /// Blank prompts are ignored. Returns whether a turn was taken.
    pub async fn submit(&mut self, prompt: &str) -> bool {
        if prompt.trim().is_empty() {
            return false;
        }

        let state = ConversationState::initialize(&mut self.state);
        state.append_message(Role::User, prompt);

        let reply = self
            .client
            .get_reply(state.conversation_id(), state.messages())
            .await;

        let text = normalize(&reply);
        state.set_raw_response(reply);
        state.append_message(Role::Assistant, &text);
        true
    }

    /// Submit the example prompt at `index` (1-based) of the active category.
    pub async fn submit_example(&mut self, index: usize) -> Result<bool> {
        let category = self.state().active_category().to_string();
        let examples = categories::find(&category)
            .map(|c| c.examples)
            .unwrap_or_default();

        let prompt = index
            .checked_sub(1)
            .and_then(|i| examples.get(i))
            .ok_or_else(|| eyre!("No example {} in category '{}'", index, category))?;

        Ok(self.submit(prompt).await)
    }

    pub fn set_category(&mut self, name: &str) -> Result<()> {
        let category = categories::find(name).ok_or_else(|| eyre!("Unknown category: {}", name.trim()))?;
        self.state().set_active_category(category.name);
        Ok(())
    }

    pub fn reset(&mut self) {
        let state = self.state();
        state.reset();
        info!(conversation_id = %state.conversation_id(), "Started a new session");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::agent_client::AgentError;
    use crate::agent_client::testing::MockTransport;
    use crate::message::Message;
    use crate::normalize::WARNING_MARKER;

    fn conversation(transport: &MockTransport) -> Conversation<MockTransport> {
        let client = AgentClient::new(transport.clone(), Duration::from_secs(600));
        Conversation::new(Arc::new(client))
    }

    #[tokio::test]
    async fn test_blank_prompts_are_ignored() {
        let transport = MockTransport::new();
        let mut chat = conversation(&transport);

        assert!(!chat.submit("").await);
        assert!(!chat.submit("   ").await);
        assert!(!chat.submit("\n\t").await);

        assert!(chat.state().messages().is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_hello_round_trip() {
        let transport = MockTransport::new().reply_with(json!({"response": "Hi there"}));
        let mut chat = conversation(&transport);

        assert!(chat.submit("Hello").await);

        let state = chat.state();
        assert_eq!(
            state.messages(),
            [
                Message::new(Role::User, "Hello"),
                Message::new(Role::Assistant, "Hi there"),
            ]
        );
        assert_eq!(state.raw_response(), Some(&json!({"response": "Hi there"})));
    }

    #[tokio::test]
    async fn test_timeout_becomes_warning_message() {
        let transport = MockTransport::new().fail_with(AgentError::Timeout(Duration::from_secs(180)));
        let mut chat = conversation(&transport);

        chat.submit("Hello").await;

        let reply = &chat.state().messages()[1];
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.starts_with(WARNING_MARKER));
        assert!(reply.content.contains("Error communicating with agent"));
    }

    #[tokio::test]
    async fn test_prompt_is_stored_untrimmed_and_history_is_resent() {
        let transport = MockTransport::new()
            .reply_with(json!({"answer": "first"}))
            .reply_with(json!([{"message": "second"}]));
        let mut chat = conversation(&transport);

        chat.submit("  Hello ").await;
        chat.submit("More").await;

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(
            requests[1][0]["messages"],
            json!([
                {"sl_role": "USER", "content": "  Hello "},
                {"sl_role": "ASSISTANT", "content": "first"},
                {"sl_role": "USER", "content": "More"}
            ])
        );
        assert_eq!(chat.state().messages()[3].content, "second");
        assert_eq!(chat.state().raw_response(), Some(&json!([{"message": "second"}])));
    }

    #[tokio::test]
    async fn test_reset_starts_fresh_session() {
        let transport = MockTransport::new();
        let mut chat = conversation(&transport);
        chat.submit("Hello").await;
        let previous = chat.state().conversation_id();

        chat.reset();

        let state = chat.state();
        assert_ne!(state.conversation_id(), previous);
        assert!(state.messages().is_empty());
        assert!(state.raw_response().is_none());
    }

    #[tokio::test]
    async fn test_sessions_sharing_a_client_stay_isolated() {
        let transport = MockTransport::new()
            .reply_with(json!({"response": "for alice"}))
            .reply_with(json!({"response": "for bob"}));
        let client = Arc::new(AgentClient::new(transport.clone(), Duration::from_secs(600)));
        let mut alice = Conversation::new(Arc::clone(&client));
        let mut bob = Conversation::new(client);

        alice.submit("Hello").await;
        bob.submit("Hello").await;

        assert_eq!(transport.calls(), 2);
        assert_eq!(alice.state().messages()[1].content, "for alice");
        assert_eq!(bob.state().messages()[1].content, "for bob");
    }

    #[tokio::test]
    async fn test_examples_and_categories() {
        let transport = MockTransport::new();
        let mut chat = conversation(&transport);

        chat.set_category("certification status").unwrap();
        assert_eq!(chat.state().active_category(), "Certification Status");
        assert!(chat.set_category("Weather").is_err());

        assert!(chat.submit_example(2).await.unwrap());
        assert_eq!(
            chat.state().messages()[0].content,
            "List certifications expiring in the next 90 days."
        );

        assert!(chat.submit_example(0).await.is_err());
        assert!(chat.submit_example(99).await.is_err());
        assert_eq!(transport.calls(), 1);
    }
}

use std::io::Write;

use color_print::cwriteln;
use crossterm::cursor::MoveTo;
use crossterm::QueueableCommand;
use crossterm::terminal::{Clear, ClearType};
use eyre::Result;

use super::categories::{self, CATEGORIES};
use super::conversation_state::ConversationState;
use crate::agent_client::CacheStats;
use crate::message::{Message, Role};

pub const TITLE: &str = "🤖 HC Demo Agent";
pub const DESCRIPTION: &str = "Ask questions and explore example prompts for different use case categories.";
pub const NO_RESPONSE_YET: &str = "No API response yet. Start by asking a question.";

/// Redraw the whole screen from the current state.
pub fn full_view(
    out: &mut dyn Write,
    state: &ConversationState,
    stats: CacheStats,
    clear: bool,
) -> Result<()> {
    if clear {
        out.queue(Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
    }
    header(out)?;
    session_panel(out, state, stats)?;
    transcript(out, state.messages())?;
    out.flush()?;
    Ok(())
}

pub fn header(out: &mut dyn Write) -> Result<()> {
    cwriteln!(out, "<bold>{}</>", TITLE)?;
    writeln!(out, "{}", DESCRIPTION)?;
    writeln!(out)?;
    Ok(())
}

pub fn session_panel(
    out: &mut dyn Write,
    state: &ConversationState,
    stats: CacheStats,
) -> Result<()> {
    cwriteln!(out, "<dim>──── 🔧 Session ────</>")?;
    cwriteln!(out, "<bold>Session ID</>  {}", state.conversation_id())?;
    cwriteln!(out, "<bold>Category</>    {}", state.active_category())?;
    cwriteln!(
        out,
        "<bold>Cache</>       {} live, {} hits, {} misses",
        stats.entries,
        stats.hits,
        stats.misses
    )?;

    writeln!(out)?;
    cwriteln!(out, "<bold>Raw API Response</>")?;
    raw_response(out, state)?;

    cwriteln!(out, "<dim>───────────────────</>")?;
    writeln!(out)?;
    Ok(())
}

pub fn raw_response(out: &mut dyn Write, state: &ConversationState) -> Result<()> {
    match (state.raw_response(), state.raw_response_at()) {
        (Some(value), received) => {
            if let Some(at) = received {
                cwriteln!(out, "<dim>received {}</>", at.format("%H:%M:%S"))?;
            }
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
        }
        (None, _) => writeln!(out, "{}", NO_RESPONSE_YET)?,
    }
    Ok(())
}

pub fn transcript(out: &mut dyn Write, messages: &[Message]) -> Result<()> {
    cwriteln!(out, "<bold>Chat with Agent</>")?;
    for message in messages {
        self::message(out, message)?;
    }
    Ok(())
}

pub fn message(out: &mut dyn Write, message: &Message) -> Result<()> {
    match message.role {
        Role::User => cwriteln!(out, "<cyan,bold>{}</>", message.role.label())?,
        Role::Assistant => cwriteln!(out, "<green,bold>{}</>", message.role.label())?,
    }
    writeln!(out, "{}", message.content)?;
    writeln!(out)?;
    Ok(())
}

pub fn category_list(out: &mut dyn Write, active: &str) -> Result<()> {
    for category in CATEGORIES {
        if category.name == active {
            cwriteln!(out, "<green>* {}</>", category.name)?;
        } else {
            writeln!(out, "  {}", category.name)?;
        }
    }
    Ok(())
}

pub fn example_list(out: &mut dyn Write, active: &str) -> Result<()> {
    let Some(category) = categories::find(active) else {
        writeln!(out, "No examples for category '{}'.", active)?;
        return Ok(());
    };

    cwriteln!(out, "<bold>{}</>", category.name)?;
    for (i, example) in category.examples.iter().enumerate() {
        writeln!(out, "  {}. {}", i + 1, example)?;
    }
    writeln!(out, "Use /example <n> to ask one.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(state: &ConversationState) -> String {
        let mut out = Vec::new();
        full_view(&mut out, state, CacheStats::default(), false).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_view_order_and_placeholder() {
        let mut state = ConversationState::new();
        state.append_message(Role::User, "Hello");
        state.append_message(Role::Assistant, "Hi there");

        let view = render(&state);

        let title = view.find(TITLE).unwrap();
        let id = view.find(&state.conversation_id().to_string()).unwrap();
        let placeholder = view.find(NO_RESPONSE_YET).unwrap();
        let hello = view.find("Hello").unwrap();
        let reply = view.find("Hi there").unwrap();
        assert!(title < id && id < placeholder && placeholder < hello && hello < reply);
    }

    #[test]
    fn test_raw_response_replaces_placeholder() {
        let mut state = ConversationState::new();
        state.set_raw_response(json!({"response": "Hi there", "trace_id": "abc-123"}));

        let view = render(&state);
        assert!(view.contains("\"trace_id\": \"abc-123\""));
        assert!(view.contains("received "));
        assert!(!view.contains(NO_RESPONSE_YET));
    }

    #[test]
    fn test_example_list_numbers_prompts() {
        let mut out = Vec::new();
        example_list(&mut out, "Service History").unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("1. Show the last five service visits"));
        assert!(text.contains("2. What were the most common failure codes"));
        assert!(text.contains("/example <n>"));
    }
}

//! Prompt assembly from local chat history.
//!
//! The managed agent keeps its own session memory, but replaying a short
//! window of the conversation keeps follow-up questions answerable when a
//! session expires.

use kbintake_core::constants::CONVERSATION_HISTORY_WINDOW;
use kbintake_core::format::text_preview;
use kbintake_core::models::{ChatMessage, Role};
use std::fmt::{Display, Formatter, Result as FmtResult};

const TOPIC_PREVIEW_CHARS: usize = 50;
const RECENT_TOPICS: usize = 3;

/// Render the prompt sent to the agent.
///
/// Takes the last [`CONVERSATION_HISTORY_WINDOW`] messages of `history`,
/// drops system and context messages, and renders the rest as
/// `User: ...` / `Assistant: ...` blocks followed by the current input. With
/// no usable history the input is returned unchanged.
pub fn build_conversation_context(history: &[ChatMessage], current_input: &str) -> String {
    let start = history.len().saturating_sub(CONVERSATION_HISTORY_WINDOW);

    let mut parts: Vec<String> = history[start..]
        .iter()
        .filter(|msg| !msg.is_context)
        .filter_map(|msg| match msg.role {
            Role::User => Some(format!("User: {}", msg.content)),
            Role::Assistant => Some(format!("Assistant: {}", msg.content)),
            Role::System => None,
        })
        .collect();

    if parts.is_empty() {
        return current_input.to_string();
    }

    parts.push(format!("User: {}", current_input));
    parts.join("\n\n")
}

/// Short description of a conversation so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub user_messages: usize,
    pub assistant_messages: usize,
    /// Previews of the most recent user messages, oldest first.
    pub recent_topics: Vec<String>,
}

pub fn conversation_summary(history: &[ChatMessage]) -> ConversationSummary {
    let user: Vec<&ChatMessage> = history
        .iter()
        .filter(|msg| msg.role == Role::User && !msg.is_context)
        .collect();
    let assistant_messages = history
        .iter()
        .filter(|msg| msg.role == Role::Assistant)
        .count();

    let recent_topics = user[user.len().saturating_sub(RECENT_TOPICS)..]
        .iter()
        .map(|msg| text_preview(&msg.content, TOPIC_PREVIEW_CHARS))
        .collect();

    ConversationSummary {
        user_messages: user.len(),
        assistant_messages,
        recent_topics,
    }
}

impl Display for ConversationSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.user_messages == 0 && self.assistant_messages == 0 {
            return write!(f, "No previous conversation.");
        }

        write!(
            f,
            "Conversation has {} user messages and {} assistant responses.",
            self.user_messages, self.assistant_messages
        )?;

        if !self.recent_topics.is_empty() {
            write!(f, " Recent topics: {}", self.recent_topics.join(", "))?;
        }

        Ok(())
    }
}

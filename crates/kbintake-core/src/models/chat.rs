use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Internal context messages are kept in history but never replayed to the agent.
    #[serde(default)]
    pub is_context: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_context: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            is_context: false,
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
            is_context: false,
        }
    }

    pub fn context(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            is_context: true,
        }
    }
}

/// Source reference attached to an agent answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub text: String,
    pub source_uri: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentReply {
    pub text: String,
    #[serde(default)]
    pub citations: Vec<Citation>,
}

/// Which managed agent, and which alias of it, answers a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentTarget {
    pub agent_id: String,
    pub agent_alias_id: String,
}

/// A chat session: one id for the managed agent plus the local history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub session_id: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            messages: Vec::new(),
        }
    }

    /// Drop the history and start over with a fresh session id.
    pub fn reset(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
        self.messages.clear();
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_changes_session_id_and_clears_history() {
        let mut session = ChatSession::with_id("fixed");
        session.messages.push(ChatMessage::user("hi"));
        session.reset();
        assert_ne!(session.session_id, "fixed");
        assert!(session.messages.is_empty());
    }

    #[test]
    fn test_context_message_flag() {
        let msg = ChatMessage::context("file list");
        assert!(msg.is_context);
        assert_eq!(msg.role, Role::User);
    }
}

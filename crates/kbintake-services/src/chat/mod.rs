//! Conversations with the managed agent.

pub mod conversation;
mod service;

pub use conversation::{build_conversation_context, conversation_summary, ConversationSummary};
pub use service::{ChatService, ChatTurn};

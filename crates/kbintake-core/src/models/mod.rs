//! Data models for the application
//!
//! Upload models cover the intake path, chat and knowledge models describe what
//! flows to and from the managed agent and knowledge base, agent models describe
//! what the agent directory reports.

mod agent;
mod chat;
mod knowledge;
mod upload;

pub use agent::*;
pub use chat::*;
pub use knowledge::*;
pub use upload::*;

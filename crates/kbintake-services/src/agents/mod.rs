//! Discovery of the agents and aliases a conversation can target.

mod service;

pub use service::AgentCatalog;

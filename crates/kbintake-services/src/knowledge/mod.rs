//! Knowledge base retrieval and ingestion.

mod service;

pub use service::{KnowledgeService, DEFAULT_INGESTION_POLL_INTERVAL, DEFAULT_INGESTION_TIMEOUT};

//! kbintake services layer
//!
//! Orchestration on top of the pure core: validate-then-upload into object
//! storage, conversations with the managed agent, agent discovery, direct
//! knowledge base access and a connection check. Collaborators are held as
//! `Arc<dyn Trait>` so every service can be driven by in-memory doubles in
//! tests.

pub mod agent;
pub mod agents;
pub mod chat;
pub mod health;
pub mod intake;
pub mod knowledge;

#[cfg(feature = "bedrock")]
pub use agent::bedrock::BedrockClient;
pub use agent::{AgentDirectory, AgentRuntime, IngestionTrigger, KnowledgeBase};
pub use agents::AgentCatalog;
pub use chat::{ChatService, ChatTurn, ConversationSummary};
pub use health::{ConnectionCheck, DEFAULT_CHECK_TIMEOUT};
pub use intake::{IntakeService, SyncedUpload};
pub use knowledge::KnowledgeService;
#[cfg(feature = "storage-local")]
pub use kbintake_storage::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use kbintake_storage::S3Storage;
pub use kbintake_storage::{create_storage, Storage, StorageBackend, StorageError, StorageResult};

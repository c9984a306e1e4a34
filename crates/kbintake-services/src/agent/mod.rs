//! Managed agent, agent directory, knowledge base and ingestion collaborators
//!
//! The services only see these traits. The Bedrock-backed implementations live
//! in [`bedrock`] behind the `bedrock` feature; tests use in-memory mocks.

#[cfg(feature = "bedrock")]
pub mod bedrock;

use async_trait::async_trait;
use kbintake_core::models::{
    AgentAlias, AgentDetails, AgentReply, AgentSummary, AgentTarget, IngestionJob,
    RetrievedPassage,
};
use kbintake_core::AppError;

/// Conversational agent that answers with the knowledge base behind it.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Send one prompt within a session and collect the full reply.
    async fn invoke(
        &self,
        target: &AgentTarget,
        session_id: &str,
        text: &str,
    ) -> Result<AgentReply, AppError>;
}

/// Control-plane view of the agents available to the account.
#[async_trait]
pub trait AgentDirectory: Send + Sync {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, AppError>;

    /// `AppError::NotFound` when no agent has this id.
    async fn get_agent(&self, agent_id: &str) -> Result<AgentDetails, AppError>;

    async fn list_agent_aliases(&self, agent_id: &str) -> Result<Vec<AgentAlias>, AppError>;
}

/// Direct retrieval against a knowledge base, without the agent.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
        max_results: i32,
    ) -> Result<Vec<RetrievedPassage>, AppError>;
}

/// Re-indexing of a knowledge base data source.
#[async_trait]
pub trait IngestionTrigger: Send + Sync {
    /// Data source ids attached to the knowledge base, in service order.
    async fn list_data_sources(&self, knowledge_base_id: &str) -> Result<Vec<String>, AppError>;

    async fn start_ingestion(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, AppError>;

    async fn get_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> Result<IngestionJob, AppError>;
}

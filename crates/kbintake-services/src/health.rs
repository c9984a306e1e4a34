//! Connection check against the configured collaborators.

use crate::agent::AgentDirectory;
use crate::knowledge::KnowledgeService;
use kbintake_core::models::ConnectionReport;
use kbintake_storage::Storage;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

const HEALTHY: &str = "healthy";
const NOT_CONFIGURED: &str = "not_configured";

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}"
/// together with the check's value when it succeeded.
async fn run_check<F, T, E>(limit: Duration, f: F, error_prefix: &str) -> (String, Option<T>)
where
    F: Future<Output = Result<T, E>>,
    E: Display,
{
    match tokio::time::timeout(limit, f).await {
        Ok(Ok(value)) => (HEALTHY.to_string(), Some(value)),
        Ok(Err(e)) => (format!("{}: {}", error_prefix, e), None),
        Err(_) => ("timeout".to_string(), None),
    }
}

/// Collaborators to check. Anything left unset is reported as `not_configured`.
#[derive(Clone, Default)]
pub struct ConnectionCheck {
    region: Option<String>,
    storage: Option<Arc<dyn Storage>>,
    agents: Option<Arc<dyn AgentDirectory>>,
    knowledge: Option<KnowledgeService>,
}

impl ConnectionCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn Storage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_agents(mut self, agents: Arc<dyn AgentDirectory>) -> Self {
        self.agents = Some(agents);
        self
    }

    pub fn with_knowledge(mut self, knowledge: KnowledgeService) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    /// Check each configured collaborator once, each bounded by `limit`.
    ///
    /// Storage is checked by looking up a key that is never
    /// written, the agent directory by listing agents, and the knowledge base
    /// by resolving its data source.
    pub async fn run(&self, limit: Duration) -> ConnectionReport {
        let storage = match &self.storage {
            Some(storage) => {
                let storage = storage.clone();
                let check = async move { storage.exists("health-check-non-existent-key").await };
                run_check(limit, check, "degraded").await.0
            }
            None => NOT_CONFIGURED.to_string(),
        };

        let (agents, agent_count) = match &self.agents {
            Some(directory) => {
                let (status, agents) =
                    run_check(limit, directory.list_agents(), "unhealthy").await;
                (status, agents.map(|a| a.len()))
            }
            None => (NOT_CONFIGURED.to_string(), None),
        };

        let knowledge_base = match &self.knowledge {
            Some(knowledge) => {
                let check = async { knowledge.data_source_id().await.map(str::to_string) };
                run_check(limit, check, "unhealthy").await.0
            }
            None => NOT_CONFIGURED.to_string(),
        };

        let healthy = [&storage, &agents, &knowledge_base]
            .iter()
            .all(|s| s.as_str() == HEALTHY || s.as_str() == NOT_CONFIGURED);

        let report = ConnectionReport {
            status: if healthy { HEALTHY } else { "degraded" }.to_string(),
            region: self.region.clone(),
            storage,
            agents,
            agent_count,
            knowledge_base,
        };

        if report.is_healthy() {
            tracing::info!(
                storage = %report.storage,
                agents = %report.agents,
                knowledge_base = %report.knowledge_base,
                "Connection check passed"
            );
        } else {
            tracing::warn!(
                storage = %report.storage,
                agents = %report.agents,
                knowledge_base = %report.knowledge_base,
                "Connection check found problems"
            );
        }

        report
    }
}

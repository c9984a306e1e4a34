use crate::agent::AgentDirectory;
use kbintake_core::models::{AgentAlias, AgentProfile, AgentSummary};
use kbintake_core::AppError;
use std::cmp::Reverse;
use std::sync::Arc;

/// Read-only view over the agent directory, used to pick the agent and alias
/// ids a chat needs.
#[derive(Clone)]
pub struct AgentCatalog {
    directory: Arc<dyn AgentDirectory>,
}

impl AgentCatalog {
    pub fn new(directory: Arc<dyn AgentDirectory>) -> Self {
        Self { directory }
    }

    /// All agents, sorted by name.
    pub async fn list(&self) -> Result<Vec<AgentSummary>, AppError> {
        let mut agents = self
            .directory
            .list_agents()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to list agents"))?;
        agents.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.agent_id.cmp(&b.agent_id)));

        tracing::debug!(count = agents.len(), "Agents listed");
        Ok(agents)
    }

    /// Details of one agent together with its aliases, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn profile(&self, agent_id: &str) -> Result<AgentProfile, AppError> {
        let details = self.directory.get_agent(agent_id).await?;
        let mut aliases = self.directory.list_agent_aliases(agent_id).await?;
        sort_newest_first(&mut aliases);

        tracing::debug!(
            agent_status = %details.status,
            aliases = aliases.len(),
            "Agent profile loaded"
        );

        Ok(AgentProfile { details, aliases })
    }
}

/// Aliases without any timestamp sort last.
fn sort_newest_first(aliases: &mut [AgentAlias]) {
    aliases.sort_by_key(|alias| Reverse(alias.last_changed()));
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing entry for a managed agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub agent_id: String,
    pub name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Full configuration of one agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDetails {
    pub agent_id: String,
    pub name: String,
    pub arn: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_session_ttl_secs: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A named, deployable version pointer of an agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAlias {
    pub alias_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AgentAlias {
    /// Last update, or creation when the alias was never updated.
    pub fn last_changed(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// An agent with its aliases, newest alias first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub details: AgentDetails,
    pub aliases: Vec<AgentAlias>,
}

impl AgentProfile {
    /// The alias a new conversation should use by default.
    pub fn latest_alias(&self) -> Option<&AgentAlias> {
        self.aliases.first()
    }
}

/// Result of probing the configured collaborators.
///
/// Each entry is `"healthy"`, `"timeout"`, `"not_configured"` or a
/// `"degraded: ..."`/`"unhealthy: ..."` string carrying the failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub storage: String,
    pub agents: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_count: Option<usize>,
    pub knowledge_base: String,
}

impl ConnectionReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

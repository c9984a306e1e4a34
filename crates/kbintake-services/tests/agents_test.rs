//! Agent catalog and connection check tests.
//!
//! Run with: `cargo test -p kbintake-services --test agents_test`

mod helpers;

use chrono::{TimeZone, Utc};
use helpers::{MockAgentDirectory, MockKnowledgeBase, MockStorage};
use kbintake_core::models::{AgentAlias, AgentDetails};
use kbintake_core::AppError;
use kbintake_services::{AgentCatalog, ConnectionCheck, KnowledgeService, DEFAULT_CHECK_TIMEOUT};
use std::sync::Arc;

fn details(id: &str, name: &str) -> AgentDetails {
    AgentDetails {
        agent_id: id.to_string(),
        name: name.to_string(),
        arn: format!("arn:aws:bedrock:us-west-2:123456789012:agent/{}", id),
        status: "PREPARED".to_string(),
        foundation_model: Some("anthropic.claude-v2".to_string()),
        instruction: Some("Answer from the handbook.".to_string()),
        idle_session_ttl_secs: Some(600),
        created_at: None,
        updated_at: None,
    }
}

fn alias(id: &str, day: u32) -> AgentAlias {
    AgentAlias {
        alias_id: id.to_string(),
        name: format!("{}-name", id.to_lowercase()),
        status: Some("PREPARED".to_string()),
        created_at: Utc.with_ymd_and_hms(2024, 5, day, 9, 0, 0).single(),
        updated_at: None,
    }
}

fn directory() -> MockAgentDirectory {
    let directory = MockAgentDirectory::new();
    directory.add_agent(details("AG2", "support"), vec![alias("V1", 1), alias("V3", 20)]);
    directory.add_agent(details("AG1", "handbook"), Vec::new());
    directory
}

#[tokio::test]
async fn test_list_sorts_agents_by_name() {
    let catalog = AgentCatalog::new(Arc::new(directory()));

    let agents = catalog.list().await.unwrap();
    let names: Vec<&str> = agents.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["handbook", "support"]);
    assert_eq!(agents[1].agent_id, "AG2");
}

#[tokio::test]
async fn test_profile_puts_newest_alias_first() {
    let catalog = AgentCatalog::new(Arc::new(directory()));

    let profile = catalog.profile("AG2").await.unwrap();
    assert_eq!(profile.details.name, "support");
    let ids: Vec<&str> = profile.aliases.iter().map(|a| a.alias_id.as_str()).collect();
    assert_eq!(ids, vec!["V3", "V1"]);
    assert_eq!(profile.latest_alias().map(|a| a.alias_id.as_str()), Some("V3"));

    let profile = catalog.profile("AG1").await.unwrap();
    assert!(profile.latest_alias().is_none());
}

#[tokio::test]
async fn test_unknown_agent_is_not_found() {
    let catalog = AgentCatalog::new(Arc::new(directory()));

    let err = catalog.profile("NOPE").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_connection_check_reports_each_collaborator() {
    let kb = MockKnowledgeBase::new();
    kb.set_data_sources(&["DS-A"]);
    let knowledge =
        KnowledgeService::new(Arc::new(kb.clone()), Arc::new(kb.clone()), "KB123", None);

    let report = ConnectionCheck::new()
        .with_region(Some("us-west-2".to_string()))
        .with_storage(Arc::new(MockStorage::new()))
        .with_agents(Arc::new(directory()))
        .with_knowledge(knowledge)
        .run(DEFAULT_CHECK_TIMEOUT)
        .await;

    assert!(report.is_healthy());
    assert_eq!(report.storage, "healthy");
    assert_eq!(report.agents, "healthy");
    assert_eq!(report.agent_count, Some(2));
    assert_eq!(report.knowledge_base, "healthy");
    assert_eq!(report.region.as_deref(), Some("us-west-2"));
}

#[tokio::test]
async fn test_connection_check_degrades_on_failure() {
    let report = ConnectionCheck::new()
        .with_storage(Arc::new(MockStorage::new()))
        .with_agents(Arc::new(MockAgentDirectory::failing()))
        .run(DEFAULT_CHECK_TIMEOUT)
        .await;

    assert!(!report.is_healthy());
    assert_eq!(report.status, "degraded");
    assert!(report.agents.starts_with("unhealthy: "));
    assert!(report.agents.contains("UnrecognizedClientException"));
    assert_eq!(report.agent_count, None);
    assert_eq!(report.knowledge_base, "not_configured");
}

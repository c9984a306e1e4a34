//! In-memory collaborators for service tests.
//!
//! Run with: `cargo test -p kbintake-services`

#![allow(dead_code)]

use async_trait::async_trait;
use kbintake_core::models::{
    AgentAlias, AgentDetails, AgentReply, AgentSummary, AgentTarget, IngestionJob,
    IngestionStatus, ObjectSummary, RetrievedPassage, StoredObject,
};
use kbintake_core::AppError;
use kbintake_services::{
    AgentDirectory, AgentRuntime, IngestionTrigger, KnowledgeBase, Storage, StorageBackend,
    StorageError, StorageResult,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Storage double that records every write and can be told to fail.
#[derive(Clone, Default)]
pub struct MockStorage {
    objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    put_calls: Arc<Mutex<Vec<String>>>,
    fail_on: Arc<Mutex<Option<String>>>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any put whose key ends with `suffix`.
    pub fn fail_puts_ending_with(&self, suffix: &str) {
        *self.fail_on.lock().unwrap() = Some(suffix.to_string());
    }

    pub fn put_calls(&self) -> Vec<String> {
        self.put_calls.lock().unwrap().clone()
    }

    pub fn content_type_of(&self, key: &str) -> Option<String> {
        self.objects.lock().unwrap().get(key).map(|(_, ct)| ct.clone())
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<StoredObject> {
        self.put_calls.lock().unwrap().push(key.to_string());

        if let Some(suffix) = self.fail_on.lock().unwrap().as_deref() {
            if key.ends_with(suffix) {
                return Err(StorageError::UploadFailed("AccessDenied".to_string()));
            }
        }

        let size_bytes = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data, content_type.to_string()));

        Ok(StoredObject {
            key: key.to_string(),
            url: self.url_for(key),
            size_bytes,
            content_type: content_type.to_string(),
        })
    }

    async fn get(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(data, _)| data.clone())
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }

    async fn list(&self, prefix: &str) -> StorageResult<Vec<ObjectSummary>> {
        let mut objects: Vec<ObjectSummary> = self
            .objects
            .lock()
            .unwrap()
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, (data, _))| ObjectSummary {
                key: key.clone(),
                size_bytes: data.len() as u64,
                last_modified: None,
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn url_for(&self, key: &str) -> String {
        format!("mock://bucket/{}", key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Agent double returning canned replies and recording prompts.
#[derive(Clone, Default)]
pub struct MockAgent {
    prompts: Arc<Mutex<Vec<(String, String)>>>,
    reply: Arc<Mutex<Option<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockAgent {
    pub fn replying(text: &str) -> Self {
        let agent = Self::default();
        *agent.reply.lock().unwrap() = Some(text.to_string());
        agent
    }

    pub fn failing() -> Self {
        let agent = Self::default();
        *agent.fail.lock().unwrap() = true;
        agent
    }

    /// `(session_id, prompt)` for every invocation, in order.
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentRuntime for MockAgent {
    async fn invoke(
        &self,
        _target: &AgentTarget,
        session_id: &str,
        text: &str,
    ) -> Result<AgentReply, AppError> {
        self.prompts
            .lock()
            .unwrap()
            .push((session_id.to_string(), text.to_string()));

        if *self.fail.lock().unwrap() {
            return Err(AppError::Agent("ThrottlingException".to_string()));
        }

        Ok(AgentReply {
            text: self.reply.lock().unwrap().clone().unwrap_or_default(),
            citations: Vec::new(),
        })
    }
}

/// Knowledge base double: fixed passages and a scripted ingestion job.
#[derive(Clone, Default)]
pub struct MockKnowledgeBase {
    passages: Arc<Mutex<Vec<RetrievedPassage>>>,
    retrieve_calls: Arc<Mutex<Vec<(String, String, i32)>>>,
    statuses: Arc<Mutex<VecDeque<IngestionStatus>>>,
    ingestion_starts: Arc<Mutex<usize>>,
    data_sources: Arc<Mutex<Vec<String>>>,
    data_source_lookups: Arc<Mutex<usize>>,
    started_with: Arc<Mutex<Vec<String>>>,
}

impl MockKnowledgeBase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passages(passages: Vec<RetrievedPassage>) -> Self {
        let kb = Self::default();
        *kb.passages.lock().unwrap() = passages;
        kb
    }

    /// Statuses reported by successive job polls; the last one repeats.
    pub fn script_statuses(&self, statuses: &[IngestionStatus]) {
        *self.statuses.lock().unwrap() = statuses.iter().copied().collect();
    }

    pub fn retrieve_calls(&self) -> Vec<(String, String, i32)> {
        self.retrieve_calls.lock().unwrap().clone()
    }

    pub fn ingestion_starts(&self) -> usize {
        *self.ingestion_starts.lock().unwrap()
    }

    /// Data sources reported for any knowledge base id.
    pub fn set_data_sources(&self, ids: &[&str]) {
        *self.data_sources.lock().unwrap() = ids.iter().map(|id| id.to_string()).collect();
    }

    pub fn data_source_lookups(&self) -> usize {
        *self.data_source_lookups.lock().unwrap()
    }

    /// Data source id passed to every started ingestion job, in order.
    pub fn started_with(&self) -> Vec<String> {
        self.started_with.lock().unwrap().clone()
    }
}

#[async_trait]
impl KnowledgeBase for MockKnowledgeBase {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
        max_results: i32,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        self.retrieve_calls.lock().unwrap().push((
            knowledge_base_id.to_string(),
            query.to_string(),
            max_results,
        ));
        let passages = self.passages.lock().unwrap();
        Ok(passages.iter().take(max_results as usize).cloned().collect())
    }
}

#[async_trait]
impl IngestionTrigger for MockKnowledgeBase {
    async fn list_data_sources(&self, _knowledge_base_id: &str) -> Result<Vec<String>, AppError> {
        *self.data_source_lookups.lock().unwrap() += 1;
        Ok(self.data_sources.lock().unwrap().clone())
    }

    async fn start_ingestion(
        &self,
        _knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, AppError> {
        *self.ingestion_starts.lock().unwrap() += 1;
        self.started_with
            .lock()
            .unwrap()
            .push(data_source_id.to_string());
        Ok(IngestionJob {
            job_id: "job-1".to_string(),
            status: IngestionStatus::Starting,
        })
    }

    async fn get_ingestion_job(
        &self,
        _knowledge_base_id: &str,
        _data_source_id: &str,
        job_id: &str,
    ) -> Result<IngestionJob, AppError> {
        let mut statuses = self.statuses.lock().unwrap();
        let status = if statuses.len() > 1 {
            statuses.pop_front().unwrap_or(IngestionStatus::Unknown)
        } else {
            statuses.front().copied().unwrap_or(IngestionStatus::InProgress)
        };
        Ok(IngestionJob {
            job_id: job_id.to_string(),
            status,
        })
    }
}

/// Agent directory double with a fixed set of agents and aliases.
#[derive(Clone, Default)]
pub struct MockAgentDirectory {
    agents: Arc<Mutex<Vec<AgentDetails>>>,
    aliases: Arc<Mutex<HashMap<String, Vec<AgentAlias>>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockAgentDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let directory = Self::default();
        *directory.fail.lock().unwrap() = true;
        directory
    }

    pub fn add_agent(&self, details: AgentDetails, aliases: Vec<AgentAlias>) {
        self.aliases
            .lock()
            .unwrap()
            .insert(details.agent_id.clone(), aliases);
        self.agents.lock().unwrap().push(details);
    }

    fn check(&self) -> Result<(), AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Agent("UnrecognizedClientException".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl AgentDirectory for MockAgentDirectory {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, AppError> {
        self.check()?;
        Ok(self
            .agents
            .lock()
            .unwrap()
            .iter()
            .map(|agent| AgentSummary {
                agent_id: agent.agent_id.clone(),
                name: agent.name.clone(),
                status: agent.status.clone(),
                description: None,
                latest_version: None,
                updated_at: agent.updated_at,
            })
            .collect())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<AgentDetails, AppError> {
        self.check()?;
        self.agents
            .lock()
            .unwrap()
            .iter()
            .find(|agent| agent.agent_id == agent_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Agent {} not found", agent_id)))
    }

    async fn list_agent_aliases(&self, agent_id: &str) -> Result<Vec<AgentAlias>, AppError> {
        self.check()?;
        Ok(self
            .aliases
            .lock()
            .unwrap()
            .get(agent_id)
            .cloned()
            .unwrap_or_default())
    }
}

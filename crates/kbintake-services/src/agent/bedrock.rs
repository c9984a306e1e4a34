//! Bedrock agent runtime, agent directory, knowledge base retrieval and
//! ingestion clients

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_bedrockagent::primitives::DateTime as AwsDateTime;
use aws_sdk_bedrockagent::Client as AgentControlClient;
use aws_sdk_bedrockagentruntime::error::DisplayErrorContext;
use aws_sdk_bedrockagentruntime::types::{
    KnowledgeBaseQuery, KnowledgeBaseRetrievalConfiguration,
    KnowledgeBaseVectorSearchConfiguration, ResponseStream, RetrievalResultLocation,
};
use aws_sdk_bedrockagentruntime::Client as AgentRuntimeClient;
use chrono::{DateTime, Utc};
use kbintake_core::models::{
    AgentAlias, AgentDetails, AgentReply, AgentSummary, AgentTarget, Citation, IngestionJob,
    IngestionStatus, RetrievedPassage,
};
use kbintake_core::AppError;
use std::fmt::{Debug, Formatter, Result as FmtResult};

use super::{AgentDirectory, AgentRuntime, IngestionTrigger, KnowledgeBase};

/// One set of AWS clients serving agent, retrieval and ingestion calls.
#[derive(Clone)]
pub struct BedrockClient {
    runtime: AgentRuntimeClient,
    control: AgentControlClient,
}

impl Debug for BedrockClient {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("BedrockClient").finish()
    }
}

impl BedrockClient {
    /// Load AWS configuration from the environment, overriding the region when given.
    pub async fn from_env(region: Option<&str>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let config = loader.load().await;

        Self {
            runtime: AgentRuntimeClient::new(&config),
            control: AgentControlClient::new(&config),
        }
    }
}

fn to_utc(value: &AwsDateTime) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

fn control_error(e: impl std::error::Error) -> AppError {
    AppError::Agent(DisplayErrorContext(&e).to_string())
}

fn s3_uri(location: Option<&RetrievalResultLocation>) -> Option<String> {
    location
        .and_then(|l| l.s3_location())
        .and_then(|s3| s3.uri())
        .map(str::to_string)
}

#[async_trait]
impl AgentRuntime for BedrockClient {
    async fn invoke(
        &self,
        target: &AgentTarget,
        session_id: &str,
        text: &str,
    ) -> Result<AgentReply, AppError> {
        let start = std::time::Instant::now();

        let mut output = self
            .runtime
            .invoke_agent()
            .agent_id(&target.agent_id)
            .agent_alias_id(&target.agent_alias_id)
            .session_id(session_id)
            .input_text(text)
            .send()
            .await
            .map_err(|e| AppError::Agent(DisplayErrorContext(&e).to_string()))?;

        let mut reply = AgentReply::default();

        loop {
            let event = output
                .completion
                .recv()
                .await
                .map_err(|e| AppError::Agent(DisplayErrorContext(&e).to_string()))?;

            let Some(event) = event else {
                break;
            };

            if let ResponseStream::Chunk(part) = event {
                if let Some(bytes) = part.bytes() {
                    reply
                        .text
                        .push_str(&String::from_utf8_lossy(bytes.as_ref()));
                }

                if let Some(attribution) = part.attribution() {
                    for citation in attribution.citations() {
                        let cited = citation
                            .generated_response_part()
                            .and_then(|p| p.text_response_part())
                            .and_then(|t| t.text())
                            .unwrap_or_default()
                            .to_string();
                        for reference in citation.retrieved_references() {
                            reply.citations.push(Citation {
                                text: cited.clone(),
                                source_uri: s3_uri(reference.location()),
                            });
                        }
                    }
                }
            }
        }

        tracing::info!(
            agent_id = %target.agent_id,
            session_id = %session_id,
            reply_chars = reply.text.chars().count(),
            citations = reply.citations.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Agent invocation completed"
        );

        Ok(reply)
    }
}

#[async_trait]
impl KnowledgeBase for BedrockClient {
    async fn retrieve(
        &self,
        knowledge_base_id: &str,
        query: &str,
        max_results: i32,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        let retrieval_query = KnowledgeBaseQuery::builder()
            .text(query)
            .build()
            .map_err(|e| AppError::KnowledgeBase(e.to_string()))?;

        let retrieval_configuration = KnowledgeBaseRetrievalConfiguration::builder()
            .vector_search_configuration(
                KnowledgeBaseVectorSearchConfiguration::builder()
                    .number_of_results(max_results)
                    .build(),
            )
            .build()
            .map_err(|e| AppError::KnowledgeBase(e.to_string()))?;

        let output = self
            .runtime
            .retrieve()
            .knowledge_base_id(knowledge_base_id)
            .retrieval_query(retrieval_query)
            .retrieval_configuration(retrieval_configuration)
            .send()
            .await
            .map_err(|e| AppError::KnowledgeBase(DisplayErrorContext(&e).to_string()))?;

        let passages = output
            .retrieval_results()
            .iter()
            .map(|result| RetrievedPassage {
                text: result
                    .content()
                    .and_then(|c| c.text())
                    .unwrap_or_default()
                    .to_string(),
                source_uri: s3_uri(result.location()),
                score: result.score(),
            })
            .collect();

        Ok(passages)
    }
}

#[async_trait]
impl IngestionTrigger for BedrockClient {
    async fn list_data_sources(&self, knowledge_base_id: &str) -> Result<Vec<String>, AppError> {
        let output = self
            .control
            .list_data_sources()
            .knowledge_base_id(knowledge_base_id)
            .send()
            .await
            .map_err(|e| AppError::KnowledgeBase(DisplayErrorContext(&e).to_string()))?;

        Ok(output
            .data_source_summaries()
            .iter()
            .map(|source| source.data_source_id().to_string())
            .collect())
    }

    async fn start_ingestion(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
    ) -> Result<IngestionJob, AppError> {
        let output = self
            .control
            .start_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .map_err(|e| AppError::KnowledgeBase(DisplayErrorContext(&e).to_string()))?;

        let job = output.ingestion_job().ok_or_else(|| {
            AppError::KnowledgeBase("Ingestion job missing from response".to_string())
        })?;

        Ok(IngestionJob {
            job_id: job.ingestion_job_id().to_string(),
            status: IngestionStatus::from(job.status().as_str()),
        })
    }

    async fn get_ingestion_job(
        &self,
        knowledge_base_id: &str,
        data_source_id: &str,
        job_id: &str,
    ) -> Result<IngestionJob, AppError> {
        let output = self
            .control
            .get_ingestion_job()
            .knowledge_base_id(knowledge_base_id)
            .data_source_id(data_source_id)
            .ingestion_job_id(job_id)
            .send()
            .await
            .map_err(|e| AppError::KnowledgeBase(DisplayErrorContext(&e).to_string()))?;

        let job = output.ingestion_job().ok_or_else(|| {
            AppError::NotFound(format!("Ingestion job {} not found", job_id))
        })?;

        Ok(IngestionJob {
            job_id: job.ingestion_job_id().to_string(),
            status: IngestionStatus::from(job.status().as_str()),
        })
    }
}

#[async_trait]
impl AgentDirectory for BedrockClient {
    async fn list_agents(&self) -> Result<Vec<AgentSummary>, AppError> {
        let mut agents = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .control
                .list_agents()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(control_error)?;

            agents.extend(output.agent_summaries().iter().map(|agent| AgentSummary {
                agent_id: agent.agent_id().to_string(),
                name: agent.agent_name().to_string(),
                status: agent.agent_status().as_str().to_string(),
                description: agent.description().map(str::to_string),
                latest_version: agent.latest_agent_version().map(str::to_string),
                updated_at: to_utc(agent.updated_at()),
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(agents)
    }

    async fn get_agent(&self, agent_id: &str) -> Result<AgentDetails, AppError> {
        let output = self
            .control
            .get_agent()
            .agent_id(agent_id)
            .send()
            .await
            .map_err(control_error)?;

        let agent = output
            .agent()
            .ok_or_else(|| AppError::NotFound(format!("Agent {} not found", agent_id)))?;

        Ok(AgentDetails {
            agent_id: agent.agent_id().to_string(),
            name: agent.agent_name().to_string(),
            arn: agent.agent_arn().to_string(),
            status: agent.agent_status().as_str().to_string(),
            foundation_model: agent.foundation_model().map(str::to_string),
            instruction: agent.instruction().map(str::to_string),
            idle_session_ttl_secs: Some(agent.idle_session_ttl_in_seconds()),
            created_at: to_utc(agent.created_at()),
            updated_at: to_utc(agent.updated_at()),
        })
    }

    async fn list_agent_aliases(&self, agent_id: &str) -> Result<Vec<AgentAlias>, AppError> {
        let mut aliases = Vec::new();
        let mut next_token = None;

        loop {
            let output = self
                .control
                .list_agent_aliases()
                .agent_id(agent_id)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(control_error)?;

            aliases.extend(output.agent_alias_summaries().iter().map(|alias| AgentAlias {
                alias_id: alias.agent_alias_id().to_string(),
                name: alias.agent_alias_name().to_string(),
                status: alias.agent_alias_status().map(|s| s.as_str().to_string()),
                created_at: to_utc(alias.created_at()),
                updated_at: to_utc(alias.updated_at()),
            }));

            match output.next_token() {
                Some(token) => next_token = Some(token.to_string()),
                None => break,
            }
        }

        Ok(aliases)
    }
}

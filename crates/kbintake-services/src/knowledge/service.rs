use crate::agent::{IngestionTrigger, KnowledgeBase};
use kbintake_core::constants::{DEFAULT_RETRIEVAL_RESULTS, MAX_RETRIEVAL_RESULTS};
use kbintake_core::models::{IngestionJob, RetrievedPassage};
use kbintake_core::{mask_for_log, AppError, ValidationError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::{sleep, timeout};

pub const DEFAULT_INGESTION_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_INGESTION_TIMEOUT: Duration = Duration::from_secs(600);

/// Direct knowledge base access: retrieval without the agent, and re-indexing
/// of the data source after new documents land in the bucket.
#[derive(Clone)]
pub struct KnowledgeService {
    knowledge_base: Arc<dyn KnowledgeBase>,
    ingestion: Arc<dyn IngestionTrigger>,
    knowledge_base_id: String,
    /// Configured up front, or looked up once from the knowledge base.
    data_source_id: Arc<OnceCell<String>>,
}

impl KnowledgeService {
    pub fn new(
        knowledge_base: Arc<dyn KnowledgeBase>,
        ingestion: Arc<dyn IngestionTrigger>,
        knowledge_base_id: impl Into<String>,
        data_source_id: Option<String>,
    ) -> Self {
        Self {
            knowledge_base,
            ingestion,
            knowledge_base_id: knowledge_base_id.into(),
            data_source_id: Arc::new(OnceCell::new_with(data_source_id)),
        }
    }

    pub fn knowledge_base_id(&self) -> &str {
        &self.knowledge_base_id
    }

    /// Retrieve the passages most relevant to `text`.
    #[tracing::instrument(skip(self, text), fields(knowledge_base_id = %self.knowledge_base_id))]
    pub async fn query(
        &self,
        text: &str,
        max_results: Option<i32>,
    ) -> Result<Vec<RetrievedPassage>, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyInput.into());
        }

        let max_results = clamp_max_results(max_results);
        let passages = self
            .knowledge_base
            .retrieve(&self.knowledge_base_id, text, max_results)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Knowledge base query failed"))?;

        tracing::info!(
            query = %mask_for_log(text),
            max_results,
            returned = passages.len(),
            "Knowledge base query completed"
        );

        Ok(passages)
    }

    /// The data source ingestion runs against.
    ///
    /// Without a configured id the first data source of the knowledge base is
    /// used; a knowledge base without data sources is a configuration error.
    pub async fn data_source_id(&self) -> Result<&str, AppError> {
        self.data_source_id
            .get_or_try_init(|| async {
                let first = self
                    .ingestion
                    .list_data_sources(&self.knowledge_base_id)
                    .await?
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        AppError::Config(format!(
                            "Knowledge base {} has no data sources to sync",
                            self.knowledge_base_id
                        ))
                    })?;
                tracing::info!(
                    knowledge_base_id = %self.knowledge_base_id,
                    data_source_id = %first,
                    "Using first data source of the knowledge base"
                );
                Ok::<_, AppError>(first)
            })
            .await
            .map(String::as_str)
    }

    /// Start an ingestion job for the knowledge base's data source.
    pub async fn sync(&self) -> Result<IngestionJob, AppError> {
        let data_source_id = self.data_source_id().await?;

        let job = self
            .ingestion
            .start_ingestion(&self.knowledge_base_id, data_source_id)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Failed to start ingestion job"))?;

        tracing::info!(
            knowledge_base_id = %self.knowledge_base_id,
            data_source_id = %data_source_id,
            job_id = %job.job_id,
            status = %job.status,
            "Ingestion job started"
        );

        Ok(job)
    }

    pub async fn job_status(&self, job_id: &str) -> Result<IngestionJob, AppError> {
        let data_source_id = self.data_source_id().await?;
        self.ingestion
            .get_ingestion_job(&self.knowledge_base_id, data_source_id, job_id)
            .await
    }

    /// Poll an ingestion job until it reaches a terminal status.
    ///
    /// Returns the final job (which may be `Failed`), or `AppError::Timeout`
    /// if the job is still running when `limit` elapses.
    pub async fn wait_for_ingestion(
        &self,
        job_id: &str,
        poll_interval: Duration,
        limit: Duration,
    ) -> Result<IngestionJob, AppError> {
        let poll = async {
            loop {
                let job = self.job_status(job_id).await?;
                tracing::debug!(job_id = %job_id, status = %job.status, "Ingestion job polled");
                if job.status.is_terminal() {
                    return Ok::<_, AppError>(job);
                }
                sleep(poll_interval).await;
            }
        };

        let job = timeout(limit, poll).await.map_err(|_| {
            tracing::warn!(
                job_id = %job_id,
                timeout_secs = limit.as_secs(),
                "Ingestion job did not finish in time"
            );
            AppError::Timeout(format!(
                "Ingestion job {} still running after {}s",
                job_id,
                limit.as_secs()
            ))
        })??;

        tracing::info!(job_id = %job_id, status = %job.status, "Ingestion job finished");
        Ok(job)
    }
}

/// Missing means the default; anything else is clamped to `1..=MAX_RETRIEVAL_RESULTS`.
fn clamp_max_results(max_results: Option<i32>) -> i32 {
    max_results
        .unwrap_or(DEFAULT_RETRIEVAL_RESULTS)
        .clamp(1, MAX_RETRIEVAL_RESULTS)
}

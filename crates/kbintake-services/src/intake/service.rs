use crate::knowledge::KnowledgeService;
use chrono::Utc;
use kbintake_core::models::{
    IngestionJob, StoredObject, UploadCandidate, UploadOutcome, UploadReport,
};
use kbintake_core::{AppError, UploadValidator};
use kbintake_storage::{content_type_for, generate_storage_key, Storage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Result of a batch upload followed by a knowledge base sync.
#[derive(Debug, Clone)]
pub struct SyncedUpload {
    pub report: UploadReport,
    /// Present when at least one file was stored and ingestion was started.
    pub ingestion: Option<IngestionJob>,
}

#[derive(Clone)]
pub struct IntakeService {
    validator: UploadValidator,
    storage: Arc<dyn Storage>,
    folder: String,
}

impl IntakeService {
    pub fn new(
        validator: UploadValidator,
        storage: Arc<dyn Storage>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            validator,
            storage,
            folder: folder.into(),
        }
    }

    pub fn validator(&self) -> &UploadValidator {
        &self.validator
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Validate one candidate and store it when accepted.
    ///
    /// A rejected candidate returns `AppError::Validation` and storage is never
    /// called.
    #[tracing::instrument(
        skip(self, candidate),
        fields(filename = %candidate.filename, size_bytes = candidate.declared_size)
    )]
    pub async fn upload(&self, candidate: UploadCandidate) -> Result<StoredObject, AppError> {
        if let Err(e) = self
            .validator
            .check(&candidate)
            .and_then(|()| self.validator.validate_size(candidate.data.len() as u64))
        {
            tracing::info!(reason = e.reason(), "Upload rejected");
            return Err(e.into());
        }

        let key = generate_storage_key(&self.folder, Utc::now(), &candidate.filename);
        let content_type = content_type_for(&key);

        let stored = self
            .storage
            .put(&key, candidate.data, &content_type)
            .await
            .inspect_err(|e| tracing::error!(error = %e, key = %key, "Upload failed"))?;

        tracing::info!(key = %stored.key, url = %stored.url, "Upload stored");
        Ok(stored)
    }

    /// Validate and upload a file from disk.
    ///
    /// Name and declared size come from the file's metadata; the bytes are
    /// only read once the declared size and type have been accepted.
    pub async fn upload_path(&self, path: &Path) -> Result<StoredObject, AppError> {
        let candidate = inspect_path(path).await?;
        if let Err(e) = self.validator.check(&candidate) {
            tracing::info!(
                path = %path.display(),
                reason = e.reason(),
                "Upload rejected before reading"
            );
            return Err(e.into());
        }

        let data = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
        self.upload(UploadCandidate::with_declared_size(
            candidate.filename,
            candidate.declared_size,
            data,
        ))
        .await
    }

    /// Upload candidates one after another. Every input gets an outcome, in
    /// order, and a failure does not stop the batch.
    pub async fn upload_many(&self, candidates: Vec<UploadCandidate>) -> UploadReport {
        let mut report = UploadReport::default();

        for candidate in candidates {
            let filename = candidate.filename.clone();
            let result = self.upload(candidate).await;
            report.outcomes.push(outcome(filename, result));
        }

        log_report(&report);
        report
    }

    /// [`upload_many`](Self::upload_many) over files on disk. A path that
    /// cannot be read becomes an error outcome like any other failure.
    pub async fn upload_paths(&self, paths: &[PathBuf]) -> UploadReport {
        let mut report = UploadReport::default();

        for path in paths {
            let result = self.upload_path(path).await;
            report.outcomes.push(outcome(display_name(path), result));
        }

        log_report(&report);
        report
    }

    /// Batch upload, then start ingestion if anything was stored.
    pub async fn upload_and_sync(
        &self,
        candidates: Vec<UploadCandidate>,
        knowledge: &KnowledgeService,
    ) -> Result<SyncedUpload, AppError> {
        let report = self.upload_many(candidates).await;
        sync_after(report, knowledge).await
    }

    pub async fn upload_paths_and_sync(
        &self,
        paths: &[PathBuf],
        knowledge: &KnowledgeService,
    ) -> Result<SyncedUpload, AppError> {
        let report = self.upload_paths(paths).await;
        sync_after(report, knowledge).await
    }
}

/// Stat a file into a candidate named after it. The candidate carries the
/// file's length as its declared size and no bytes.
pub async fn inspect_path(path: &Path) -> Result<UploadCandidate, AppError> {
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| AppError::InvalidInput(format!("{} has no file name", path.display())))?;

    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| read_error(path, e))?;
    if !metadata.is_file() {
        return Err(AppError::InvalidInput(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    Ok(UploadCandidate::with_declared_size(
        filename,
        metadata.len(),
        Vec::new(),
    ))
}

fn read_error(path: &Path, err: std::io::Error) -> AppError {
    AppError::InvalidInput(format!("cannot read {}: {}", path.display(), err))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn outcome(filename: String, result: Result<StoredObject, AppError>) -> UploadOutcome {
    match result {
        Ok(stored) => UploadOutcome::Success {
            filename,
            key: stored.key,
            url: stored.url,
        },
        Err(e) => UploadOutcome::Error {
            filename,
            message: upload_error_message(&e),
        },
    }
}

fn log_report(report: &UploadReport) {
    tracing::info!(
        total = report.outcomes.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Batch upload completed"
    );
}

async fn sync_after(
    report: UploadReport,
    knowledge: &KnowledgeService,
) -> Result<SyncedUpload, AppError> {
    let ingestion = if report.succeeded() > 0 {
        Some(knowledge.sync().await?)
    } else {
        tracing::info!("Nothing stored, skipping knowledge base sync");
        None
    };

    Ok(SyncedUpload { report, ingestion })
}

/// Validation failures report their short reason, unreadable paths their
/// cause; collaborator failures keep the backend detail so the operator can
/// act on it.
fn upload_error_message(err: &AppError) -> String {
    match err {
        AppError::Validation(e) => e.reason().to_string(),
        AppError::InvalidInput(msg) => msg.clone(),
        other => other.to_string(),
    }
}

use serde::{Deserialize, Serialize};

/// A file submitted for upload, before any policy has been applied.
///
/// The declared size is what the caller claims; it normally equals the byte
/// length but a streaming front end may know the size before the bytes.
#[derive(Debug, Clone)]
pub struct UploadCandidate {
    pub filename: String,
    pub declared_size: u64,
    pub data: Vec<u8>,
}

impl UploadCandidate {
    /// Build a candidate whose declared size is the byte length.
    pub fn from_bytes(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            declared_size: data.len() as u64,
            data,
        }
    }

    pub fn with_declared_size(
        filename: impl Into<String>,
        declared_size: u64,
        data: Vec<u8>,
    ) -> Self {
        Self {
            filename: filename.into(),
            declared_size,
            data,
        }
    }
}

/// Outcome of validating one candidate. Accepted verdicts carry an empty reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationVerdict {
    pub accepted: bool,
    pub reason: String,
}

impl ValidationVerdict {
    pub fn accept() -> Self {
        Self {
            accepted: true,
            reason: String::new(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: reason.into(),
        }
    }
}

/// An object written to the storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
    pub content_type: String,
}

/// Listing entry returned by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub key: String,
    pub size_bytes: u64,
    pub last_modified: Option<chrono::DateTime<chrono::Utc>>,
}

/// Per-file result of a batch upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum UploadOutcome {
    Success {
        filename: String,
        key: String,
        url: String,
    },
    Error {
        filename: String,
        message: String,
    },
}

impl UploadOutcome {
    pub fn filename(&self) -> &str {
        match self {
            UploadOutcome::Success { filename, .. } | UploadOutcome::Error { filename, .. } => {
                filename
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, UploadOutcome::Success { .. })
    }
}

/// Summary of a batch upload, in input order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadReport {
    pub outcomes: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }
}

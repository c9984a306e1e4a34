use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// One ranked snippet returned by a knowledge-base retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedPassage {
    pub text: String,
    pub source_uri: Option<String>,
    pub score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionStatus {
    Starting,
    InProgress,
    Complete,
    Failed,
    Stopped,
    Unknown,
}

impl IngestionStatus {
    /// Whether the job will not change state any more.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            IngestionStatus::Complete | IngestionStatus::Failed | IngestionStatus::Stopped
        )
    }
}

impl From<&str> for IngestionStatus {
    fn from(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "STARTING" => IngestionStatus::Starting,
            "IN_PROGRESS" => IngestionStatus::InProgress,
            "COMPLETE" => IngestionStatus::Complete,
            "FAILED" => IngestionStatus::Failed,
            "STOPPED" | "STOPPING" => IngestionStatus::Stopped,
            _ => IngestionStatus::Unknown,
        }
    }
}

impl Display for IngestionStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            IngestionStatus::Starting => write!(f, "starting"),
            IngestionStatus::InProgress => write!(f, "in_progress"),
            IngestionStatus::Complete => write!(f, "complete"),
            IngestionStatus::Failed => write!(f, "failed"),
            IngestionStatus::Stopped => write!(f, "stopped"),
            IngestionStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionJob {
    pub job_id: String,
    pub status: IngestionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_service_strings() {
        assert_eq!(IngestionStatus::from("IN_PROGRESS"), IngestionStatus::InProgress);
        assert_eq!(IngestionStatus::from("complete"), IngestionStatus::Complete);
        assert_eq!(IngestionStatus::from("whatever"), IngestionStatus::Unknown);
    }

    #[test]
    fn test_terminal_states() {
        assert!(IngestionStatus::Complete.is_terminal());
        assert!(IngestionStatus::Failed.is_terminal());
        assert!(!IngestionStatus::InProgress.is_terminal());
        assert!(!IngestionStatus::Unknown.is_terminal());
    }
}

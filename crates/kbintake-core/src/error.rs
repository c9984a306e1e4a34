//! Error types module
//!
//! All failures that reach a caller are unified under `AppError`. Validation
//! failures are recoverable and carry a short reason for the user; failures
//! from the external collaborators (storage, agent, knowledge base) are
//! surfaced as-is and never retried here.

use crate::validation::ValidationError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Process exit code (sysexits-style) for a command that ends with this error
    fn exit_code(&self) -> u8;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried or corrected by the user)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// User-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Agent invocation failed: {0}")]
    Agent(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timed out: {0}")]
    Timeout(String),
}

const EX_DATAERR: u8 = 65;
const EX_NOINPUT: u8 = 66;
const EX_UNAVAILABLE: u8 = 69;
const EX_TEMPFAIL: u8 = 75;
const EX_CONFIG: u8 = 78;

/// Static metadata for each variant:
/// (exit_code, error_code, recoverable, suggested_action, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (u8, &'static str, bool, Option<&'static str>, LogLevel) {
    match err {
        AppError::Validation(ValidationError::FileTooLarge { .. }) => (
            EX_DATAERR,
            "FILE_TOO_LARGE",
            true,
            Some("Reduce file size and upload again"),
            LogLevel::Debug,
        ),
        AppError::Validation(ValidationError::FileTypeNotAllowed { .. }) => (
            EX_DATAERR,
            "FILE_TYPE_NOT_ALLOWED",
            true,
            Some("Upload one of the allowed file types"),
            LogLevel::Debug,
        ),
        AppError::Validation(ValidationError::EmptyInput) => (
            EX_DATAERR,
            "EMPTY_INPUT",
            true,
            Some("Enter some text and try again"),
            LogLevel::Debug,
        ),
        AppError::Storage(_) => (
            EX_UNAVAILABLE,
            "STORAGE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Agent(_) => (
            EX_UNAVAILABLE,
            "AGENT_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::KnowledgeBase(_) => (
            EX_UNAVAILABLE,
            "KNOWLEDGE_BASE_ERROR",
            true,
            Some("Retry after a short delay"),
            LogLevel::Error,
        ),
        AppError::Config(_) => (
            EX_CONFIG,
            "CONFIGURATION_ERROR",
            false,
            Some("Check environment configuration"),
            LogLevel::Error,
        ),
        AppError::InvalidInput(_) => (
            EX_NOINPUT,
            "INVALID_INPUT",
            false,
            Some("Check the file paths and arguments and try again"),
            LogLevel::Debug,
        ),
        AppError::NotFound(_) => (
            EX_NOINPUT,
            "NOT_FOUND",
            false,
            Some("Verify the resource exists"),
            LogLevel::Debug,
        ),
        AppError::Timeout(_) => (
            EX_TEMPFAIL,
            "TIMEOUT",
            true,
            Some("Check the job status later"),
            LogLevel::Warn,
        ),
    }
}

impl ErrorMetadata for AppError {
    fn exit_code(&self) -> u8 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).4
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(err) => err.reason().to_string(),
            AppError::Storage(_) => "Failed to access storage".to_string(),
            AppError::Agent(_) => "The assistant is unavailable".to_string(),
            AppError::KnowledgeBase(_) => "Failed to reach the knowledge base".to_string(),
            AppError::Config(msg)
            | AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::Timeout(msg) => msg.clone(),
        }
    }
}

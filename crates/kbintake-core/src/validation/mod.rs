//! Validation modules
//!
//! Everything here is a pure function of its input and an explicit policy
//! value; nothing reads process state.

pub mod filename;
pub mod text_input;
pub mod upload;

pub use filename::sanitize_filename;
pub use text_input::{sanitize_text_input, TextInputPolicy};
pub use upload::{file_extension, UploadPolicy, UploadValidator};

pub const REASON_FILE_TOO_LARGE: &str = "file too large";
pub const REASON_FILE_TYPE_NOT_ALLOWED: &str = "file type not allowed";
pub const REASON_EMPTY_INPUT: &str = "empty input";

/// Validation failures. Always recoverable; surfaced to the user as `reason()`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("File type not allowed: {filename:?} (allowed: {allowed:?})")]
    FileTypeNotAllowed {
        filename: String,
        allowed: Vec<String>,
    },

    #[error("Empty input")]
    EmptyInput,
}

impl ValidationError {
    /// Short human-readable reason shown to the user.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::FileTooLarge { .. } => REASON_FILE_TOO_LARGE,
            ValidationError::FileTypeNotAllowed { .. } => REASON_FILE_TYPE_NOT_ALLOWED,
            ValidationError::EmptyInput => REASON_EMPTY_INPUT,
        }
    }
}

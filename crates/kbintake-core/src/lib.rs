//! kbintake core library
//!
//! Domain models, error types, configuration and the pure intake pipeline:
//! upload validation, chat input cleaning, filename sanitizing and PII masking.
//! Nothing in this crate performs I/O apart from reading configuration.

pub mod config;
pub mod constants;
pub mod error;
pub mod format;
pub mod models;
pub mod sanitizer;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{AgentConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use sanitizer::{mask_for_log, sanitize, ContentSanitizer, PiiCategory, SanitizedText};
pub use storage_types::StorageBackend;
pub use validation::{
    sanitize_filename, sanitize_text_input, TextInputPolicy, UploadPolicy, UploadValidator,
    ValidationError,
};

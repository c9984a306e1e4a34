//! Validate-then-upload of documents into the knowledge base bucket.

mod service;

pub use service::{inspect_path, IntakeService, SyncedUpload};

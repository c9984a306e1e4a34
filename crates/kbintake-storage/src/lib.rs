//! kbintake storage library
//!
//! Storage abstraction for uploaded documents with S3 and local filesystem
//! backends.
//!
//! # Storage key format
//!
//! Uploads are stored under `{folder}/{YYYYMMDD_HHMMSS}_{filename}` where the
//! filename has been through `sanitize_filename`. Keys must not contain `..`
//! or a leading `/`. Key generation is centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use kbintake_core::StorageBackend;
pub use keys::{content_type_for, generate_storage_key, validate_key};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};

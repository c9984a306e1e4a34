//! Shared key generation for storage backends.
//!
//! Key format: `{folder}/{YYYYMMDD_HHMMSS}_{sanitized filename}`.

use chrono::{DateTime, Utc};
use kbintake_core::sanitize_filename;

use crate::traits::{StorageError, StorageResult};

/// Generate a storage key for an upload made at `uploaded_at`.
pub fn generate_storage_key(folder: &str, uploaded_at: DateTime<Utc>, filename: &str) -> String {
    let folder = folder.trim_matches('/');
    let name = format!(
        "{}_{}",
        uploaded_at.format("%Y%m%d_%H%M%S"),
        sanitize_filename(filename)
    );
    if folder.is_empty() {
        name
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let traversal = key.split('/').any(|segment| segment == ".." || segment == ".");
    if key.is_empty() || traversal || key.starts_with('/') || key.contains('\\') {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// MIME type guessed from the filename extension.
pub fn content_type_for(filename: &str) -> String {
    mime_guess::from_path(filename)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap()
    }

    #[test]
    fn test_key_layout() {
        assert_eq!(
            generate_storage_key("uploads", at(), "report.pdf"),
            "uploads/20240309_140507_report.pdf"
        );
    }

    #[test]
    fn test_key_sanitizes_filename_and_folder() {
        assert_eq!(
            generate_storage_key("/kb/docs/", at(), "../a:b.md"),
            "kb/docs/20240309_140507__a_b.md"
        );
        assert_eq!(generate_storage_key("", at(), "x.txt"), "20240309_140507_x.txt");
    }

    #[test]
    fn test_generated_keys_are_valid() {
        let key = generate_storage_key("uploads", at(), "../../etc/passwd");
        assert!(validate_key(&key).is_ok(), "{key}");
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("uploads/a.pdf").is_ok());
        assert!(validate_key("uploads/v1..2.pdf").is_ok());
        assert!(validate_key("../a.pdf").is_err());
        assert!(validate_key("uploads/../../a.pdf").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("noext"), "application/octet-stream");
    }
}

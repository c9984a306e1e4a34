use super::ValidationError;
use crate::constants::{DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_MAX_FILE_SIZE_BYTES};
use crate::models::{UploadCandidate, ValidationVerdict};

/// Size and type policy for uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    /// Lower-cased extensions without the leading dot.
    pub allowed_extensions: Vec<String>,
}

impl UploadPolicy {
    /// Build a policy, normalising extensions to lower case without a leading dot.
    pub fn new<I, S>(max_size_bytes: u64, allowed_extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self {
            max_size_bytes,
            allowed_extensions,
        }
    }
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_ALLOWED_EXTENSIONS)
    }
}

/// Lower-cased text after the last `.` of a filename.
///
/// Returns `None` for an empty filename, a filename without a dot, or one that
/// ends with a dot.
pub fn file_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.trim().rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Upload validator
///
/// Gates a candidate on size and type before any network call. Size is checked
/// first; a candidate failing both rules reports the size reason.
#[derive(Debug, Clone, Default)]
pub struct UploadValidator {
    policy: UploadPolicy,
}

impl UploadValidator {
    pub fn new(policy: UploadPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Validate file size
    pub fn validate_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.policy.max_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.policy.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Validate file extension against the allow-set (case-insensitive)
    pub fn validate_extension(&self, filename: &str) -> Result<(), ValidationError> {
        let allowed = file_extension(filename)
            .map(|ext| self.policy.allowed_extensions.contains(&ext))
            .unwrap_or(false);

        if !allowed {
            return Err(ValidationError::FileTypeNotAllowed {
                filename: filename.to_string(),
                allowed: self.policy.allowed_extensions.clone(),
            });
        }
        Ok(())
    }

    /// Run every rule against a candidate.
    pub fn check(&self, candidate: &UploadCandidate) -> Result<(), ValidationError> {
        self.validate_size(candidate.declared_size)?;
        self.validate_extension(&candidate.filename)?;
        Ok(())
    }

    /// Same as [`check`](Self::check), as a verdict value.
    pub fn verdict(&self, candidate: &UploadCandidate) -> ValidationVerdict {
        match self.check(candidate) {
            Ok(()) => ValidationVerdict::accept(),
            Err(e) => ValidationVerdict::reject(e.reason()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{REASON_FILE_TOO_LARGE, REASON_FILE_TYPE_NOT_ALLOWED};

    fn candidate(filename: &str, size: u64) -> UploadCandidate {
        UploadCandidate::with_declared_size(filename, size, Vec::new())
    }

    #[test]
    fn test_default_policy() {
        let policy = UploadPolicy::default();
        assert_eq!(policy.max_size_bytes, 52_428_800);
        assert_eq!(
            policy.allowed_extensions,
            vec!["pdf", "txt", "docx", "csv", "json", "md"]
        );
    }

    #[test]
    fn test_policy_normalises_extensions() {
        let policy = UploadPolicy::new(10, [" .PDF", "Txt", ""]);
        assert_eq!(policy.allowed_extensions, vec!["pdf", "txt"]);
    }

    #[test]
    fn test_accepts_allowed_file() {
        let validator = UploadValidator::default();
        let verdict = validator.verdict(&candidate("report.pdf", 1024));
        assert!(verdict.accepted);
        assert!(verdict.reason.is_empty());
    }

    #[test]
    fn test_extension_case_insensitive() {
        let validator = UploadValidator::default();
        assert!(validator.validate_extension("NOTES.MD").is_ok());
        assert!(validator.validate_extension("data.Csv").is_ok());
    }

    #[test]
    fn test_size_at_limit_is_accepted() {
        let validator = UploadValidator::default();
        assert!(validator.check(&candidate("a.txt", 52_428_800)).is_ok());
    }

    #[test]
    fn test_rejects_oversize() {
        let validator = UploadValidator::default();
        let verdict = validator.verdict(&candidate("a.txt", 52_428_801));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, REASON_FILE_TOO_LARGE);
    }

    #[test]
    fn test_oversize_wins_when_both_rules_fail() {
        let validator = UploadValidator::default();
        let verdict = validator.verdict(&candidate("virus.exe", u64::MAX));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, REASON_FILE_TOO_LARGE);
    }

    #[test]
    fn test_rejects_disallowed_type() {
        let validator = UploadValidator::default();
        let verdict = validator.verdict(&candidate("image.png", 10));
        assert!(!verdict.accepted);
        assert_eq!(verdict.reason, REASON_FILE_TYPE_NOT_ALLOWED);
    }

    #[test]
    fn test_rejects_missing_extension() {
        let validator = UploadValidator::default();
        for name in ["report", "", "   ", "trailing."] {
            let verdict = validator.verdict(&candidate(name, 10));
            assert!(!verdict.accepted, "{name:?} should be rejected");
            assert_eq!(verdict.reason, REASON_FILE_TYPE_NOT_ALLOWED);
        }
    }

    #[test]
    fn test_only_last_extension_counts() {
        let validator = UploadValidator::default();
        assert!(validator.validate_extension("archive.pdf.exe").is_err());
        assert!(validator.validate_extension("archive.exe.pdf").is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let validator = UploadValidator::new(UploadPolicy::new(100, ["png"]));
        assert!(validator.check(&candidate("a.png", 100)).is_ok());
        assert!(validator.check(&candidate("a.pdf", 100)).is_err());
        assert!(validator.check(&candidate("a.png", 101)).is_err());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("a.tar.GZ"), Some("gz".to_string()));
        assert_eq!(file_extension("report"), None);
        assert_eq!(file_extension(""), None);
    }
}

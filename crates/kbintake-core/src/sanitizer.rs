//! PII masking for free-form text
//!
//! Each category is an independent textual pass. Passes always run in the
//! order email, SSN, phone: SSN must run before phone so a `123-45-6789` value
//! is never half-consumed by the looser phone rule. Tags contain no digits and
//! no `@`, so a second run over sanitized text changes nothing.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::sync::LazyLock;

macro_rules! pii_pattern {
    ($name:ident, $regex_str:expr) => {
        static $name: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new($regex_str).ok());
    };
}

pii_pattern!(RE_EMAIL, r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}");
pii_pattern!(RE_SSN, r"\b\d{3}-\d{2}-\d{4}\b");
pii_pattern!(RE_PHONE, r"\b\d{3}[-.]?\d{3}[-.]?\d{4}\b");

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PiiCategory {
    // Declaration order is the pass order.
    Email,
    Ssn,
    Phone,
}

impl PiiCategory {
    pub const ALL: [PiiCategory; 3] = [PiiCategory::Email, PiiCategory::Ssn, PiiCategory::Phone];

    /// Replacement tag written in place of a match.
    pub fn tag(&self) -> &'static str {
        match self {
            PiiCategory::Email => "[EMAIL]",
            PiiCategory::Ssn => "[SSN]",
            PiiCategory::Phone => "[PHONE]",
        }
    }

    fn regex(&self) -> Option<&'static Regex> {
        let pattern: &'static LazyLock<Option<Regex>> = match self {
            PiiCategory::Email => &RE_EMAIL,
            PiiCategory::Ssn => &RE_SSN,
            PiiCategory::Phone => &RE_PHONE,
        };
        Option::as_ref(pattern)
    }
}

impl Display for PiiCategory {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            PiiCategory::Email => write!(f, "email"),
            PiiCategory::Ssn => write!(f, "ssn"),
            PiiCategory::Phone => write!(f, "phone"),
        }
    }
}

/// Text with PII replaced by category tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizedText {
    text: String,
    /// Number of substitutions per category, in pass order. Zero counts are omitted.
    redactions: Vec<(PiiCategory, usize)>,
}

impl SanitizedText {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn redactions(&self) -> &[(PiiCategory, usize)] {
        &self.redactions
    }

    pub fn redaction_count(&self) -> usize {
        self.redactions.iter().map(|(_, n)| n).sum()
    }

    pub fn was_redacted(&self) -> bool {
        !self.redactions.is_empty()
    }
}

impl Display for SanitizedText {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(&self.text)
    }
}

impl AsRef<str> for SanitizedText {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

/// Content sanitizer masking a configured set of PII categories.
#[derive(Debug, Clone)]
pub struct ContentSanitizer {
    categories: Vec<PiiCategory>,
}

impl ContentSanitizer {
    /// Sanitizer masking every known category.
    pub fn new() -> Self {
        Self::with_categories(PiiCategory::ALL)
    }

    /// Sanitizer masking only the given categories. Pass order stays fixed.
    pub fn with_categories(categories: impl IntoIterator<Item = PiiCategory>) -> Self {
        let mut categories: Vec<PiiCategory> = categories.into_iter().collect();
        categories.sort();
        categories.dedup();
        Self { categories }
    }

    pub fn categories(&self) -> &[PiiCategory] {
        &self.categories
    }

    pub fn sanitize(&self, text: &str) -> SanitizedText {
        let mut current = text.to_string();
        let mut redactions = Vec::new();

        for category in &self.categories {
            let Some(regex) = category.regex() else {
                tracing::error!(
                    category = %category,
                    "PII pattern failed to compile, pass skipped"
                );
                continue;
            };

            let count = regex.find_iter(&current).count();
            if count == 0 {
                continue;
            }
            if let Cow::Owned(replaced) = regex.replace_all(&current, category.tag()) {
                current = replaced;
            }
            redactions.push((*category, count));
        }

        SanitizedText {
            text: current,
            redactions,
        }
    }
}

impl Default for ContentSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Mask all PII categories in `text`.
pub fn sanitize(text: &str) -> SanitizedText {
    ContentSanitizer::new().sanitize(text)
}

/// Masked copy of `text` for log fields.
pub fn mask_for_log(text: &str) -> String {
    sanitize(text).into_string()
}

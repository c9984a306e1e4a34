use super::ValidationError;
use crate::constants::DEFAULT_MAX_INPUT_CHARS;

/// Characters removed from chat input before it is rendered or forwarded.
const STRIPPED_CHARS: [char; 4] = ['<', '>', '"', '\''];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextInputPolicy {
    pub max_chars: usize,
}

impl Default for TextInputPolicy {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }
}

/// Clean free-form chat input.
///
/// Strips `< > " '`, truncates to `max_chars` characters, then trims
/// surrounding whitespace. This is a character filter, not an HTML parser.
pub fn sanitize_text_input(
    input: &str,
    policy: &TextInputPolicy,
) -> Result<String, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    let cleaned: String = input
        .chars()
        .filter(|c| !STRIPPED_CHARS.contains(c))
        .take(policy.max_chars)
        .collect();

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(ValidationError::EmptyInput);
    }

    Ok(cleaned.to_string())
}

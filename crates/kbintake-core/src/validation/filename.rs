use uuid::Uuid;

/// Characters that are unsafe inside an object key or on common filesystems.
const INVALID_FILENAME_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Make a user-supplied filename safe to embed in a storage key.
///
/// Invalid characters become `_`, surrounding dots and spaces are removed, and
/// an empty result is replaced by `unnamed_file_<8 hex chars>`.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| {
            if INVALID_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        let suffix = Uuid::new_v4().simple().to_string();
        return format!("unnamed_file_{}", &suffix[..8]);
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_name_unchanged() {
        assert_eq!(sanitize_filename("Quarterly Report.pdf"), "Quarterly Report.pdf");
    }

    #[test]
    fn test_invalid_chars_replaced() {
        assert_eq!(sanitize_filename("a<b>c:d\"e/f\\g|h?i*.txt"), "a_b_c_d_e_f_g_h_i_.txt");
    }

    #[test]
    fn test_path_components_cannot_escape() {
        let name = sanitize_filename("../../etc/passwd");
        assert!(!name.contains('/'));
        assert_eq!(name, "_.._etc_passwd");
    }

    #[test]
    fn test_surrounding_dots_and_spaces_trimmed() {
        assert_eq!(sanitize_filename("  ..notes.md.. "), "notes.md");
    }

    #[test]
    fn test_empty_name_gets_generated_fallback() {
        for name in ["", "   ", "...", ". ."] {
            let out = sanitize_filename(name);
            assert!(out.starts_with("unnamed_file_"), "{out}");
            assert_eq!(out.len(), "unnamed_file_".len() + 8);
        }
    }
}

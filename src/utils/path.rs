//! File name sanitization for filesystem locations.

use crate::error::StoreError;

/// Turn a logical file name into a safe relative path.
///
/// Colons, control characters and newlines are dropped, then any run of
/// leading path separators is stripped, e.g. `/folder/:sample` ->
/// `folder/sample`. An empty or `.` result is rejected.
pub fn sanitize(name: &str) -> Result<String, StoreError> {
    let cleaned: String = name.chars().filter(|c| *c != ':' && !c.is_control()).collect();
    let cleaned = cleaned.trim_start_matches('/');

    if cleaned.is_empty() || cleaned == "." {
        return Err(StoreError::InvalidFileName {
            name: name.to_string(),
        });
    }

    Ok(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_colon_and_leading_separators() {
        let sanitized = sanitize("/folder/:sample").expect("name should sanitize");
        assert_eq!(sanitized, "folder/sample");

        let sanitized = sanitize("/folder/:sample.txt").expect("name should sanitize");
        assert_eq!(sanitized, "folder/sample.txt");
    }

    #[test]
    fn test_sanitize_strips_repeated_leading_separators() {
        let sanitized = sanitize("///folder/sample").expect("name should sanitize");
        assert_eq!(sanitized, "folder/sample");
    }

    #[test]
    fn test_sanitize_strips_control_characters_and_newlines() {
        let sanitized = sanitize("fol\nder/sam\tple").expect("name should sanitize");
        assert_eq!(sanitized, "folder/sample");
    }

    #[test]
    fn test_sanitize_rejects_empty_and_dot() {
        assert!(matches!(
            sanitize(""),
            Err(StoreError::InvalidFileName { .. })
        ));
        assert!(matches!(
            sanitize("."),
            Err(StoreError::InvalidFileName { .. })
        ));
        // Everything strips away, nothing left to name a file with
        assert!(matches!(
            sanitize("//:"),
            Err(StoreError::InvalidFileName { .. })
        ));
    }

    #[test]
    fn test_sanitize_keeps_valid_names_untouched() {
        let sanitized = sanitize("folder/sample").expect("name should sanitize");
        assert_eq!(sanitized, "folder/sample");
    }
}

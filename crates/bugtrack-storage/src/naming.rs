//! File name derivation for uploaded bug images.

use bugtrack_core::error::AppError;
use bugtrack_core::result::AppResult;

/// Lower-case `input`, collapse every run of non-alphanumeric characters
/// into one hyphen, trim hyphens from both ends, and cap the result at
/// `max_len` characters.
pub fn sanitize_segment(input: &str, max_len: usize) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;
    for ch in input.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(ch);
        } else {
            pending_hyphen = true;
        }
    }
    let capped: String = out.chars().take(max_len).collect();
    capped.trim_end_matches('-').to_string()
}

/// Build `{title}-{reporter}.png` from the raw title and reporter name.
pub fn image_file_name(title: &str, reporter: &str, max_len: usize) -> AppResult<String> {
    let title = sanitize_segment(title, max_len);
    let reporter = sanitize_segment(reporter, max_len);
    if title.is_empty() || reporter.is_empty() {
        return Err(AppError::validation(
            "Image name is empty after sanitizing title and reporter",
        ));
    }
    Ok(format!("{title}-{reporter}.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_collapses_and_trims() {
        assert_eq!(sanitize_segment("  Crash on Save!! ", 50), "crash-on-save");
        assert_eq!(sanitize_segment("a__b--c", 50), "a-b-c");
        assert_eq!(sanitize_segment("Ünïcode Title", 50), "n-code-title");
    }

    #[test]
    fn test_sanitize_caps_length_without_trailing_hyphen() {
        assert_eq!(sanitize_segment("abcd efgh", 5), "abcd");
        assert_eq!(sanitize_segment(&"x".repeat(80), 50).len(), 50);
    }

    #[test]
    fn test_image_file_name() {
        assert_eq!(
            image_file_name("Login fails", "Jane Doe", 50).unwrap(),
            "login-fails-jane-doe.png"
        );
        assert!(image_file_name("!!!", "Jane", 50).is_err());
    }
}

//! String utility functions for safe UTF-8 text manipulation.

/// Truncates `s` at a character boundary, appending `"..."` if truncated.
///
/// Unlike naive byte slicing (`&s[..n]`), this never panics on a
/// multi-byte UTF-8 character straddling the cut point.
///
/// # Examples
/// ```
/// use cogniweave_core::utils::string::truncate_at_char_boundary;
///
/// assert_eq!(truncate_at_char_boundary("hello world", 5), "hello...");
/// assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
/// assert_eq!(truncate_at_char_boundary("caf\u{e9}->world", 6), "caf\u{e9}->...");
/// ```
pub fn truncate_at_char_boundary(s: &str, max_chars: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_chars {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii_short() {
        assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_ascii_exact() {
        assert_eq!(truncate_at_char_boundary("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_ascii_long() {
        assert_eq!(truncate_at_char_boundary("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate_at_char_boundary("", 5), "");
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        let text = "stage one \u{2192} stage two";
        let result = truncate_at_char_boundary(text, 10);
        assert!(result.is_char_boundary(0));
        assert!(result.is_char_boundary(result.len()));
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_emoji() {
        let text = "\u{1f389}\u{1f38a}\u{1f388}\u{1f380}\u{1f380}";
        assert_eq!(
            truncate_at_char_boundary(text, 2),
            "\u{1f389}\u{1f38a}..."
        );
        assert_eq!(truncate_at_char_boundary(text, 5), text);
    }

    #[test]
    fn test_truncate_japanese() {
        let text = "\u{3053}\u{3093}\u{306b}\u{3061}\u{306f}\u{4e16}\u{754c}";
        assert_eq!(
            truncate_at_char_boundary(text, 3),
            "\u{3053}\u{3093}\u{306b}..."
        );
    }

    #[test]
    fn test_long_input_with_embedded_arrows_never_panics() {
        let text = "pipeline stage one \u{2192} stage two \u{2192} stage three completes \
                     with a result object carrying the accumulated token usage and \
                     whichever stage records finished before any failure occurred";
        let result = truncate_at_char_boundary(text, 30);
        assert!(result.len() <= text.len() + 3);
        assert!(result.ends_with("..."));
    }
}

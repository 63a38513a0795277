//! UTF-8-safe string helpers
//!
//! Text pulled out of rendered pages routinely contains multi-byte
//! characters (curly quotes, emoji, non-Latin scripts). Every truncation in
//! the extraction layer goes through these helpers so slicing never lands
//! inside a character.

/// Truncate a string to at most `max_chars` characters (not bytes).
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::utils::string_utils::safe_truncate_chars;
/// assert_eq!(safe_truncate_chars("Hello, World!", 5), "Hello");
/// assert_eq!(safe_truncate_chars("Café Olé", 4), "Café");
/// assert_eq!(safe_truncate_chars("Hi", 100), "Hi");
/// ```
#[inline]
pub fn safe_truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        None => s,
        Some((byte_idx, _)) => &s[..byte_idx],
    }
}

/// Collapse every whitespace run to a single space and trim both ends.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::utils::string_utils::collapse_whitespace;
/// assert_eq!(collapse_whitespace("  a \n\t b  "), "a b");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(safe_truncate_chars("🎉🎊🎈", 2), "🎉🎊");
    }

    #[test]
    fn test_collapse_whitespace_empty() {
        assert_eq!(collapse_whitespace(" \n\t "), "");
    }
}

//! URL helpers shared by the frontier, the renderer and the extractors.

use url::Url;

/// Normalize a caller-supplied site URL.
///
/// Surrounding whitespace is trimmed and `https://` is prefixed when the
/// input has no `scheme://` prefix. Any existing scheme is left alone, so
/// non-http schemes are rejected later by the frontier. The result is what
/// ends up in the record's `URL` field.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::utils::normalize_site_url;
/// assert_eq!(normalize_site_url("example.com"), "https://example.com");
/// assert_eq!(normalize_site_url("http://example.com/"), "http://example.com/");
/// assert_eq!(normalize_site_url("ftp://example.com"), "ftp://example.com");
/// ```
#[must_use]
pub fn normalize_site_url(input: &str) -> String {
    let trimmed = input.trim();
    if has_scheme(trimmed) {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed.trim_start_matches("//"))
    }
}

/// `scheme://` prefix per RFC 3986: a letter, then letters, digits, `+`, `-`, `.`
fn has_scheme(input: &str) -> bool {
    let Some((scheme, _)) = input.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// Visited-set key for a URL: scheme, host, port and path with the trailing
/// slash removed. Query and fragment are dropped.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::utils::url_key;
/// # use url::Url;
/// let a = Url::parse("https://Example.com/about/#team").unwrap();
/// let b = Url::parse("https://example.com/about").unwrap();
/// assert_eq!(url_key(&a), url_key(&b));
/// assert_eq!(url_key(&a), "https://example.com/about");
/// ```
#[must_use]
pub fn url_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
    let path = url.path().trim_end_matches('/');
    format!("{}://{host}{port}{path}", url.scheme())
}

/// Check if a URL is a crawlable http(s) URL
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    // Skip data URLs, javascript URLs, and other non-http schemes
    if url.starts_with("data:")
        || url.starts_with("javascript:")
        || url.starts_with("mailto:")
        || url.starts_with("tel:")
    {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

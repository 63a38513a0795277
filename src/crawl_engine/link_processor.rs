//! Link discovery from rendered markup
//!
//! Anchors are resolved against the page URL they were found on and handed
//! to the frontier, which applies the scope and dedup rules.

use log::debug;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::frontier::CrawlState;
use crate::utils::is_valid_url;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

/// Extract every crawlable http(s) link from the markup, in document order
#[must_use]
pub fn extract_links(markup: &str, page_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(markup);
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter_map(|href| page_url.join(href).ok())
        .filter(|url| is_valid_url(url.as_str()))
        .map(|mut url| {
            url.set_fragment(None);
            url
        })
        .collect()
}

/// Offer every link found on a page to the frontier
///
/// Returns the number of newly queued URLs.
pub fn process_page_links(state: &mut CrawlState, markup: &str, page_url: &Url) -> usize {
    let links = extract_links(markup, page_url);
    let found = links.len();
    let queued = links.iter().filter(|link| state.offer(link)).count();
    debug!(
        target: "sitebot::links",
        "Found {found} links on {page_url}, {queued} queued"
    );
    queued
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_relative_links() {
        let page = Url::parse("https://example.com/about/").unwrap();
        let html = r##"<a href="team">Team</a><a href="/contact#form">Contact</a>
            <a href="mailto:x@y.z">Mail</a><a href="javascript:void(0)">JS</a>"##;
        let links: Vec<String> = extract_links(html, &page)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://example.com/about/team".to_string(),
                "https://example.com/contact".to_string()
            ]
        );
    }

    #[test]
    fn only_in_scope_links_are_queued() {
        let mut state = CrawlState::initialize("https://example.com", 10).unwrap();
        let seed = state.next().unwrap();
        let html = r#"<a href="/about">About</a><a href="https://other.com/">Other</a>
            <a href="/about/">About again</a>"#;
        assert_eq!(process_page_links(&mut state, html, &seed), 1);
        assert_eq!(state.pending_count(), 1);
    }
}

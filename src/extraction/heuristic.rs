//! Deterministic pattern and DOM heuristics
//!
//! Contact channels come from regexes over visible text, social profiles
//! from anchor hosts, and name/description from page metadata. The same
//! input always produces the same record.

use async_trait::async_trait;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use url::Url;

use super::record::ExtractionRecord;
use super::{ExtractionError, ExtractionInput, Extractor};
use crate::content::NormalizedDocument;
use crate::content::visible_lines;
use crate::utils::string_utils::collapse_whitespace;
use crate::utils::{safe_truncate_chars, ABOUT_US_MAX_CHARS, DESCRIPTION_MAX_CHARS};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}")
        .expect("BUG: hardcoded email regex is invalid")
});

/// `+CC` followed by up to four digit groups
static INTL_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\+\d{1,3}[\s\-.]?\(?\d{1,4}\)?[\s\-.]?\d{2,4}[\s\-.]?\d{2,4}(?:[\s\-.]?\d{2,4})?")
        .expect("BUG: hardcoded international phone regex is invalid")
});

/// Punctuated national form: (415) 555-0100, 415.555.0100, 415-555-0100
static NATIONAL_PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(?\b\d{3}\)?[\s.\-]\d{3}[\s.\-]\d{4}\b")
        .expect("BUG: hardcoded national phone regex is invalid")
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("BUG: hardcoded CSS selector 'a[href]' is invalid")
});

static ADDRESS_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("address").expect("BUG: hardcoded CSS selector 'address' is invalid")
});

static TITLE_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("title").expect("BUG: hardcoded CSS selector 'title' is invalid")
});

static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta[content]").expect("BUG: hardcoded CSS selector 'meta[content]' is invalid")
});

/// Image file names look like emails ("logo@2x.png")
const NON_EMAIL_SUFFIXES: &[&str] = &[".png", ".jpg", ".jpeg", ".gif", ".svg", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Social {
    Facebook,
    Instagram,
    LinkedIn,
    TwitterX,
}

impl Social {
    const ALL: [Self; 4] = [Self::Facebook, Self::Instagram, Self::LinkedIn, Self::TwitterX];

    const fn domains(self) -> &'static [&'static str] {
        match self {
            Self::Facebook => &["facebook.com", "fb.com"],
            Self::Instagram => &["instagram.com"],
            Self::LinkedIn => &["linkedin.com"],
            Self::TwitterX => &["twitter.com", "x.com"],
        }
    }

    /// First path segments of share/intent endpoints, which are not profiles
    const fn non_profile_paths(self) -> &'static [&'static str] {
        match self {
            Self::Facebook => &["sharer", "sharer.php", "share", "dialog"],
            Self::Instagram => &[],
            Self::LinkedIn => &["sharing", "shareArticle"],
            Self::TwitterX => &["intent", "share"],
        }
    }

    fn matches(self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        let host = host.to_ascii_lowercase();
        let on_domain = self
            .domains()
            .iter()
            .any(|d| host == *d || host.ends_with(&format!(".{d}")));
        let first_segment = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default();
        on_domain && !self.non_profile_paths().contains(&first_segment)
    }
}

/// Page metadata from `<title>` and `<meta>` tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub site_name: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicExtractor;

impl HeuristicExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Synchronous core of the extractor
    #[must_use]
    pub fn extract_record(&self, input: &ExtractionInput<'_>) -> ExtractionRecord {
        let text = input.aggregated_text;
        let meta = input
            .pages
            .iter()
            .map(|p| extract_meta(&p.markup))
            .find(|m| !m.title.is_empty() || !m.description.is_empty() || !m.site_name.is_empty())
            .unwrap_or_default();

        let mut record = ExtractionRecord::for_site(input.site_url);
        record.business_name = first_non_empty([&meta.site_name, &meta.title]);
        record.about_us = safe_truncate_chars(text, ABOUT_US_MAX_CHARS).trim_end().to_string();
        record.description = if meta.description.is_empty() {
            safe_truncate_chars(text, DESCRIPTION_MAX_CHARS).trim_end().to_string()
        } else {
            meta.description.clone()
        };

        // Lines cover page chrome (footers) that the aggregated text drops
        let lines: Vec<String> = ordered_for_contact(input.pages)
            .flat_map(|page| visible_lines(&page.markup))
            .collect();

        record.email = find_email(text)
            .or_else(|| input.pages.iter().find_map(|p| mailto_address(&p.markup)))
            .or_else(|| lines.iter().find_map(|l| find_email(l)))
            .unwrap_or_default();

        record.phone = find_phone(text)
            .or_else(|| lines.iter().find_map(|l| find_phone(l)))
            .or_else(|| input.pages.iter().find_map(|p| tel_number(&p.markup)))
            .unwrap_or_default();

        record.address = ordered_for_contact(input.pages)
            .find_map(|p| address_element(&p.markup))
            .or_else(|| lines.iter().find(|l| looks_like_address(l)).cloned())
            .unwrap_or_default();

        for social in Social::ALL {
            let link = input
                .pages
                .iter()
                .find_map(|p| social_link(&p.markup, &p.url, social))
                .unwrap_or_default();
            match social {
                Social::Facebook => record.facebook = link,
                Social::Instagram => record.instagram = link,
                Social::LinkedIn => record.linkedin = link,
                Social::TwitterX => record.twitter_x = link,
            }
        }

        record
    }
}

#[async_trait]
impl Extractor for HeuristicExtractor {
    async fn extract(&self, input: &ExtractionInput<'_>) -> Result<ExtractionRecord, ExtractionError> {
        Ok(self.extract_record(input))
    }
}

fn first_non_empty<const N: usize>(candidates: [&String; N]) -> String {
    candidates
        .into_iter()
        .find(|c| !c.trim().is_empty())
        .map(|c| c.trim().to_string())
        .unwrap_or_default()
}

/// Contact pages first, then the rest in crawl order
fn ordered_for_contact(pages: &[NormalizedDocument]) -> impl Iterator<Item = &NormalizedDocument> {
    let is_contact = |p: &&NormalizedDocument| p.url.to_ascii_lowercase().contains("contact");
    pages
        .iter()
        .filter(is_contact)
        .chain(pages.iter().filter(move |p| !is_contact(p)))
}

/// First email address in the text
#[must_use]
pub fn find_email(text: &str) -> Option<String> {
    EMAIL_RE
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches('.'))
        .find(|candidate| {
            let lower = candidate.to_ascii_lowercase();
            !NON_EMAIL_SUFFIXES.iter().any(|s| lower.ends_with(s))
        })
        .map(str::to_string)
}

/// First phone number: international form preferred, national as fallback
#[must_use]
pub fn find_phone(text: &str) -> Option<String> {
    INTL_PHONE_RE
        .find(text)
        .or_else(|| NATIONAL_PHONE_RE.find(text))
        .map(|m| m.as_str().trim().to_string())
}

/// A line with at least four words and a digit, excluding copyright notices
#[must_use]
pub fn looks_like_address(line: &str) -> bool {
    let words = line.split_whitespace().count();
    let lower = line.to_ascii_lowercase();
    (4..=30).contains(&words)
        && line.chars().any(|c| c.is_ascii_digit())
        && !line.contains('©')
        && !lower.contains("copyright")
        && !lower.contains("all rights reserved")
}

/// `<title>`, `meta[name=description]` and `og:site_name` of a page
#[must_use]
pub fn extract_meta(markup: &str) -> PageMeta {
    let document = Html::parse_document(markup);
    let mut meta = PageMeta {
        title: document
            .select(&TITLE_SELECTOR)
            .next()
            .map(|t| collapse_whitespace(&t.text().collect::<String>()))
            .unwrap_or_default(),
        ..PageMeta::default()
    };

    for element in document.select(&META_SELECTOR) {
        let attrs = element.value();
        let content = collapse_whitespace(attrs.attr("content").unwrap_or_default());
        if content.is_empty() {
            continue;
        }
        let name = attrs.attr("name").unwrap_or_default().to_ascii_lowercase();
        let property = attrs.attr("property").unwrap_or_default().to_ascii_lowercase();
        if name == "description" && meta.description.is_empty() {
            meta.description = content;
        } else if property == "og:site_name" && meta.site_name.is_empty() {
            meta.site_name = content;
        }
    }
    meta
}

fn anchor_hrefs(document: &Html) -> impl Iterator<Item = &str> {
    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
}

fn mailto_address(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    anchor_hrefs(&document).find_map(|href| {
        let rest = href.get(..7)?.eq_ignore_ascii_case("mailto:").then(|| &href[7..])?;
        let address = rest.split('?').next().unwrap_or_default();
        find_email(address)
    })
}

fn tel_number(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    anchor_hrefs(&document).find_map(|href| {
        let number = href.get(..4)?.eq_ignore_ascii_case("tel:").then(|| href[4..].trim())?;
        (number.chars().filter(char::is_ascii_digit).count() >= 7).then(|| number.to_string())
    })
}

fn address_element(markup: &str) -> Option<String> {
    let document = Html::parse_document(markup);
    document
        .select(&ADDRESS_SELECTOR)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .find(|text| looks_like_address(text))
}

fn social_link(markup: &str, page_url: &str, social: Social) -> Option<String> {
    let base = Url::parse(page_url).ok()?;
    let document = Html::parse_document(markup);
    anchor_hrefs(&document).find_map(|href| {
        let url = base.join(href).ok()?;
        social.matches(&url).then(|| url.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(url: &str, markup: &str) -> NormalizedDocument {
        NormalizedDocument {
            url: url.to_string(),
            markup: markup.to_string(),
            plain_text: crate::content::normalize(markup),
        }
    }

    fn run(site: &str, pages: &[NormalizedDocument]) -> ExtractionRecord {
        let text = pages
            .iter()
            .map(|p| p.plain_text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let input = ExtractionInput {
            site_url: site,
            aggregated_text: &text,
            chunks: &[],
            pages,
        };
        HeuristicExtractor::new().extract_record(&input)
    }

    #[test]
    fn finds_email_and_international_phone() {
        let text = "Call us at +1-415-555-0100 or email hello@acme.com";
        assert_eq!(find_email(text).as_deref(), Some("hello@acme.com"));
        assert_eq!(find_phone(text).as_deref(), Some("+1-415-555-0100"));
    }

    #[test]
    fn national_phone_fallback() {
        assert_eq!(
            find_phone("Office: (415) 555-0100").as_deref(),
            Some("(415) 555-0100")
        );
        assert_eq!(find_phone("Founded 1999, 40 staff"), None);
    }

    #[test]
    fn image_names_are_not_emails() {
        assert_eq!(find_email("logo@2x.png then sales@acme.io").as_deref(), Some("sales@acme.io"));
    }

    #[test]
    fn social_hosts_match_on_domain_boundary() {
        let fb = Url::parse("https://www.facebook.com/acme").unwrap();
        let fake = Url::parse("https://notfacebook.com/acme").unwrap();
        let share = Url::parse("https://twitter.com/intent/tweet?text=hi").unwrap();
        let x = Url::parse("https://x.com/acme").unwrap();
        assert!(Social::Facebook.matches(&fb));
        assert!(!Social::Facebook.matches(&fake));
        assert!(!Social::TwitterX.matches(&share));
        assert!(Social::TwitterX.matches(&x));
    }

    #[test]
    fn meta_prefers_site_name() {
        let html = r#"<html><head><title> Acme | Home </title>
            <meta name="Description" content="Rockets for everyone">
            <meta property="og:site_name" content="Acme Rockets"></head><body></body></html>"#;
        let meta = extract_meta(html);
        assert_eq!(meta.title, "Acme | Home");
        assert_eq!(meta.description, "Rockets for everyone");
        assert_eq!(meta.site_name, "Acme Rockets");
    }

    #[test]
    fn full_record_from_pages() {
        let home = page(
            "https://acme.io/",
            r#"<html><head><title>Acme</title></head><body>
               <main><p>We build rockets.</p></main>
               <footer><a href="https://www.linkedin.com/company/acme">in</a>
               <a href="https://x.com/acme">x</a><a href="https://x.com/intent/tweet">share</a></footer>
               </body></html>"#,
        );
        let contact = page(
            "https://acme.io/contact",
            r#"<html><body><main><p>Email hello@acme.io</p></main>
               <footer><p>42 Launch Road, Houston TX 77058</p></footer></body></html>"#,
        );
        let record = run("https://acme.io", &[home, contact]);
        assert_eq!(record.business_name, "Acme");
        assert_eq!(record.email, "hello@acme.io");
        assert_eq!(record.phone, "");
        assert_eq!(record.address, "42 Launch Road, Houston TX 77058");
        assert_eq!(record.linkedin, "https://www.linkedin.com/company/acme");
        assert_eq!(record.twitter_x, "https://x.com/acme");
        assert_eq!(record.facebook, "");
        assert!(record.main_services.is_empty());
        assert_eq!(record.url, "https://acme.io");
        assert_eq!(record.description, "We build rockets. Email hello@acme.io");
    }

    #[test]
    fn address_element_wins() {
        let p = page(
            "https://acme.io/",
            "<body><p>Open 9 to 5 every weekday</p><address>1 Infinite Loop<br>Cupertino</address></body>",
        );
        assert_eq!(run("https://acme.io", &[p]).address, "1 Infinite Loop Cupertino");
    }

    #[test]
    fn address_element_without_street_falls_through() {
        let p = page(
            "https://acme.io/contact",
            r#"<body>
                <address>Contact: <a href="mailto:hi@acme.io">hi@acme.io</a></address>
                <footer><p>1200 Harbor Way, Oakland, CA 94607</p></footer>
            </body>"#,
        );
        assert_eq!(
            run("https://acme.io", &[p]).address,
            "1200 Harbor Way, Oakland, CA 94607"
        );
    }

    #[test]
    fn share_filter_matches_whole_segments() {
        let profile = Url::parse("https://x.com/sharethelove").unwrap();
        let fb_profile = Url::parse("https://www.facebook.com/shareacme").unwrap();
        let share = Url::parse("https://x.com/share?text=hi").unwrap();
        let sharer = Url::parse("https://www.facebook.com/sharer/sharer.php?u=a").unwrap();
        assert!(Social::TwitterX.matches(&profile));
        assert!(Social::Facebook.matches(&fb_profile));
        assert!(!Social::TwitterX.matches(&share));
        assert!(!Social::Facebook.matches(&sharer));
    }

    #[test]
    fn about_us_is_truncated() {
        let long = "word ".repeat(400);
        let p = page("https://acme.io/", &format!("<body><main>{long}</main></body>"));
        let record = run("https://acme.io", &[p]);
        assert!(record.about_us.chars().count() <= ABOUT_US_MAX_CHARS);
        assert!(record.description.chars().count() <= DESCRIPTION_MAX_CHARS);
    }

    #[test]
    fn copyright_lines_are_not_addresses() {
        assert!(!looks_like_address("© 2024 Acme Inc. All rights reserved"));
        assert!(looks_like_address("221B Baker Street, London NW1"));
    }
}

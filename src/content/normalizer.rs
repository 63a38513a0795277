//! Rendered markup to plain text.
//!
//! Two walks over the same parsed document:
//! - [`normalize`] drops page chrome (navigation, header, footer, sidebars),
//!   picks the primary content container and returns one whitespace-collapsed
//!   string. This is the text the chunker and the generative extractor see.
//! - [`visible_lines`] keeps the chrome and emits a line per block-level
//!   element. Footers are where postal addresses live, so the address
//!   heuristic reads these lines.

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::utils::string_utils::collapse_whitespace;

/// Markup beyond this many bytes is ignored
pub const MAX_HTML_SIZE: usize = 10 * 1024 * 1024;

/// Recursion guard for pathological nesting; deeper subtrees are skipped
const MAX_HTML_NESTING_DEPTH: usize = 100;

static NON_TEXT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("script, style, noscript, template, svg, iframe")
        .expect("BUG: hardcoded CSS selector for non-text elements is invalid")
});

static CHROME_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("nav, header, footer, aside, [role='navigation'], [role='banner'], [role='contentinfo']")
        .expect("BUG: hardcoded CSS selector for page chrome is invalid")
});

static BODY_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("body").expect("BUG: hardcoded CSS selector 'body' is invalid")
});

/// Primary content containers, highest priority first
static CONTENT_SELECTORS: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    [
        "main",
        "article",
        "[role='main']",
        "#main-content",
        ".main-content",
        "#content",
        ".content",
        ".post-content",
        ".entry-content",
        "[itemprop='articleBody']",
        ".article-body",
        ".story-body",
    ]
    .iter()
    .map(|s| {
        Selector::parse(s).unwrap_or_else(|e| panic!("BUG: hardcoded CSS selector '{s}' is invalid: {e}"))
    })
    .collect()
});

const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// Extract the visible main-content text of a page
///
/// Pure and deterministic: the same markup always yields the same text.
///
/// # Examples
/// ```
/// # use kodegen_tools_sitebot::content::normalize;
/// let html = "<html><body><nav>Menu</nav><main><h1>Acme</h1>\n<p>We  build\trockets.</p></main></body></html>";
/// assert_eq!(normalize(html), "Acme We build rockets.");
/// ```
#[must_use]
pub fn normalize(raw_markup: &str) -> String {
    let document = Html::parse_document(bounded(raw_markup));

    let mut skip = collect_ids(&document, &NON_TEXT_SELECTOR);
    skip.extend(collect_ids(&document, &CHROME_SELECTOR));

    for selector in CONTENT_SELECTORS.iter() {
        let candidate = document
            .select(selector)
            .find(|el| !is_skipped(el, &skip));
        if let Some(container) = candidate {
            let text = text_of(*container, &skip, false);
            if !text.is_empty() {
                return text;
            }
            // An empty shell (client-rendered placeholder); fall back to body
            break;
        }
    }

    match document.select(&BODY_SELECTOR).next() {
        Some(body) => text_of(*body, &skip, false),
        None => text_of(document.tree.root(), &skip, false),
    }
}

/// Visible text of the whole page, one entry per block-level line
///
/// Lines are whitespace-collapsed and never empty.
#[must_use]
pub fn visible_lines(raw_markup: &str) -> Vec<String> {
    let document = Html::parse_document(bounded(raw_markup));
    let skip = collect_ids(&document, &NON_TEXT_SELECTOR);

    let root = match document.select(&BODY_SELECTOR).next() {
        Some(body) => *body,
        None => document.tree.root(),
    };

    let mut raw = String::new();
    walk(root, &skip, &mut raw, true, 0);
    raw.lines()
        .map(collapse_whitespace)
        .filter(|line| !line.is_empty())
        .collect()
}

fn bounded(raw_markup: &str) -> &str {
    if raw_markup.len() <= MAX_HTML_SIZE {
        return raw_markup;
    }
    tracing::warn!(
        size = raw_markup.len(),
        limit = MAX_HTML_SIZE,
        "Markup exceeds size limit, truncating"
    );
    let mut end = MAX_HTML_SIZE;
    while !raw_markup.is_char_boundary(end) {
        end -= 1;
    }
    &raw_markup[..end]
}

fn collect_ids(document: &Html, selector: &Selector) -> HashSet<NodeId> {
    document.select(selector).map(|el| el.id()).collect()
}

fn is_skipped(element: &ElementRef<'_>, skip: &HashSet<NodeId>) -> bool {
    skip.contains(&element.id()) || element.ancestors().any(|a| skip.contains(&a.id()))
}

fn text_of(node: NodeRef<'_, Node>, skip: &HashSet<NodeId>, line_breaks: bool) -> String {
    let mut raw = String::new();
    walk(node, skip, &mut raw, line_breaks, 0);
    collapse_whitespace(&raw)
}

fn walk(
    node: NodeRef<'_, Node>,
    skip: &HashSet<NodeId>,
    out: &mut String,
    line_breaks: bool,
    depth: usize,
) {
    if depth > MAX_HTML_NESTING_DEPTH {
        tracing::warn!(depth, "Maximum HTML nesting depth exceeded, skipping subtree");
        return;
    }

    for child in node.children() {
        if skip.contains(&child.id()) {
            continue;
        }
        match child.value() {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            Node::Element(element) => {
                let block = line_breaks && BLOCK_ELEMENTS.contains(&element.name());
                if block {
                    out.push('\n');
                }
                walk(child, skip, out, line_breaks, depth + 1);
                if block {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

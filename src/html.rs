//! Text helpers shared by the job sources: HTML stripping, keyword
//! requirement matching, and posting date parsing.

use chrono::{DateTime, Utc};
use scraper::{Html, Node};

/// Elements that start a new run of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "section", "article", "blockquote",
];

/// Visible text of an HTML fragment, entities decoded, whitespace collapsed.
/// Plain text passes through unchanged apart from whitespace.
pub fn strip_tags(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    let mut text = String::with_capacity(fragment.len());
    for node in doc.root_element().descendants() {
        match node.value() {
            Node::Text(run) => text.push_str(run),
            Node::Element(el) if BLOCK_TAGS.contains(&el.name()) => text.push(' '),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keywords from `vocabulary` that occur in `text`, case-insensitive,
/// in vocabulary order. `None` when nothing matches.
///
/// Matching is by substring, so short keywords such as `go` also match
/// inside longer words.
pub fn match_keywords(text: &str, vocabulary: &[&str]) -> Option<Vec<String>> {
    let haystack = text.to_lowercase();
    let found: Vec<String> = vocabulary
        .iter()
        .filter(|keyword| haystack.contains(&keyword.to_lowercase()))
        .map(|keyword| keyword.to_string())
        .collect();
    (!found.is_empty()).then_some(found)
}

/// RFC 3339 timestamp (`Z` or offset) as unix seconds, falling back to now.
pub fn posted_at_or_now(raw: Option<&str>) -> i64 {
    raw.and_then(parse_timestamp)
        .unwrap_or_else(|| Utc::now().timestamp())
}

fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.timestamp());
    }
    // Offset-less ISO timestamps are taken as UTC.
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().timestamp())
}

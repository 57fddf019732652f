//! Field extraction from a single `item`/`entry` element.
//!
//! Every lookup is over direct children only and compares local names, so
//! `<title>` and `<atom:title>` are treated the same.

use chrono::{DateTime, Utc};

use super::date::normalize_date;
use super::xml::Element;

pub const TITLE_TAGS: &[&str] = &["title"];
pub const PUBLISHED_TAGS: &[&str] = &["pubDate", "published", "updated"];
pub const SUMMARY_TAGS: &[&str] = &["description", "summary", "content", "encoded"];

/// Returns the trimmed text of the first direct child matching one of
/// `candidates`.
///
/// Candidates are tried in priority order; within a candidate, children are
/// tried in document order. Children whose text is empty after trimming are
/// passed over.
pub fn first_text<'a>(element: &'a Element, candidates: &[&str]) -> Option<&'a str> {
    candidates.iter().find_map(|name| {
        element
            .children_named(name)
            .map(|child| child.text.trim())
            .find(|text| !text.is_empty())
    })
}

pub fn extract_title(element: &Element) -> Option<&str> {
    first_text(element, TITLE_TAGS)
}

/// Link from the first `link` child that yields a value.
///
/// RSS puts the URL in the element text; Atom uses an `href` attribute on an
/// empty element. Text is preferred over `href` on the same child.
pub fn extract_link(element: &Element) -> Option<&str> {
    element.children_named("link").find_map(|child| {
        let text = child.text.trim();
        if !text.is_empty() {
            return Some(text);
        }
        child.attr("href").map(str::trim).filter(|href| !href.is_empty())
    })
}

/// Publish time from the first date candidate that parses.
///
/// Candidates are walked in [`PUBLISHED_TAGS`] order and the first value that
/// normalizes wins; values are never combined.
pub fn extract_published(element: &Element) -> Option<DateTime<Utc>> {
    PUBLISHED_TAGS.iter().find_map(|name| {
        element
            .children_named(name)
            .map(|child| child.text.trim())
            .filter(|text| !text.is_empty())
            .find_map(normalize_date)
    })
}

/// Raw summary text, or an empty string.
pub fn extract_summary(element: &Element) -> String {
    first_text(element, SUMMARY_TAGS)
        .map(str::to_string)
        .unwrap_or_default()
}

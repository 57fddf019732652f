use chrono::{DateTime, Utc};

/// A normalized feed entry.
///
/// Only produced by [`super::parser`] after the title, link and publish date
/// have all been extracted and validated, so every field is populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Link text or Atom `href`.
    pub link: String,
    /// Publish time, always UTC.
    pub published: DateTime<Utc>,
    /// Raw summary markup; empty when the entry has none.
    pub summary: String,
    /// URL of the feed the entry was read from.
    pub source_feed: String,
}

impl FeedEntry {
    /// Whether the entry falls inside a window starting at `cutoff` (inclusive).
    pub fn is_since(&self, cutoff: DateTime<Utc>) -> bool {
        self.published >= cutoff
    }
}

/// Sorts entries newest first. The sort is stable, so entries with equal
/// timestamps keep their relative input order.
pub fn sort_by_recency(entries: &mut [FeedEntry]) {
    entries.sort_by(|a, b| b.published.cmp(&a.published));
}

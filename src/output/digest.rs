use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::OutputError;
use crate::feed::FeedEntry;
use crate::util::write_atomic;

/// The structured output of a `fetch` run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub window_hours: u64,
    /// Every feed URL consulted, including ones that failed.
    pub feeds: Vec<String>,
    pub entries: Vec<DigestEntry>,
}

/// One entry as written to the digest file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigestEntry {
    pub title: String,
    pub link: String,
    pub summary: String,
    /// The summary exactly as the feed delivered it.
    pub description_original: String,
    pub published: DateTime<Utc>,
    pub source_feed: String,
}

impl From<&FeedEntry> for DigestEntry {
    fn from(entry: &FeedEntry) -> Self {
        Self {
            title: entry.title.clone(),
            link: entry.link.clone(),
            summary: entry.summary.clone(),
            description_original: entry.summary.clone(),
            published: entry.published,
            source_feed: entry.source_feed.clone(),
        }
    }
}

impl From<DigestEntry> for FeedEntry {
    fn from(entry: DigestEntry) -> Self {
        Self {
            title: entry.title,
            link: entry.link,
            published: entry.published,
            summary: entry.description_original,
            source_feed: entry.source_feed,
        }
    }
}

impl Digest {
    pub fn new(
        generated_at: DateTime<Utc>,
        window_hours: u64,
        feeds: &[String],
        entries: &[FeedEntry],
    ) -> Self {
        Self {
            generated_at,
            window_hours,
            feeds: feeds.to_vec(),
            entries: entries.iter().map(DigestEntry::from).collect(),
        }
    }

    /// Converts the stored entries back into [`FeedEntry`] values.
    pub fn feed_entries(&self) -> Vec<FeedEntry> {
        self.entries.iter().cloned().map(FeedEntry::from).collect()
    }
}

/// Writes the digest as pretty-printed JSON, creating parent directories.
///
/// The file is written even when the digest has no entries.
///
/// # Errors
///
/// [`OutputError::Write`] if the file or its directories cannot be created.
pub fn write_digest(path: &Path, digest: &Digest) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(digest)?;
    write_atomic(path, json.as_bytes()).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = digest.entries.len(), "Digest written");
    Ok(())
}

/// Reads a digest previously written by [`write_digest`].
///
/// # Errors
///
/// [`OutputError::Read`] if the file cannot be read, [`OutputError::Json`] if
/// it is not a digest.
pub fn read_digest(path: &Path) -> Result<Digest, OutputError> {
    let content = std::fs::read_to_string(path).map_err(|source| OutputError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}

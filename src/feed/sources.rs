use std::path::Path;

use thiserror::Error;

use crate::util::{expand_home, validate_feed_url};

/// Feed consulted when neither the config file nor the CLI names any.
pub const DEFAULT_FEEDS: &[&str] = &["https://feeds.feedburner.com/geeknews-feed"];

/// Errors that can occur while loading the feed list.
#[derive(Debug, Error)]
pub enum SourcesError {
    /// The feeds file exists but could not be read.
    #[error("Failed to read feeds file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Builds the list of feed URLs for a run.
///
/// Starts from `defaults` and appends the URLs listed in `feeds_file`, if
/// given. A missing feeds file is logged and otherwise ignored; any other
/// read error is returned. Invalid URLs are skipped with a warning and exact
/// duplicates are kept once, at their first position.
///
/// # Errors
///
/// Returns [`SourcesError::Io`] if the feeds file exists but cannot be read.
pub async fn load_feeds(
    defaults: &[String],
    feeds_file: Option<&Path>,
) -> Result<Vec<String>, SourcesError> {
    let mut feeds: Vec<String> = Vec::with_capacity(defaults.len());
    for url in defaults {
        push_feed(&mut feeds, url);
    }

    let Some(feeds_file) = feeds_file else {
        return Ok(feeds);
    };

    let path = expand_home(feeds_file);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::warn!(path = %path.display(), "Feeds file not found");
            return Ok(feeds);
        }
        Err(e) => {
            return Err(SourcesError::Io {
                path: path.display().to_string(),
                source: e,
            })
        }
    };

    let before = feeds.len();
    for url in parse_feed_list(&content) {
        push_feed(&mut feeds, url);
    }
    tracing::debug!(
        path = %path.display(),
        added = feeds.len() - before,
        "Loaded feeds file"
    );

    Ok(feeds)
}

/// Extracts candidate URLs from feeds-file content.
///
/// One URL per line; lines are trimmed, and blank lines and lines starting
/// with `#` are ignored.
pub fn parse_feed_list(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn push_feed(feeds: &mut Vec<String>, url: &str) {
    let url = url.trim();
    if let Err(e) = validate_feed_url(url) {
        tracing::warn!(url = %url, error = %e, "Skipping invalid feed URL");
        return;
    }
    if feeds.iter().any(|existing| existing == url) {
        tracing::debug!(url = %url, "Skipping duplicate feed URL");
        return;
    }
    feeds.push(url.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn defaults() -> Vec<String> {
        DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_feed_list_skips_comments_and_blanks() {
        let content = "# my feeds\n\nhttps://a.example/rss\n   \n  https://b.example/atom  \n#https://c.example\n";
        let urls: Vec<&str> = parse_feed_list(content).collect();
        assert_eq!(urls, vec!["https://a.example/rss", "https://b.example/atom"]);
    }

    #[tokio::test]
    async fn test_defaults_only() {
        let feeds = load_feeds(&defaults(), None).await.unwrap();
        assert_eq!(feeds, vec!["https://feeds.feedburner.com/geeknews-feed".to_string()]);
    }

    #[tokio::test]
    async fn test_missing_file_keeps_defaults() {
        let path = Path::new("/tmp/dailynews_test_nonexistent_feeds.txt");
        let feeds = load_feeds(&defaults(), Some(path)).await.unwrap();
        assert_eq!(feeds, defaults());
    }

    #[tokio::test]
    async fn test_file_feeds_are_appended() {
        let dir = std::env::temp_dir().join("dailynews_sources_test_append");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("feeds.txt");
        std::fs::write(
            &path,
            "# extra\nhttps://blog.example.com/feed\nnot a url\nftp://files.example.com/rss\nhttps://feeds.feedburner.com/geeknews-feed\nhttps://blog.example.com/feed\n",
        )
        .unwrap();

        let feeds = load_feeds(&defaults(), Some(&path)).await.unwrap();
        assert_eq!(
            feeds,
            vec![
                "https://feeds.feedburner.com/geeknews-feed".to_string(),
                "https://blog.example.com/feed".to_string(),
            ]
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_directory_instead_of_file_is_error() {
        let dir = std::env::temp_dir().join("dailynews_sources_test_dir");
        std::fs::create_dir_all(&dir).unwrap();

        let result = load_feeds(&defaults(), Some(&dir)).await;
        assert!(matches!(result, Err(SourcesError::Io { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }
}

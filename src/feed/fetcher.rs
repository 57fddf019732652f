use chrono::{DateTime, TimeDelta, Utc};
use futures::stream::{self, StreamExt};
use std::time::Duration;
use thiserror::Error;

use super::entry::{sort_by_recency, FeedEntry};
use super::parser::{parse_feed, ParseResult};

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while fetching and parsing one feed.
///
/// Every variant is isolated to its feed: the run continues with the
/// remaining feeds and the failing one contributes no entries.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request or body read exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// Feed XML could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),
    /// Response body exceeded the 10MB size limit
    #[error("Response too large")]
    ResponseTooLarge,
}

/// Settings for one collection run.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Entries older than `now - window` are dropped.
    pub window: TimeDelta,
    /// Titles starting with any of these are never collected.
    pub ignored_prefixes: Vec<String>,
    /// Bound on each feed's request plus body read.
    pub timeout: Duration,
    /// Feeds fetched at the same time. `1` fetches strictly one after another.
    pub max_concurrent: usize,
}

/// Result of a single feed fetch.
#[derive(Debug)]
pub struct FeedOutcome {
    /// URL of the feed that was fetched
    pub url: String,
    /// Number of entries kept after the window cutoff, or the error that occurred
    pub result: Result<usize, FetchError>,
}

/// Everything a collection run produced.
#[derive(Debug)]
pub struct Collection {
    /// Entries from all feeds, newest first.
    pub entries: Vec<FeedEntry>,
    /// One outcome per feed, in input order.
    pub outcomes: Vec<FeedOutcome>,
}

impl Collection {
    /// Outcomes of feeds that contributed nothing because of an error.
    pub fn failures(&self) -> impl Iterator<Item = &FeedOutcome> {
        self.outcomes.iter().filter(|outcome| outcome.result.is_err())
    }
}

/// Builds the HTTP client used for feed requests.
///
/// The user agent identifies the fetcher to feed hosts.
///
/// # Errors
///
/// Returns [`FetchError::Network`] if the TLS backend cannot be initialized.
pub fn build_client(user_agent: &str, timeout: Duration) -> Result<reqwest::Client, FetchError> {
    let client = reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Fetches every feed, keeps entries inside the window, and merges them.
///
/// Feeds are processed through an ordered buffer of `options.max_concurrent`
/// requests, so results come back in input order regardless of which request
/// finishes first. Sorting happens only after all feeds are done, which keeps
/// the output identical for any concurrency setting.
///
/// Failing feeds are logged with their URL and recorded in
/// [`Collection::outcomes`]; they never abort the run.
pub async fn collect_entries(
    client: &reqwest::Client,
    feeds: &[String],
    options: &FetchOptions,
    now: DateTime<Utc>,
) -> Collection {
    let cutoff = now
        .checked_sub_signed(options.window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let results: Vec<(String, Result<Vec<FeedEntry>, FetchError>)> = stream::iter(feeds.iter())
        .map(|url| async move {
            let result = fetch_entries(client, url, options).await;
            (url.clone(), result)
        })
        .buffered(options.max_concurrent.max(1))
        .collect()
        .await;

    let mut entries = Vec::new();
    let mut outcomes = Vec::with_capacity(results.len());

    for (url, result) in results {
        let result = match result {
            Ok(feed_entries) => {
                let before = entries.len();
                entries.extend(feed_entries.into_iter().filter(|e| e.is_since(cutoff)));
                let kept = entries.len() - before;
                tracing::info!(feed = %url, kept = kept, "Feed collected");
                Ok(kept)
            }
            Err(e) => {
                tracing::warn!(feed = %url, error = %e, "Failed to collect feed, skipping");
                Err(e)
            }
        };
        outcomes.push(FeedOutcome { url, result });
    }

    sort_by_recency(&mut entries);

    Collection { entries, outcomes }
}

/// Fetches and parses one feed without applying the window.
///
/// # Errors
///
/// Any [`FetchError`] from the request or from parsing.
pub async fn fetch_entries(
    client: &reqwest::Client,
    url: &str,
    options: &FetchOptions,
) -> Result<Vec<FeedEntry>, FetchError> {
    let bytes = fetch_feed(client, url, options.timeout).await?;

    let ParseResult { entries, skipped } = parse_feed(&bytes, url, &options.ignored_prefixes)
        .map_err(|e| FetchError::Parse(e.to_string()))?;

    tracing::debug!(
        feed = %url,
        entries = entries.len(),
        skipped = skipped,
        "Parsed feed"
    );

    Ok(entries)
}

/// Downloads a feed body with a single GET.
///
/// No retries: a timeout, transport error, or non-2xx status fails the feed.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request plus body read exceeded `timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
pub async fn fetch_feed(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<Vec<u8>, FetchError> {
    tokio::time::timeout(timeout, fetch_body(client, url))
        .await
        .map_err(|_| FetchError::Timeout)?
        .map_err(|e| match e {
            FetchError::Network(inner) if inner.is_timeout() => FetchError::Timeout,
            other => other,
        })
}

async fn fetch_body(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, FetchError> {
    let response = client.get(url).send().await?;

    // Non-2xx fails the feed immediately
    if !response.status().is_success() {
        return Err(FetchError::HttpStatus(response.status().as_u16()));
    }

    read_limited_bytes(response, MAX_FEED_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <item><title>Test</title><link>https://example.com/1</link><pubDate>Wed, 02 Oct 2024 10:00:00 GMT</pubDate></item>
</channel></rss>"#;

    fn options() -> FetchOptions {
        FetchOptions {
            window: TimeDelta::hours(24),
            ignored_prefixes: vec!["Show GN:".to_string()],
            timeout: Duration::from_secs(5),
            max_concurrent: 1,
        }
    }

    #[tokio::test]
    async fn test_fetch_success_sends_user_agent() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/feed"))
            .and(header("user-agent", "dailynews-test/1.0"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .insert_header("Content-Type", "application/rss+xml"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = build_client("dailynews-test/1.0", Duration::from_secs(5)).unwrap();
        let url = format!("{}/feed", mock_server.uri());

        let entries = fetch_entries(&client, &url, &options()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].source_feed, url);
    }

    #[tokio::test]
    async fn test_fetch_404_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        match fetch_entries(&client, &url, &options()).await {
            Err(FetchError::HttpStatus(404)) => {}
            other => panic!("Expected HttpStatus(404), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_500_is_not_retried() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        match fetch_feed(&client, &url, Duration::from_secs(5)).await {
            Err(FetchError::HttpStatus(500)) => {}
            other => panic!("Expected HttpStatus(500), got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_feed_parse_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<not valid xml"))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        match fetch_entries(&client, &url, &options()).await {
            Err(FetchError::Parse(_)) => {}
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_feed_times_out() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RSS)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        match fetch_feed(&client, &url, Duration::from_millis(200)).await {
            Err(FetchError::Timeout) => {}
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_oversized_body_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a'; MAX_FEED_SIZE + 1]))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        match fetch_feed(&client, &url, Duration::from_secs(10)).await {
            Err(FetchError::ResponseTooLarge) => {}
            other => panic!("Expected ResponseTooLarge, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_feed_success() {
        let empty_rss = r#"<?xml version="1.0"?>
<rss version="2.0"><channel></channel></rss>"#;

        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(empty_rss))
            .mount(&mock_server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/feed", mock_server.uri());

        let entries = fetch_entries(&client, &url, &options()).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_collect_with_no_feeds() {
        let client = reqwest::Client::new();
        let collection = collect_entries(&client, &[], &options(), Utc::now()).await;
        assert!(collection.entries.is_empty());
        assert!(collection.outcomes.is_empty());
    }
}

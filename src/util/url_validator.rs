use thiserror::Error;
use url::Url;

/// Errors that can occur while validating a feed URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
}

/// Validates a URL string for use as a feed source.
///
/// Only absolute `http`/`https` URLs with a host are accepted. Loopback and
/// private addresses are allowed: self-hosted feeds on an internal network
/// are a normal input for a batch job.
///
/// # Examples
///
/// ```
/// use dailynews::util::validate_feed_url;
///
/// let url = validate_feed_url("https://feeds.feedburner.com/geeknews-feed").unwrap();
/// assert_eq!(url.host_str(), Some("feeds.feedburner.com"));
///
/// assert!(validate_feed_url("file:///etc/passwd").is_err());
/// assert!(validate_feed_url("feeds.example.com/rss").is_err());
/// ```
pub fn validate_feed_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_urls() {
        assert!(validate_feed_url("https://example.com/feed.xml").is_ok());
        assert!(validate_feed_url("http://news.example.org").is_ok());
        assert!(validate_feed_url("https://example.com:8443/rss?lang=ko").is_ok());
    }

    #[test]
    fn test_local_hosts_accepted() {
        assert!(validate_feed_url("http://127.0.0.1:8080/feed").is_ok());
        assert!(validate_feed_url("http://intranet.local/rss").is_ok());
    }

    #[test]
    fn test_invalid_schemes() {
        assert!(matches!(
            validate_feed_url("file:///etc/passwd"),
            Err(UrlValidationError::UnsupportedScheme(_))
        ));
        assert!(validate_feed_url("ftp://example.com").is_err());
    }

    #[test]
    fn test_relative_url_rejected() {
        assert!(matches!(
            validate_feed_url("/feed.xml"),
            Err(UrlValidationError::InvalidUrl(_))
        ));
    }
}

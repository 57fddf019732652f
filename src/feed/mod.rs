//! Feed retrieval and normalization for RSS/Atom feeds.
//!
//! This module turns feed URLs into a single recency-ordered list of
//! [`FeedEntry`] values:
//!
//! - **Sources**: the default feed list plus an optional feeds file
//! - **Fetching**: one GET per feed with a timeout and a size cap
//! - **Parsing**: namespace-aware XML tree, then a namespace-agnostic scan for
//!   `item`/`entry` elements and field extraction with ordered fallbacks
//!
//! # Architecture
//!
//! - [`tag`] - local-name resolution for `{uri}local` tags
//! - [`xml`] - owned element tree built with `quick-xml`
//! - [`extract`] - title/link/published/summary lookup on one entry
//! - [`date`] - RFC-2822 / ISO-8601 date normalization to UTC
//! - [`parser`] - full-tree entry scan, prefix exclusion, normalization
//! - [`fetcher`] - HTTP retrieval, window cutoff, merge and sort
//! - [`sources`] - feed list loading
//!
//! # Example
//!
//! ```ignore
//! use dailynews::feed::{build_client, collect_entries, load_feeds};
//!
//! let feeds = load_feeds(&config.feeds, feeds_file.as_deref()).await?;
//! let client = build_client(&config.user_agent, options.timeout)?;
//! let collection = collect_entries(&client, &feeds, &options, Utc::now()).await;
//! ```

pub mod date;
pub mod entry;
pub mod extract;
pub mod fetcher;
pub mod parser;
pub mod sources;
pub mod tag;
pub mod xml;

pub use date::normalize_date;
pub use entry::{sort_by_recency, FeedEntry};
pub use fetcher::{
    build_client, collect_entries, fetch_entries, fetch_feed, Collection, FeedOutcome,
    FetchError, FetchOptions,
};
pub use parser::{entries, parse_feed, ParseResult};
pub use sources::{load_feeds, parse_feed_list, SourcesError, DEFAULT_FEEDS};
pub use tag::local_name;
pub use xml::{parse_document, Element, XmlError};

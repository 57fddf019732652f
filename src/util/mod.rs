//! Utility functions for common operations.
//!
//! This module provides reusable utilities for:
//!
//! - **URL validation**: feed URLs must be absolute http(s) URLs
//! - **Text processing**: HTML-to-text cleaning and display-width aware wrapping
//! - **Files**: `~` expansion, the config directory, atomic writes
//!
//! # Examples
//!
//! ```
//! use dailynews::util::{clean_html, validate_feed_url, wrap_text};
//!
//! let url = validate_feed_url("https://example.com/feed.xml").unwrap();
//! let text = clean_html("<p>Hello <b>world</b></p>");
//! let lines = wrap_text(&text, 80);
//! assert_eq!(lines, vec!["Hello world"]);
//! # let _ = url;
//! ```

mod fs;
mod paths;
mod text;
mod url_validator;

pub use fs::write_atomic;
pub use paths::{config_dir, expand_home};
pub use text::{clean_html, collapse_whitespace, display_width, wrap_text};
pub use url_validator::{validate_feed_url, UrlValidationError};

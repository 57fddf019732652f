//! Configuration file parser for ~/.config/dailynews/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use chrono::{FixedOffset, TimeDelta};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{FetchOptions, DEFAULT_FEEDS};
use crate::output::{ReportOptions, DEFAULT_KEYWORDS};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// SEC-014: Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is outside its allowed range.
    #[error("Invalid config value for '{key}': {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feeds consulted on every run, before any feeds-file entries.
    pub feeds: Vec<String>,

    /// Trailing window in hours; older entries are dropped.
    pub window_hours: u64,

    /// Titles starting with any of these are skipped.
    pub ignored_prefixes: Vec<String>,

    /// `User-Agent` header sent with every feed request.
    pub user_agent: String,

    /// Per-feed timeout covering the request and the body read.
    pub request_timeout_secs: u64,

    /// Feeds fetched at the same time (1 = sequential).
    pub max_concurrent_fetches: usize,

    pub report: ReportConfig,
}

/// `[report]` table.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Directory the markdown report is written into.
    pub output_dir: PathBuf,

    /// Report heading and file-name stem.
    pub title: String,

    /// Offset from UTC, in hours, used for publish times in the report.
    pub utc_offset_hours: i32,

    /// Column limit for wrapped blocks.
    pub wrap_width: usize,

    /// Keywords scanned for the insight line.
    pub keywords: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feeds: DEFAULT_FEEDS.iter().map(|s| s.to_string()).collect(),
            window_hours: 24,
            ignored_prefixes: vec!["Show GN:".to_string(), "Ask GN:".to_string()],
            user_agent:
                "Mozilla/5.0 (compatible; AgentK/DailyNews; +https://github.com/kaidev2658/incubator)"
                    .to_string(),
            request_timeout_secs: 20,
            max_concurrent_fetches: 1,
            report: ReportConfig::default(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("daily"),
            title: "AgentK Insight".to_string(),
            utc_offset_hours: 9,
            wrap_width: 80,
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Config {
    /// SEC-014: Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // SEC-014: Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = [
                "feeds",
                "window_hours",
                "ignored_prefixes",
                "user_agent",
                "request_timeout_secs",
                "max_concurrent_fetches",
                "report",
            ];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            window_hours = config.window_hours,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Fetch settings for a run, with an optional window override.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if the window does not fit a time span or the
    /// request timeout is zero.
    pub fn fetch_options(&self, window_hours: u64) -> Result<FetchOptions, ConfigError> {
        let window = i64::try_from(window_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .ok_or_else(|| ConfigError::Invalid {
                key: "window_hours",
                reason: format!("{window_hours} hours is out of range"),
            })?;

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: "request_timeout_secs",
                reason: "must be at least 1 second".to_string(),
            });
        }

        Ok(FetchOptions {
            window,
            ignored_prefixes: self.ignored_prefixes.clone(),
            timeout: Duration::from_secs(self.request_timeout_secs),
            max_concurrent: self.max_concurrent_fetches.max(1),
        })
    }

    /// Report rendering settings.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if `utc_offset_hours` is not a valid offset.
    pub fn report_options(&self) -> Result<ReportOptions, ConfigError> {
        let display_offset = self
            .report
            .utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| ConfigError::Invalid {
                key: "report.utc_offset_hours",
                reason: format!("{} is not a valid UTC offset", self.report.utc_offset_hours),
            })?;

        Ok(ReportOptions {
            title: self.report.title.clone(),
            display_offset,
            wrap_width: self.report.wrap_width.max(1),
            keywords: self.report.keywords.clone(),
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

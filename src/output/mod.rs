//! Run output: the JSON digest and the markdown insight report.

mod digest;
mod insight;
mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use digest::{read_digest, write_digest, Digest, DigestEntry};
pub use insight::{insight_sentence, matched_keywords, DEFAULT_KEYWORDS};
pub use report::{format_published, render_report, report_path, write_report, ReportOptions};

/// Errors that can occur while writing or reading run output.
///
/// All of these are fatal for the run.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

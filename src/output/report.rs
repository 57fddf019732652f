use chrono::{DateTime, FixedOffset, Utc};
use std::path::{Path, PathBuf};

use super::insight::insight_sentence;
use super::OutputError;
use crate::feed::FeedEntry;
use crate::util::{clean_html, write_atomic, wrap_text};

const UNKNOWN_PUBLISHED: &str = "알 수 없음";
const EMPTY_SUMMARY: &str = "요약 정보 없음.";

/// Rendering settings for the markdown report.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    /// Report heading; also the file name stem with spaces as underscores.
    pub title: String,
    /// Zone used for the per-entry publish time.
    pub display_offset: FixedOffset,
    /// Column limit for the summary and insight blocks.
    pub wrap_width: usize,
    pub keywords: Vec<String>,
}

/// Path of the report for the UTC date of `now`.
///
/// The file always lands directly inside `output_dir`: whitespace and path
/// separators in the title become `_`, and dot runs collapse to one `.`.
pub fn report_path(output_dir: &Path, title: &str, now: DateTime<Utc>) -> PathBuf {
    output_dir.join(format!("{}_{}.md", file_stem(title), now.format("%Y-%m-%d")))
}

fn file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for ch in title.trim().chars() {
        let ch = if ch.is_whitespace() || matches!(ch, '/' | '\\') || ch.is_control() {
            '_'
        } else {
            ch
        };
        // `..` never survives, so the stem cannot name a parent directory.
        if ch == '.' && stem.ends_with('.') {
            continue;
        }
        if ch == '_' && stem.ends_with('_') {
            continue;
        }
        stem.push(ch);
    }
    stem
}

/// Publish time in the display zone, or the unknown marker.
pub fn format_published(published: Option<DateTime<Utc>>, offset: FixedOffset) -> String {
    match published {
        Some(published) => published.with_timezone(&offset).to_rfc3339(),
        None => UNKNOWN_PUBLISHED.to_string(),
    }
}

/// Renders the markdown report for `entries`.
pub fn render_report(entries: &[FeedEntry], now: DateTime<Utc>, options: &ReportOptions) -> String {
    let mut lines: Vec<String> = vec![
        format!("# {} ({})", options.title, now.format("%Y-%m-%d")),
        String::new(),
        format!("Generated at {}", now.to_rfc3339()),
        String::new(),
    ];

    for entry in entries {
        let summary = clean_html(&entry.summary);
        let insight = insight_sentence(&entry.title, &summary, &options.keywords);

        lines.push(format!("## {}", entry.title));
        lines.push(format!("- 원문: {}", entry.link));
        lines.push(format!(
            "- 게시일: {}",
            format_published(Some(entry.published), options.display_offset)
        ));
        lines.push(String::new());

        lines.push("[핵심 요약]".to_string());
        let summary_block = if summary.is_empty() { EMPTY_SUMMARY } else { summary.as_str() };
        lines.extend(wrap_text(summary_block, options.wrap_width));
        lines.push(String::new());

        lines.push("[기술적 인사이트]".to_string());
        lines.extend(wrap_text(&insight, options.wrap_width));
        lines.push(String::new());
    }

    lines.join("\n")
}

/// Writes the report into `output_dir`, returning its path.
///
/// Returns `Ok(None)` without touching the filesystem when `entries` is
/// empty: an empty report is never written.
///
/// # Errors
///
/// [`OutputError::Write`] if the directory or file cannot be created.
pub fn write_report(
    output_dir: &Path,
    entries: &[FeedEntry],
    now: DateTime<Utc>,
    options: &ReportOptions,
) -> Result<Option<PathBuf>, OutputError> {
    if entries.is_empty() {
        return Ok(None);
    }

    let path = report_path(output_dir, &options.title, now);
    let markdown = render_report(entries, now, options);

    write_atomic(&path, markdown.as_bytes()).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "Report written");

    Ok(Some(path))
}

//! Reporting over stored replies: summaries, CSV export, previews.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::{ReplyRecord, format_timestamp};
use crate::persistence::{PersistenceError, ReplyQuery, ReplyStore};

/// Reporting failures.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Reading from the store failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Writing CSV failed.
    #[error("cannot write report: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the output failed.
    #[error("cannot write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Row totals for the whole store.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReportSummary {
    /// Total stored replies.
    pub total: u64,
    /// Replies per stored platform label.
    pub platforms: BTreeMap<String, u64>,
}

impl ReportSummary {
    /// Reads the counts from `store`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Persistence`] on store failure.
    pub async fn collect(store: &dyn ReplyStore) -> Result<Self, ReportError> {
        let platforms = store.platform_counts().await?;
        Ok(Self {
            total: platforms.values().sum(),
            platforms,
        })
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total records in database: {}", self.total)?;
        let platforms = self
            .platforms
            .iter()
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "Platforms: {platforms}")
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    platform: &'a str,
    post_text: &'a str,
    generated_reply: &'a str,
    timestamp: String,
}

/// Writes `records` as CSV with an `id,platform,post_text,generated_reply,timestamp` header.
///
/// # Errors
///
/// Returns [`ReportError`] if writing fails.
pub fn write_csv<W: Write>(records: &[ReplyRecord], writer: W) -> Result<(), ReportError> {
    let mut out = csv::Writer::from_writer(writer);
    for record in records {
        out.serialize(CsvRow {
            id: record.id,
            platform: record.platform.as_str(),
            post_text: &record.post_text,
            generated_reply: &record.generated_reply,
            timestamp: format_timestamp(&record.timestamp),
        })?;
    }
    out.flush()?;
    Ok(())
}

/// Exports every stored reply, oldest first, to a CSV file at `path`.
///
/// Returns the number of rows written. An empty store writes no file.
///
/// # Errors
///
/// Returns [`ReportError`] on store or file failure.
pub async fn export_csv(store: &dyn ReplyStore, path: &Path) -> Result<usize, ReportError> {
    let records = store.list(&ReplyQuery::everything()).await?;
    if records.is_empty() {
        return Ok(0);
    }
    let file = std::fs::File::create(path)?;
    write_csv(&records, file)?;
    tracing::info!(path = %path.display(), rows = records.len(), "report written");
    Ok(records.len())
}

/// First `max_chars` characters of `text`, with `...` when cut.
#[must_use]
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text.get(..cut).unwrap_or(text)),
        None => text.to_string(),
    }
}

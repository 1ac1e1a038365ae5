//! Batch runner: drives the reply sequence over rows of a CSV file.
//!
//! Rows are processed strictly in file order, one at a time. A failing row
//! is logged and counted; it never aborts the batch.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::report::preview;
use crate::service::ReplyService;

/// Outcome counters for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    /// Rows with both fields present that were sent through the service.
    pub attempted: usize,
    /// Attempted rows that produced a stored reply.
    pub succeeded: usize,
    /// Rows skipped for a missing or blank field, or unreadable CSV.
    pub skipped: usize,
}

impl BatchSummary {
    /// Attempted rows that failed.
    #[must_use]
    pub const fn failed(&self) -> usize {
        self.attempted.saturating_sub(self.succeeded)
    }
}

/// Errors that stop a batch before any row is processed.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// The source file could not be opened.
    #[error("cannot open batch source: {0}")]
    Io(#[from] std::io::Error),

    /// The header row could not be read.
    #[error("cannot read batch header: {0}")]
    Csv(#[from] csv::Error),

    /// Fewer than two columns, so neither name nor position work.
    #[error("batch source needs at least 'platform' and 'post_text' columns, found {0} column(s)")]
    TooFewColumns(usize),
}

/// Positions of the two fields the runner reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    platform: usize,
    post_text: usize,
}

impl Columns {
    /// Uses the named columns when both exist, else the first two.
    fn resolve(headers: &StringRecord) -> Result<Self, BatchError> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        match (find("platform"), find("post_text")) {
            (Some(platform), Some(post_text)) => Ok(Self {
                platform,
                post_text,
            }),
            _ if headers.len() >= 2 => {
                tracing::info!(
                    headers = ?headers.iter().collect::<Vec<_>>(),
                    "platform/post_text headers not found, using first two columns"
                );
                Ok(Self {
                    platform: 0,
                    post_text: 1,
                })
            }
            _ => Err(BatchError::TooFewColumns(headers.len())),
        }
    }
}

/// Runs many posts through a [`ReplyService`].
#[derive(Debug, Clone)]
pub struct BatchRunner {
    service: ReplyService,
}

impl BatchRunner {
    /// Creates a runner over `service`.
    #[must_use]
    pub fn new(service: ReplyService) -> Self {
        Self { service }
    }

    /// Opens `path` and runs [`BatchRunner::run`] over it.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] if the file cannot be opened or has no usable
    /// header.
    pub async fn run_path(
        &self,
        path: &Path,
        limit: Option<usize>,
    ) -> Result<BatchSummary, BatchError> {
        let file = File::open(path)?;
        tracing::info!(path = %path.display(), ?limit, "processing batch file");
        self.run(file, limit).await
    }

    /// Processes rows from `source`.
    ///
    /// The first row is always the header. When `limit` is positive only
    /// the first `limit` usable rows are attempted.
    ///
    /// # Errors
    ///
    /// Returns [`BatchError`] if the header cannot be read or has fewer
    /// than two columns. Per-row failures are counted, not returned.
    pub async fn run<R: Read>(
        &self,
        source: R,
        limit: Option<usize>,
    ) -> Result<BatchSummary, BatchError> {
        let limit = limit.filter(|&l| l > 0);
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::Headers)
            .from_reader(source);
        let columns = Columns::resolve(reader.headers()?)?;

        let mut summary = BatchSummary::default();
        for (index, row) in reader.records().enumerate() {
            if limit.is_some_and(|l| summary.attempted >= l) {
                break;
            }
            // Header is line 1.
            let line = index.saturating_add(2);

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    tracing::warn!(line, error = %e, "unreadable row skipped");
                    summary.skipped += 1;
                    continue;
                }
            };

            let (Some(platform), Some(post_text)) = (
                non_blank(row.get(columns.platform)),
                non_blank(row.get(columns.post_text)),
            ) else {
                tracing::debug!(line, "row with missing field skipped");
                summary.skipped += 1;
                continue;
            };

            summary.attempted += 1;
            match self
                .service
                .create_reply_raw(platform.trim(), post_text)
                .await
            {
                Ok(record) => {
                    summary.succeeded += 1;
                    tracing::info!(
                        line,
                        id = record.id,
                        post = %preview(&record.post_text, 50),
                        reply = %preview(&record.generated_reply, 50),
                        "row processed"
                    );
                }
                Err(e) => tracing::warn!(line, error = %e, "row failed"),
            }
        }

        tracing::info!(
            attempted = summary.attempted,
            succeeded = summary.succeeded,
            skipped = summary.skipped,
            "batch finished"
        );
        Ok(summary)
    }
}

fn non_blank(field: Option<&str>) -> Option<&str> {
    field.filter(|f| !f.trim().is_empty())
}

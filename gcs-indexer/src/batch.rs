//! Batch driver: feeds JSON-lines documents and delete requests through any [`IndexWriter`].
//!
//! One bad document never stops a batch. Malformed lines and documents the
//! writer rejects are logged and counted in the [`BatchReport`]; only failures
//! to open the writer or read the input abort the run.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use gcs_indexer_core::contract::{IndexWriter, IndexWriterParams};
use gcs_indexer_core::document::Document;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchReport {
    /// Documents handed to the writer without error.
    pub submitted: usize,
    /// Malformed lines and documents the writer refused.
    pub rejected: usize,
    pub deleted: usize,
    pub failed_deletes: usize,
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Batch complete: {} submitted, {} rejected, {} deleted, {} failed deletes",
            self.submitted, self.rejected, self.deleted, self.failed_deletes
        )
    }
}

/// Parse one JSON-lines record. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Document>, serde_json::Error> {
    if line.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

async fn submit<W: IndexWriter + ?Sized>(
    writer: &mut W,
    doc: &Document,
    position: usize,
    report: &mut BatchReport,
) {
    match writer.write(doc).await {
        Ok(()) => report.submitted += 1,
        Err(e) => {
            report.rejected += 1;
            warn!(
                line = position,
                id = doc.id().unwrap_or("<none>"),
                error = %e,
                "[BATCH] Document rejected"
            );
        }
    }
}

/// Write every document in `docs`, continuing past rejected ones.
pub async fn index_documents<W: IndexWriter + ?Sized>(
    writer: &mut W,
    docs: &[Document],
) -> BatchReport {
    let mut report = BatchReport::default();
    for (i, doc) in docs.iter().enumerate() {
        submit(writer, doc, i + 1, &mut report).await;
    }
    report
}

/// Stream the JSON-lines file at `path` into `writer`.
pub async fn index_file<W: IndexWriter + ?Sized>(writer: &mut W, path: &Path) -> Result<BatchReport> {
    let file = File::open(path)
        .await
        .with_context(|| format!("failed to open input file {}", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut report = BatchReport::default();
    let mut position = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("failed to read input file {}", path.display()))?
    {
        position += 1;
        match parse_line(&line) {
            Ok(Some(doc)) => submit(writer, &doc, position, &mut report).await,
            Ok(None) => {}
            Err(e) => {
                report.rejected += 1;
                warn!(line = position, error = %e, "[BATCH] Skipping malformed document");
            }
        }
    }
    Ok(report)
}

/// Delete each id, continuing past failures.
pub async fn delete_ids<W: IndexWriter + ?Sized>(writer: &mut W, ids: &[String]) -> BatchReport {
    let mut report = BatchReport::default();
    for id in ids {
        match writer.delete(id).await {
            Ok(()) => report.deleted += 1,
            Err(e) => {
                report.failed_deletes += 1;
                warn!(id = %id, error = %e, "[BATCH] Delete failed");
            }
        }
    }
    report
}

/// Open `writer`, index the input file, commit and close.
///
/// The writer is closed whenever it was opened, even if reading the input fails.
pub async fn index_session<W: IndexWriter + ?Sized>(
    writer: &mut W,
    params: &IndexWriterParams,
    input: &Path,
) -> Result<BatchReport> {
    writer
        .open(params)
        .await
        .context("failed to open index writer")?;
    info!(writer = %writer.describe(), input = %input.display(), "[BATCH] Indexing documents");

    let outcome = match index_file(writer, input).await {
        Ok(report) => writer
            .commit()
            .await
            .map(|()| report)
            .context("failed to commit"),
        Err(e) => Err(e),
    };
    writer.close().await;
    if let Ok(report) = &outcome {
        info!(
            submitted = report.submitted,
            rejected = report.rejected,
            "[BATCH] Indexing finished"
        );
    }
    outcome
}

/// Open `writer`, delete `ids`, commit and close.
pub async fn delete_session<W: IndexWriter + ?Sized>(
    writer: &mut W,
    params: &IndexWriterParams,
    ids: &[String],
) -> Result<BatchReport> {
    writer
        .open(params)
        .await
        .context("failed to open index writer")?;
    let report = delete_ids(writer, ids).await;
    let committed = writer.commit().await.context("failed to commit");
    writer.close().await;
    committed?;
    info!(
        deleted = report.deleted,
        failed = report.failed_deletes,
        "[BATCH] Deletes finished"
    );
    Ok(report)
}

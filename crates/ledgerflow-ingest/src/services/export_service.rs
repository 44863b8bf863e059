//! Export processing service.
//!
//! Orchestrates the full pipeline: parse, validate, aggregate, commit.
//! Invoked as a library call by an upload or transport handler; every call
//! returns a structured outcome, never a silent drop.

use sqlx::PgPool;

use crate::error::IngestError;
use crate::models::BatchReport;
use crate::services::{aggregator, export_parser, ledger_committer};
use crate::validation;

/// Export processing entry point.
pub struct ExportService;

impl ExportService {
    /// Process one usage-export payload as a single atomic batch.
    ///
    /// Parse and validation failures reject the payload before any database
    /// work. Commit failures roll back the whole batch; the returned error
    /// carries the batch id and progress at failure time, and nothing from
    /// the call persists.
    pub async fn process_export(
        pool: &PgPool,
        payload: &[u8],
    ) -> Result<BatchReport, IngestError> {
        let candidates = export_parser::parse_export(payload)?;
        let records = validation::validate_records(&candidates)?;

        tracing::info!(records = records.len(), "Export payload validated");

        let groups = aggregator::aggregate(records);
        ledger_committer::commit_batch(pool, &groups).await
    }

    /// Process a payload and always render the caller-facing report,
    /// folding fatal errors into the failure shape of the output contract.
    pub async fn process_export_report(pool: &PgPool, payload: &[u8]) -> BatchReport {
        match Self::process_export(pool, payload).await {
            Ok(report) => report,
            Err(err) => BatchReport::failed(&err),
        }
    }
}

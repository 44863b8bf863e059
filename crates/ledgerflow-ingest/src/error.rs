//! Error types for the ingestion pipeline.
//!
//! Parse and validation errors are recoverable: nothing was persisted, so
//! the caller can correct the file and resubmit it unchanged. Commit errors
//! are fatal to the batch (the whole transaction rolled back) but not to the
//! host process. Duplicate groups are not errors at all.

use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use thiserror::Error;
use uuid::Uuid;

use crate::models::RecordField;

/// The ledger-committer step during which a batch failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    DuplicateCheck,
    EntityResolution,
    InvoiceCreation,
    BalanceUpdate,
    CommissionEvaluation,
    /// Final transaction commit for the whole batch. A timeout or
    /// serialization conflict lands here and rolls back like any other
    /// commit failure.
    BatchCommit,
}

impl std::fmt::Display for CommitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommitStep::DuplicateCheck => "duplicate check",
            CommitStep::EntityResolution => "entity resolution",
            CommitStep::InvoiceCreation => "invoice creation",
            CommitStep::BalanceUpdate => "balance update",
            CommitStep::CommissionEvaluation => "commission evaluation",
            CommitStep::BatchCommit => "batch commit",
        };
        f.write_str(name)
    }
}

/// Ingestion pipeline errors.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Unrecognized or malformed payload shape. No transaction was opened.
    #[error("Parse error: {0}")]
    Parse(String),

    /// First structurally or semantically invalid record. No DB work was done.
    #[error("Validation failed at record {position}: invalid {field}")]
    Validation {
        /// 1-based position of the offending record.
        position: usize,
        /// The field that failed its contract.
        field: RecordField,
        /// The raw record, for diagnosis.
        record: JsonValue,
    },

    /// A commit step failed for some group; the entire batch rolled back.
    #[error("Batch {batch_id} failed during {step}: {source}")]
    Commit {
        step: CommitStep,
        batch_id: Uuid,
        /// Groups attempted before the failure, including the failing one.
        groups_attempted: u32,
        /// Invoices logically created before rollback. None persisted.
        invoices_created: u32,
        /// Running total at failure time. None of it persisted.
        total_committed: Decimal,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Infrastructure failure before any group was attempted (pool
    /// acquisition, opening the transaction).
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl IngestError {
    /// Whether the caller can fix the input and resubmit the same file.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IngestError::Parse(_) | IngestError::Validation { .. })
    }
}

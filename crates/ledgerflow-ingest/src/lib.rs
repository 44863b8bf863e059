//! Usage-export ingestion pipeline.
//!
//! Turns an untrusted, variably-shaped JSON export of usage records into
//! immutable invoices, additive balance updates and commission records, with
//! strict idempotency and all-or-nothing atomicity per batch.
//!
//! The pipeline stages, leaf-first:
//! - export parser: normalizes wrapper shapes into a flat candidate list
//! - validator: fail-fast structural/semantic checks per record
//! - aggregator: groups records by representative identity
//! - fingerprint: content hash per group for duplicate detection
//! - ledger committer: genesis, invoice, balance, commission — one
//!   transaction spanning the whole batch
//!
//! # Example
//!
//! ```rust,ignore
//! use ledgerflow_ingest::ExportService;
//!
//! let report = ExportService::process_export(pool.inner(), &payload).await?;
//! println!("{} invoices created", report.invoices_created.unwrap_or(0));
//! ```

pub mod error;
pub mod models;
pub mod services;
pub mod validation;

// Re-export public API
pub use error::IngestError;
pub use models::{BatchReport, UsageRecord};
pub use services::export_service::ExportService;

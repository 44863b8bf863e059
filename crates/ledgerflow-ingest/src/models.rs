//! In-memory types for the ingestion pipeline.
//!
//! [`UsageRecord`] and [`AggregatedGroup`] live only for one processing
//! call; [`BatchReport`] is the caller-facing outcome.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// One validated usage record (a line item).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Identity key grouping records to one representative.
    pub admin_username: String,
    /// Billed amount.
    pub amount: Decimal,
    /// When the usage occurred.
    pub event_timestamp: DateTime<Utc>,
    /// Free-text description.
    pub description: String,
}

/// The record field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordField {
    AdminUsername,
    Amount,
    EventTimestamp,
    Description,
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecordField::AdminUsername => "admin_username",
            RecordField::Amount => "amount",
            RecordField::EventTimestamp => "event_timestamp",
            RecordField::Description => "description",
        };
        f.write_str(name)
    }
}

/// All records of one representative, with a decimal-safe total.
#[derive(Debug, Clone, Default)]
pub struct AggregatedGroup {
    /// Sum of the line-item amounts.
    pub total_due: Decimal,
    /// Line items in original export order.
    pub line_items: Vec<UsageRecord>,
}

/// Structured outcome of one ingestion call.
///
/// Serialized camelCase for transport handlers:
/// `{ success, message, invoicesCreated?, duplicatesSkipped?, totalAmount?, error? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    /// Whether the batch committed.
    pub success: bool,

    /// Human-readable summary.
    pub message: String,

    /// Invoices persisted by this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoices_created: Option<u32>,

    /// Groups skipped as already-processed duplicates.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicates_skipped: Option<u32>,

    /// Total amount committed across all created invoices. Serialized as a
    /// JSON number for transport handlers.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total_amount: Option<Decimal>,

    /// Fatal error description, on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchReport {
    /// Build the success report for a committed batch.
    #[must_use]
    pub fn completed(invoices_created: u32, duplicates_skipped: u32, total_amount: Decimal) -> Self {
        let message = if duplicates_skipped > 0 {
            format!(
                "Processed batch: {invoices_created} invoice(s) created, \
                 {duplicates_skipped} duplicate group(s) skipped"
            )
        } else {
            format!("Processed batch: {invoices_created} invoice(s) created")
        };

        Self {
            success: true,
            message,
            invoices_created: Some(invoices_created),
            duplicates_skipped: Some(duplicates_skipped),
            total_amount: Some(total_amount),
            error: None,
        }
    }

    /// Build the failure report for a batch that persisted nothing.
    ///
    /// After a rollback the counts are authoritative zeros: callers must
    /// never infer partial success.
    #[must_use]
    pub fn failed(err: &IngestError) -> Self {
        Self {
            success: false,
            message: "Batch rejected; no invoices were persisted".to_string(),
            invoices_created: None,
            duplicates_skipped: None,
            total_amount: None,
            error: Some(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serializes_contract_field_names() {
        let report = BatchReport::completed(2, 1, Decimal::new(1500, 0));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["invoicesCreated"], 2);
        assert_eq!(json["duplicatesSkipped"], 1);
        // The output contract types totalAmount as a number, not a string.
        assert_eq!(json["totalAmount"], 1500.0);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_total_amount_round_trips_as_number() {
        let report = BatchReport::completed(1, 0, Decimal::new(1575, 2));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"totalAmount\":15.75"));

        let parsed: BatchReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_amount, Some(Decimal::new(1575, 2)));
    }

    #[test]
    fn test_failure_report_has_no_counts() {
        let err = IngestError::Parse("root element must be an array".to_string());
        let report = BatchReport::failed(&err);

        assert!(!report.success);
        assert!(report.invoices_created.is_none());
        assert!(report.total_amount.is_none());
        assert!(report.error.unwrap().contains("root element must be an array"));
    }

    #[test]
    fn test_completed_message_mentions_duplicates() {
        let report = BatchReport::completed(0, 3, Decimal::ZERO);
        assert!(report.message.contains("3 duplicate group(s) skipped"));
    }
}

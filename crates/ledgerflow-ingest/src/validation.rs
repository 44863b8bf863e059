//! Fail-fast record validation.
//!
//! The first invalid record aborts the whole batch: the idempotency
//! fingerprint must be computed over the exact, fully-valid record set, so a
//! partially-valid subset is never usable.

use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

use crate::error::IngestError;
use crate::models::{RecordField, UsageRecord};

/// Naive timestamp formats accepted besides RFC 3339, interpreted as UTC.
/// Export tools are inconsistent about the trailing offset.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Maximum accepted amount per record (10^15).
///
/// Keeps group totals and batch totals far inside `Decimal` range even for
/// the largest payload the parser admits, so accumulation never overflows.
pub const MAX_AMOUNT_UNITS: i64 = 1_000_000_000_000_000;

/// Validate candidate records in original order.
///
/// Checks four fields per record: `admin_username` (non-empty string),
/// `amount` (string parseable to a non-negative decimal, at most
/// [`MAX_AMOUNT_UNITS`]), `event_timestamp`
/// (parseable date/time), `description` (non-empty string). Returns the
/// typed records, or the first violation with its 1-based position.
pub fn validate_records(candidates: &[JsonValue]) -> Result<Vec<UsageRecord>, IngestError> {
    let mut records = Vec::with_capacity(candidates.len());

    for (idx, candidate) in candidates.iter().enumerate() {
        let position = idx + 1;

        let admin_username = non_empty_string(candidate, "admin_username")
            .ok_or_else(|| invalid(position, RecordField::AdminUsername, candidate))?;

        let amount = candidate
            .get("amount")
            .and_then(JsonValue::as_str)
            .and_then(parse_amount)
            .ok_or_else(|| invalid(position, RecordField::Amount, candidate))?;

        let event_timestamp = candidate
            .get("event_timestamp")
            .and_then(JsonValue::as_str)
            .and_then(parse_timestamp)
            .ok_or_else(|| invalid(position, RecordField::EventTimestamp, candidate))?;

        let description = non_empty_string(candidate, "description")
            .ok_or_else(|| invalid(position, RecordField::Description, candidate))?;

        records.push(UsageRecord {
            admin_username,
            amount,
            event_timestamp,
            description,
        });
    }

    Ok(records)
}

fn invalid(position: usize, field: RecordField, record: &JsonValue) -> IngestError {
    IngestError::Validation {
        position,
        field,
        record: record.clone(),
    }
}

fn non_empty_string(record: &JsonValue, key: &str) -> Option<String> {
    record
        .get(key)
        .and_then(JsonValue::as_str)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

/// Parse a decimal amount string; negative or implausibly large amounts
/// are rejected.
fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw.trim())
        .ok()
        .filter(|amount| !amount.is_sign_negative())
        .filter(|amount| *amount <= Decimal::new(MAX_AMOUNT_UNITS, 0))
}

/// Parse an event timestamp: RFC 3339, or a naive datetime taken as UTC.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(username: &str, amount: &str, timestamp: &str, description: &str) -> JsonValue {
        json!({
            "admin_username": username,
            "amount": amount,
            "event_timestamp": timestamp,
            "description": description,
        })
    }

    #[test]
    fn test_validate_all_valid() {
        let candidates = vec![
            record("shopA", "1000", "2025-01-01T00:00:00Z", "svc"),
            record("shopB", "0.50", "2025-01-02 12:30:00", "svc"),
        ];
        let records = validate_records(&candidates).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].admin_username, "shopA");
        assert_eq!(records[1].amount, Decimal::new(50, 2));
    }

    #[test]
    fn test_first_invalid_record_aborts_with_position() {
        let candidates = vec![
            record("shopA", "1000", "2025-01-01T00:00:00Z", "svc"),
            record("shopB", "not-a-number", "2025-01-01T00:00:00Z", "svc"),
            record("", "5", "2025-01-01T00:00:00Z", "svc"),
        ];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation {
                position, field, ..
            } => {
                assert_eq!(position, 2);
                assert_eq!(field, RecordField::Amount);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_username_rejected() {
        let candidates = vec![json!({
            "amount": "5",
            "event_timestamp": "2025-01-01T00:00:00Z",
            "description": "svc",
        })];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation {
                position, field, ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(field, RecordField::AdminUsername);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_amount_rejected() {
        let candidates = vec![record("shopA", "-1", "2025-01-01T00:00:00Z", "svc")];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation { field, .. } => assert_eq!(field, RecordField::Amount),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_json_amount_rejected() {
        // The contract requires amount to arrive as a decimal string.
        let candidates = vec![json!({
            "admin_username": "shopA",
            "amount": 1000,
            "event_timestamp": "2025-01-01T00:00:00Z",
            "description": "svc",
        })];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation { field, .. } => assert_eq!(field, RecordField::Amount),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_near_max_decimal_amount_rejected() {
        // Two of these in one group would overflow decimal accumulation
        // downstream, so they must never get past validation.
        let near_max = "79228162514264337593543950335";
        let candidates = vec![
            record("shopA", near_max, "2025-01-01T00:00:00Z", "svc"),
            record("shopA", near_max, "2025-01-02T00:00:00Z", "svc"),
        ];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation {
                position, field, ..
            } => {
                assert_eq!(position, 1);
                assert_eq!(field, RecordField::Amount);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_amount_at_limit_accepted() {
        let candidates = vec![record(
            "shopA",
            "1000000000000000",
            "2025-01-01T00:00:00Z",
            "svc",
        )];
        let records = validate_records(&candidates).unwrap();
        assert_eq!(records[0].amount, Decimal::new(MAX_AMOUNT_UNITS, 0));

        let over = vec![record(
            "shopA",
            "1000000000000000.01",
            "2025-01-01T00:00:00Z",
            "svc",
        )];
        assert!(validate_records(&over).is_err());
    }

    #[test]
    fn test_bad_timestamp_rejected() {
        let candidates = vec![record("shopA", "5", "yesterday", "svc")];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation { field, .. } => {
                assert_eq!(field, RecordField::EventTimestamp);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_description_rejected() {
        let candidates = vec![record("shopA", "5", "2025-01-01T00:00:00Z", "")];
        match validate_records(&candidates).unwrap_err() {
            IngestError::Validation { field, .. } => {
                assert_eq!(field, RecordField::Description);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_offset_normalized_to_utc() {
        let candidates = vec![record("shopA", "5", "2025-01-01T02:00:00+02:00", "svc")];
        let records = validate_records(&candidates).unwrap();
        assert_eq!(
            records[0].event_timestamp,
            "2025-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn test_empty_candidate_list_is_valid() {
        assert!(validate_records(&[]).unwrap().is_empty());
    }
}

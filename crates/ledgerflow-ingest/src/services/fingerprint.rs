//! Idempotency fingerprint.
//!
//! A group's content hash is computed over a canonical rendering of its line
//! items: sorted by (timestamp, identity), one delimited line per item,
//! SHA-256 over the joined text. Resubmitting an identical export therefore
//! produces identical hashes regardless of record order, and the committer
//! turns the match into a silent skip.

use sha2::{Digest, Sha256};

use crate::models::UsageRecord;

/// Compute the hex-encoded SHA-256 content hash of a group's line items.
#[must_use]
pub fn content_hash(line_items: &[UsageRecord]) -> String {
    let mut sorted: Vec<&UsageRecord> = line_items.iter().collect();
    sorted.sort_by(|a, b| {
        (a.event_timestamp, &a.admin_username).cmp(&(b.event_timestamp, &b.admin_username))
    });

    let canonical = sorted
        .iter()
        .map(|item| {
            // normalize() so "1000" and "1000.00" fingerprint identically.
            format!(
                "{}|{}|{}|{}",
                item.admin_username,
                item.amount.normalize(),
                item.event_timestamp.to_rfc3339(),
                item.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

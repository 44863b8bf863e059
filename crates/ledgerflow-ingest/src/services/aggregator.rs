//! Record aggregation.
//!
//! Groups validated records by exact, case-sensitive identity. A `BTreeMap`
//! keeps group processing strictly ordered, which makes entity creation and
//! balance increments deterministic for a given input.

use std::collections::BTreeMap;

use crate::models::{AggregatedGroup, UsageRecord};

/// Group records by identity, accumulating decimal-safe totals and keeping
/// line items in original export order.
pub fn aggregate(records: Vec<UsageRecord>) -> BTreeMap<String, AggregatedGroup> {
    let mut groups: BTreeMap<String, AggregatedGroup> = BTreeMap::new();

    for record in records {
        let group = groups.entry(record.admin_username.clone()).or_default();
        group.total_due += record.amount;
        group.line_items.push(record);
    }

    groups
}

//! Export payload parser.
//!
//! Normalizes the wrapper shapes real export tools produce into a flat list
//! of untyped candidate records. Two shapes are recognized: a schema-dump
//! style array of table-descriptor objects where one carries a `data` array,
//! and a bare array of transaction-shaped objects. Anything else is a parse
//! failure before any validation or database work.

use serde_json::Value as JsonValue;

use crate::error::IngestError;

/// Maximum accepted payload size (10MB).
pub const MAX_PAYLOAD_SIZE: usize = 10 * 1024 * 1024;

/// UTF-8 BOM bytes.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A recognized export payload shape.
#[derive(Debug)]
enum ExportShape {
    /// Table-descriptor wrapper: one element carried the `data` array.
    TableDump(Vec<JsonValue>),
    /// The root array holds the records directly.
    FlatRecords(Vec<JsonValue>),
}

/// Strip UTF-8 BOM from the beginning of data if present.
fn strip_utf8_bom(data: &[u8]) -> &[u8] {
    if data.starts_with(UTF8_BOM) {
        &data[UTF8_BOM.len()..]
    } else {
        data
    }
}

/// Parse raw export bytes into an ordered list of candidate records.
pub fn parse_export(data: &[u8]) -> Result<Vec<JsonValue>, IngestError> {
    if data.len() > MAX_PAYLOAD_SIZE {
        return Err(IngestError::Parse(format!(
            "payload size {} bytes exceeds maximum of {MAX_PAYLOAD_SIZE} bytes",
            data.len()
        )));
    }

    let data = strip_utf8_bom(data);
    if data.is_empty() {
        return Err(IngestError::Parse("payload is empty".to_string()));
    }

    let root: JsonValue = serde_json::from_slice(data)
        .map_err(|e| IngestError::Parse(format!("invalid JSON: {e}")))?;

    let JsonValue::Array(elements) = root else {
        return Err(IngestError::Parse(
            "root element must be an array".to_string(),
        ));
    };

    match detect_shape(elements) {
        Some(ExportShape::TableDump(data) | ExportShape::FlatRecords(data)) => Ok(data),
        None => Err(IngestError::Parse("no data payload found".to_string())),
    }
}

/// Locate the record payload within the root array.
fn detect_shape(elements: Vec<JsonValue>) -> Option<ExportShape> {
    // Wrapper strategy: the first element carrying a `data` array wins;
    // sibling descriptor objects (schema headers etc.) are tolerated.
    for element in &elements {
        if let Some(data) = element.get("data").and_then(JsonValue::as_array) {
            return Some(ExportShape::TableDump(data.clone()));
        }
    }

    // Flat strategy: the root itself is the record list.
    if !elements.is_empty() && elements.iter().all(JsonValue::is_object) {
        return Some(ExportShape::FlatRecords(elements));
    }

    None
}

//! Integration test helpers for ledgerflow-ingest.
//!
//! Payload builders for the recognized export shapes, plus row-count
//! queries used to assert atomicity. The database context comes from
//! `ledgerflow_db::test_support`.

use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

pub use ledgerflow_db::test_support::{unique_username, TestContext};

/// One transaction-shaped record.
pub fn record(username: &str, amount: &str, timestamp: &str, description: &str) -> JsonValue {
    json!({
        "admin_username": username,
        "amount": amount,
        "event_timestamp": timestamp,
        "description": description,
    })
}

/// Wrap records in the table-descriptor export shape.
pub fn table_dump(records: Vec<JsonValue>) -> Vec<u8> {
    json!([
        {"type": "header", "version": "10.13"},
        {"type": "table", "name": "transactions", "data": records},
    ])
    .to_string()
    .into_bytes()
}

/// Render records as the bare-array export shape.
pub fn flat_export(records: Vec<JsonValue>) -> Vec<u8> {
    JsonValue::Array(records).to_string().into_bytes()
}

/// Two records for one identity, 1000 + 500.
pub fn example_payload(username: &str) -> Vec<u8> {
    table_dump(vec![
        record(username, "1000", "2025-01-01T00:00:00Z", "svc"),
        record(username, "500", "2025-01-02T00:00:00Z", "svc"),
    ])
}

/// Current balance of a representative, if it exists.
pub async fn balance_of(ctx: &TestContext, username: &str) -> Option<Decimal> {
    sqlx::query_scalar("SELECT balance FROM representatives WHERE admin_username = $1")
        .bind(username)
        .fetch_optional(ctx.pool.inner())
        .await
        .expect("balance query failed")
}

/// Number of representative rows for a username.
pub async fn representative_count(ctx: &TestContext, username: &str) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM representatives WHERE admin_username = $1")
        .bind(username)
        .fetch_one(ctx.pool.inner())
        .await
        .expect("count query failed")
}

/// Number of invoices billed to a username.
pub async fn invoice_count(ctx: &TestContext, username: &str) -> i64 {
    sqlx::query_scalar(
        r"
        SELECT COUNT(*) FROM invoices i
        JOIN representatives r ON i.representative_id = r.id
        WHERE r.admin_username = $1
        ",
    )
    .bind(username)
    .fetch_one(ctx.pool.inner())
    .await
    .expect("count query failed")
}

/// Invoice amounts billed to a username, oldest first.
pub async fn invoice_amounts(ctx: &TestContext, username: &str) -> Vec<Decimal> {
    sqlx::query_scalar(
        r"
        SELECT i.amount FROM invoices i
        JOIN representatives r ON i.representative_id = r.id
        WHERE r.admin_username = $1
        ORDER BY i.created_at
        ",
    )
    .bind(username)
    .fetch_all(ctx.pool.inner())
    .await
    .expect("amount query failed")
}

/// Commission amounts for a colleague, oldest first.
pub async fn commission_amounts(ctx: &TestContext, colleague_id: Uuid) -> Vec<Decimal> {
    sqlx::query_scalar(
        "SELECT amount FROM commissions WHERE colleague_id = $1 ORDER BY created_at",
    )
    .bind(colleague_id)
    .fetch_all(ctx.pool.inner())
    .await
    .expect("commission query failed")
}

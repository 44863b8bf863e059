//! Invoice entity model.
//!
//! Invoices are insert-only from the ingestion pipeline's perspective: the
//! amount, line-item snapshot and content hash are frozen at creation.
//! Status transitions past `Unpaid` belong to the payment subsystem.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Invoice payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invoice_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Newly created, awaiting payment. The only status this crate writes.
    Unpaid,
    /// Settled by the payment subsystem.
    Paid,
    /// Cancelled by the payment subsystem.
    Cancelled,
}

/// An immutable invoice billed to a representative.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique identifier.
    pub id: Uuid,

    /// The representative this invoice bills.
    pub representative_id: Uuid,

    /// Invoice total; equals the sum of the line items in the snapshot.
    pub amount: Decimal,

    /// Serialized line-item snapshot (JSONB), in original export order.
    pub line_items: JsonValue,

    /// Idempotency fingerprint of the line items. Unique among
    /// non-manually-created invoices.
    pub content_hash: String,

    /// Correlates every invoice created by one ingestion call.
    pub batch_id: Uuid,

    /// Payment status.
    pub status: InvoiceStatus,

    /// Whether the invoice was created manually (outside the pipeline).
    /// Manual invoices are excluded from idempotency lookups.
    pub is_manual: bool,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating an invoice.
#[derive(Debug, Clone)]
pub struct CreateInvoice {
    pub representative_id: Uuid,
    pub amount: Decimal,
    pub line_items: JsonValue,
    pub content_hash: String,
    pub batch_id: Uuid,
    pub is_manual: bool,
}

impl Invoice {
    /// Insert a new invoice with `Unpaid` status.
    pub async fn create<'e, E>(executor: E, input: CreateInvoice) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO invoices
                (id, representative_id, amount, line_items, content_hash, batch_id,
                 status, is_manual)
            VALUES ($1, $2, $3, $4, $5, $6, 'unpaid', $7)
            RETURNING id, representative_id, amount, line_items, content_hash, batch_id,
                      status, is_manual, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(input.representative_id)
        .bind(input.amount)
        .bind(input.line_items)
        .bind(input.content_hash)
        .bind(input.batch_id)
        .bind(input.is_manual)
        .fetch_one(executor)
        .await
    }

    /// Look up a pipeline-created invoice by its content hash.
    ///
    /// Manual invoices are excluded: only automatically created invoices
    /// participate in duplicate detection.
    pub async fn find_by_content_hash<'e, E>(
        executor: E,
        content_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, representative_id, amount, line_items, content_hash, batch_id,
                   status, is_manual, created_at
            FROM invoices
            WHERE content_hash = $1 AND is_manual = FALSE
            ",
        )
        .bind(content_hash)
        .fetch_optional(executor)
        .await
    }
}

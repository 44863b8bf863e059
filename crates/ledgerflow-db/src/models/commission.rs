//! Commission entity model.
//!
//! One commission per invoice for representatives with a referring
//! colleague. The amount is captured at creation using the colleague's rate
//! at that instant and never recomputed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// Commission payout status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "commission_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommissionStatus {
    /// Awaiting payout. The only status this crate writes.
    Pending,
    /// Paid out to the colleague.
    Paid,
    /// Cancelled.
    Cancelled,
}

/// A commission owed to a colleague for a referred invoice.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Commission {
    /// Unique identifier.
    pub id: Uuid,

    /// The colleague earning the commission.
    pub colleague_id: Uuid,

    /// The invoice the commission derives from.
    pub invoice_id: Uuid,

    /// Commission amount, frozen at creation.
    pub amount: Decimal,

    /// Payout status.
    pub status: CommissionStatus,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

/// Input for creating a commission.
#[derive(Debug, Clone)]
pub struct CreateCommission {
    pub colleague_id: Uuid,
    pub invoice_id: Uuid,
    pub amount: Decimal,
}

impl Commission {
    /// Insert a new commission with `Pending` payout status.
    pub async fn create<'e, E>(executor: E, input: CreateCommission) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO commissions (id, colleague_id, invoice_id, amount, status)
            VALUES ($1, $2, $3, $4, 'pending')
            RETURNING id, colleague_id, invoice_id, amount, status, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(input.colleague_id)
        .bind(input.invoice_id)
        .bind(input.amount)
        .fetch_one(executor)
        .await
    }
}

//! Colleague entity model.
//!
//! A colleague refers representatives and earns a commission on every
//! invoice billed to them. The rate is read at commit time; already-created
//! commissions are never recomputed when it changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A referring colleague.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Colleague {
    /// Unique identifier.
    pub id: Uuid,

    /// Display name.
    pub display_name: String,

    /// Commission rate as a fraction (e.g. 0.10 for 10%).
    pub commission_rate: Decimal,

    /// Whether the colleague is active.
    pub is_active: bool,

    /// When the row was created.
    pub created_at: DateTime<Utc>,
}

impl Colleague {
    /// Look up a colleague by id.
    pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, display_name, commission_rate, is_active, created_at
            FROM colleagues
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}

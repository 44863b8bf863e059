//! Representative entity model.
//!
//! The billable entity a usage export bills against. Created at most once
//! per `admin_username` (the "genesis" step of the ingestion pipeline) and
//! mutated afterwards only through additive balance increments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgExecutor};
use uuid::Uuid;

/// A representative carrying a running debt balance.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Representative {
    /// Unique identifier.
    pub id: Uuid,

    /// External identity key; unique, case-sensitive.
    pub admin_username: String,

    /// Display name; defaults to the username at genesis.
    pub display_name: String,

    /// Running debt balance.
    pub balance: Decimal,

    /// Referring colleague, if any. Drives commission creation.
    pub colleague_id: Option<Uuid>,

    /// Whether the representative is active.
    pub is_active: bool,

    /// When the row was created.
    pub created_at: DateTime<Utc>,

    /// When the row was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Representative {
    /// Look up a representative by its exact username.
    pub async fn find_by_username<'e, E>(
        executor: E,
        admin_username: &str,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            SELECT id, admin_username, display_name, balance, colleague_id,
                   is_active, created_at, updated_at
            FROM representatives
            WHERE admin_username = $1
            ",
        )
        .bind(admin_username)
        .fetch_optional(executor)
        .await
    }

    /// Create a representative for a previously-unseen username.
    ///
    /// Starts with a zero balance, the username as display name and no
    /// referring colleague.
    pub async fn create<'e, E>(executor: E, admin_username: &str) -> Result<Self, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, Self>(
            r"
            INSERT INTO representatives (id, admin_username, display_name, balance, is_active)
            VALUES ($1, $2, $2, 0, TRUE)
            RETURNING id, admin_username, display_name, balance, colleague_id,
                      is_active, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(admin_username)
        .fetch_one(executor)
        .await
    }

    /// Increment the balance by `delta` and return the new balance.
    ///
    /// The addition happens in the database (`balance = balance + $2`), so
    /// concurrent writers against the same row cannot lose updates. Never
    /// replace this with an application-side read-then-write.
    pub async fn increment_balance<'e, E>(
        executor: E,
        id: Uuid,
        delta: Decimal,
    ) -> Result<Decimal, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_scalar::<_, Decimal>(
            r"
            UPDATE representatives
            SET balance = balance + $2, updated_at = NOW()
            WHERE id = $1
            RETURNING balance
            ",
        )
        .bind(id)
        .bind(delta)
        .fetch_one(executor)
        .await
    }
}

//! ledgerflow persistence layer.
//!
//! Typed row models for the billing ledger tables plus a thin connection
//! wrapper. Every query method is generic over [`sqlx::PgExecutor`] so the
//! same statement can run against a pool or inside an open transaction —
//! the ingestion pipeline relies on this to keep an entire batch inside one
//! unit of work.
//!
//! # Modules
//!
//! - [`models`] - Row models (`Representative`, `Colleague`, `Invoice`, `Commission`)
//! - [`error`] - Database error type (`DbError`)

pub mod error;
pub mod models;

#[cfg(feature = "test-support")]
pub mod test_support;

pub use error::DbError;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

/// Default maximum number of pooled connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connection pool wrapper.
///
/// Owns the underlying [`PgPool`]; callers that need raw access (transactions,
/// ad-hoc queries) go through [`DbPool::inner`].
#[derive(Debug, Clone)]
pub struct DbPool(PgPool);

impl DbPool {
    /// Connect to the database at `url` with default pool settings.
    pub async fn connect(url: &str) -> Result<Self, DbError> {
        let pool = PgPoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect(url)
            .await
            .map_err(DbError::ConnectionFailed)?;

        Ok(Self(pool))
    }

    /// Wrap an existing pool.
    #[must_use]
    pub fn from_pool(pool: PgPool) -> Self {
        Self(pool)
    }

    /// Access the underlying `PgPool`.
    #[must_use]
    pub fn inner(&self) -> &PgPool {
        &self.0
    }
}

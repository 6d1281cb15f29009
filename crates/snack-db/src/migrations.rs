//! Embedded schema migrations.
//!
//! The SQL lives in `migrations/sqlite/` at the workspace root and is
//! compiled into the binary, so a fresh database file (or the in-memory
//! fallback) self-initializes on startup. All DDL is idempotent.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbError;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs any pending migrations against the pool.
pub async fn run(pool: &SqlitePool) -> Result<(), DbError> {
    MIGRATOR.run(pool).await?;
    info!("database migrations are up to date");
    Ok(())
}

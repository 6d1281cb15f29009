//! Database error types.

use thiserror::Error;

/// Errors surfaced by the persistence layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl DbError {
    /// Whether the error is a transient lock conflict worth retrying.
    /// SQLite reports these as `SQLITE_BUSY` / `SQLITE_LOCKED`.
    pub fn is_transient(&self) -> bool {
        match self {
            DbError::Sqlx(sqlx::Error::Database(db)) => {
                matches!(db.code().as_deref(), Some("5") | Some("6"))
                    || db.message().contains("database is locked")
            }
            _ => false,
        }
    }
}

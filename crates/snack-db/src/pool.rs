//! # Database Pool & Configuration
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                          Database                                   │
//! │                                                                     │
//! │   SqlitePool ──────────────┐          Arc<Mutex<()>>                │
//! │   (reads, narrow writes)   │          (whole-state write queue)     │
//! │                            ▼                                        │
//! │   StateRepository   SnackRepository   AuditRepository               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two deployment shapes:
//! - a SQLite file (WAL mode, created on first run), or
//! - an in-memory database when no path is configured. Degraded but
//!   functional; data lives only as long as the process.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tracing::info;

use crate::error::DbError;
use crate::migrations;
use crate::repository::{AuditRepository, SnackRepository, StateRepository};

// =============================================================================
// Configuration
// =============================================================================

/// Where the database lives.
#[derive(Debug, Clone, Default)]
pub struct DbConfig {
    /// SQLite file path. `None` selects the in-memory fallback.
    pub path: Option<PathBuf>,
}

impl DbConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            path: Some(path.into()),
        }
    }

    pub fn in_memory() -> Self {
        DbConfig { path: None }
    }

    /// Human-readable storage mode, reported by the health and state
    /// endpoints.
    pub fn mode(&self) -> &'static str {
        if self.path.is_some() {
            "db"
        } else {
            "memory"
        }
    }
}

// =============================================================================
// Database Handle
// =============================================================================

/// Shared handle over the pool and the whole-state write queue. Cheap to
/// clone; one per process.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    write_lock: Arc<Mutex<()>>,
}

impl Database {
    /// Opens (creating if necessary) the configured database and runs
    /// migrations.
    pub async fn connect(config: &DbConfig) -> Result<Self, DbError> {
        let (options, max_connections) = match &config.path {
            Some(path) => {
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .busy_timeout(Duration::from_secs(5));
                (options, 5)
            }
            // A pool of in-memory connections would be a pool of *separate*
            // databases, so the fallback pins a single connection.
            None => (SqliteConnectOptions::from_str("sqlite::memory:")?, 1),
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        migrations::run(&pool).await?;
        info!(mode = config.mode(), "database ready");

        Ok(Database {
            pool,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Cheap liveness probe for the health endpoint.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ---- repositories ----

    pub fn state(&self) -> StateRepository {
        StateRepository::new(self.pool.clone(), Arc::clone(&self.write_lock))
    }

    pub fn snacks(&self) -> SnackRepository {
        SnackRepository::new(self.pool.clone())
    }

    pub fn audit(&self) -> AuditRepository {
        AuditRepository::new(self.pool.clone())
    }
}

//! Shared request context.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use snack_db::Database;

/// Everything a handler needs, cloned per request by axum's `State`
/// extractor.
#[derive(Clone)]
pub struct AppContext {
    pub db: Database,
    /// Storage mode reported to clients: `"db"` or `"memory"`.
    pub mode: &'static str,
    pub backup_dir: Option<Arc<PathBuf>>,
    started_at: Instant,
}

impl AppContext {
    pub fn new(db: Database, mode: &'static str, backup_dir: Option<PathBuf>) -> Self {
        AppContext {
            db,
            mode,
            backup_dir: backup_dir.map(Arc::new),
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

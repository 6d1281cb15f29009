//! JSON state backups.
//!
//! A backup is a plain JSON file `snack-backup-<reason>-<YYYYMMDD_HHMMSS>.json`
//! containing `{createdAt, reason, state}`. Written on demand by the backup
//! endpoint and periodically by the auto-backup task when
//! `BACKUP_INTERVAL_MINUTES` is set.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use snack_core::AppState;
use snack_db::Database;
use tracing::{error, info};

use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BackupFile<'a> {
    created_at: chrono::DateTime<Utc>,
    reason: &'a str,
    state: &'a AppState,
}

/// Writes one backup file and returns its path.
pub async fn write_backup(
    dir: &Path,
    reason: &str,
    state: &AppState,
) -> Result<PathBuf, ApiError> {
    let now = Utc::now();
    let file_name = format!("snack-backup-{}-{}.json", reason, now.format("%Y%m%d_%H%M%S"));
    let path = dir.join(file_name);

    let payload = BackupFile {
        created_at: now,
        reason,
        state,
    };
    let body = serde_json::to_vec_pretty(&payload)
        .map_err(|e| ApiError::Internal(format!("backup serialization failed: {e}")))?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| ApiError::Internal(format!("backup directory unavailable: {e}")))?;
    tokio::fs::write(&path, body)
        .await
        .map_err(|e| ApiError::Internal(format!("backup write failed: {e}")))?;

    info!(path = %path.display(), reason, "backup written");
    Ok(path)
}

/// Periodic auto-backup loop. Runs until the process exits.
pub async fn auto_backup_task(db: Database, dir: PathBuf, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    // The first tick fires immediately; skip it so startup stays quiet.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        match db.state().read().await {
            Ok(state) if state.is_empty() => {
                info!("auto-backup skipped, state is empty");
            }
            Ok(state) => {
                if let Err(err) = write_backup(&dir, "auto", &state).await {
                    error!(error = %err, "auto-backup failed");
                }
            }
            Err(err) => error!(error = %err, "auto-backup could not read state"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_backup_names_file_by_reason() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::default();
        let path = write_backup(dir.path(), "manual", &state).await.unwrap();

        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("snack-backup-manual-"));
        assert!(name.ends_with(".json"));

        let body = tokio::fs::read_to_string(&path).await.unwrap();
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["reason"], "manual");
        assert!(json.get("createdAt").is_some());
        assert!(json["state"].get("snacks").is_some());
    }
}

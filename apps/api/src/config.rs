//! Environment-driven configuration.
//!
//! Everything the server needs comes from process environment variables:
//!
//! | Variable                  | Default | Meaning                           |
//! |---------------------------|---------|-----------------------------------|
//! | `PORT`                    | `3000`  | HTTP listen port                  |
//! | `DATABASE_PATH`           | unset   | SQLite file; unset → in-memory    |
//! | `BACKUP_DIR`              | unset   | where JSON backups are written    |
//! | `BACKUP_INTERVAL_MINUTES` | unset   | periodic auto-backup, off if unset|
//! | `RUST_LOG`                | `info`  | tracing env-filter directive      |

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value '{0}'")]
    InvalidPort(String),

    #[error("invalid BACKUP_INTERVAL_MINUTES value '{0}'")]
    InvalidBackupInterval(String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub port: u16,
    /// SQLite file path; `None` runs on the in-memory fallback.
    pub database_path: Option<PathBuf>,
    pub backup_dir: Option<PathBuf>,
    pub backup_interval: Option<Duration>,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            Err(_) => 3000,
        };

        let backup_interval = match env::var("BACKUP_INTERVAL_MINUTES") {
            Ok(raw) => {
                let minutes = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidBackupInterval(raw.clone()))?;
                if minutes == 0 {
                    return Err(ConfigError::InvalidBackupInterval(raw));
                }
                Some(Duration::from_secs(minutes * 60))
            }
            Err(_) => None,
        };

        Ok(ApiConfig {
            port,
            database_path: env::var("DATABASE_PATH").ok().map(PathBuf::from),
            backup_dir: env::var("BACKUP_DIR").ok().map(PathBuf::from),
            backup_interval,
        })
    }
}

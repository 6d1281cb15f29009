//! # snack-api: HTTP Front of the Snack Stand Backend
//!
//! Thin by design: handlers parse the request, call into `snack-core` /
//! `snack-db`, and map results to JSON. No business logic lives here.
//!
//! Exposed as a library so integration tests can build the router against an
//! in-memory database without binding a socket.

pub mod backup;
pub mod config;
pub mod context;
pub mod error;
pub mod routes;

use snack_db::{Database, DbConfig};

use crate::config::ApiConfig;
use crate::context::AppContext;

/// Builds the application router from configuration: opens the database,
/// runs migrations, wires the shared context.
pub async fn build(config: &ApiConfig) -> Result<(axum::Router, AppContext), snack_db::DbError> {
    let db_config = match &config.database_path {
        Some(path) => DbConfig::file(path.clone()),
        None => DbConfig::in_memory(),
    };
    let db = Database::connect(&db_config).await?;
    let ctx = AppContext::new(db, db_config.mode(), config.backup_dir.clone());
    Ok((routes::router(ctx.clone()), ctx))
}

//! On-demand backup endpoint.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::backup::write_backup;
use crate::context::AppContext;
use crate::error::ApiError;

/// `GET /api/backup` — returns the full state and, when a backup directory
/// is configured, writes it to disk as well.
pub async fn backup(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    let state = ctx.db.state().read().await?;

    let file_path = match &ctx.backup_dir {
        Some(dir) => Some(write_backup(dir, "manual", &state).await?),
        None => None,
    };

    Ok(Json(json!({
        "ok": true,
        "saved": file_path.is_some(),
        "filePath": file_path.map(|p| p.display().to_string()),
        "state": state,
    })))
}

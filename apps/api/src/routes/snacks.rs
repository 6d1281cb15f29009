//! Single-snack upsert.
//!
//! The narrow write path for product edits carrying large embedded images:
//! one row changes without re-shipping the whole state blob. No validator
//! runs here, so the merge clamps negatives instead of rejecting.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};
use snack_core::normalize::merge_snack_patch;

use crate::context::AppContext;
use crate::error::ApiError;

pub async fn upsert_snack(
    State(ctx): State<AppContext>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    if id <= 0 {
        return Err(ApiError::BadRequest("snack id must be positive".to_string()));
    }

    // Accept both `{snack: {...}}` and a bare patch object.
    let patch = body.get("snack").unwrap_or(&body);
    if !patch.is_object() {
        return Err(ApiError::BadRequest("missing snack object".to_string()));
    }

    let repo = ctx.db.snacks();
    let existing = repo.get(id).await?;
    let merged = merge_snack_patch(existing.as_ref(), id, patch);
    repo.upsert(&merged).await?;

    Ok(Json(json!({"ok": true, "snack": merged})))
}

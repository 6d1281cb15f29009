//! Whole-state sync endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use snack_core::{normalize, validate};
use tracing::info;

use crate::context::AppContext;
use crate::error::ApiError;

/// `GET /api/state` — the persisted state, or `null` when nothing has ever
/// been saved, so fresh clients fall back to their seeded defaults.
pub async fn get_state(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    let state = ctx.db.state().read().await?;
    let state_json = if state.is_empty() {
        Value::Null
    } else {
        serde_json::to_value(&state)
            .map_err(|e| ApiError::Internal(format!("state serialization failed: {e}")))?
    };
    Ok(Json(json!({"state": state_json, "mode": ctx.mode})))
}

/// `PUT /api/state` — the full pipeline: sanitize, validate, replace.
/// Validation failure rejects the whole write with itemized details.
pub async fn put_state(
    State(ctx): State<AppContext>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let raw = body
        .get("state")
        .filter(|v| v.is_object())
        .ok_or_else(|| ApiError::BadRequest("missing state object".to_string()))?;

    let state = normalize::sanitize_state(raw, Utc::now());

    let errors = validate::validate(&state);
    if !errors.is_empty() {
        info!(violations = errors.len(), "state rejected by validation");
        return Err(ApiError::Validation(errors));
    }

    ctx.db.state().replace(&state).await?;
    Ok(Json(json!({"ok": true, "mode": ctx.mode})))
}

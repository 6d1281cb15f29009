//! Audit log query endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::error::ApiError;

const DEFAULT_LIMIT: u32 = 100;
const MAX_LIMIT: u32 = 500;

#[derive(Deserialize)]
pub struct AuditQuery {
    limit: Option<u32>,
}

/// `GET /api/audit?limit=N` — most recent entries, newest first. The limit
/// is clamped to 1..=500.
pub async fn recent(
    State(ctx): State<AppContext>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let logs = ctx.db.audit().recent(limit).await?;
    Ok(Json(json!({"ok": true, "logs": logs})))
}

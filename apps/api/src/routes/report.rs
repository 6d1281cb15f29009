//! Report endpoints.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use snack_core::report;

use crate::context::AppContext;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct MonthQuery {
    month: Option<String>,
}

/// `GET /api/report/monthly?month=YYYY-MM`
pub async fn monthly(
    State(ctx): State<AppContext>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Value>, ApiError> {
    let month = query
        .month
        .ok_or_else(|| ApiError::BadRequest("missing month parameter".to_string()))?;

    let state = ctx.db.state().read().await?;
    let report = report::monthly_report(&state, &month)?;
    Ok(Json(json!({"ok": true, "report": report})))
}

/// `GET /api/report/cumulative`
pub async fn cumulative(State(ctx): State<AppContext>) -> Result<Json<Value>, ApiError> {
    let state = ctx.db.state().read().await?;
    let report = report::cumulative_report(&state);
    Ok(Json(json!({"ok": true, "report": report})))
}

//! Liveness probe.

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::context::AppContext;

pub async fn health(State(ctx): State<AppContext>) -> Json<Value> {
    let db_ok = ctx.db.health_check().await;
    Json(json!({
        "ok": db_ok,
        "db": db_ok,
        "mode": ctx.mode,
        "uptimeSec": ctx.uptime_secs(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

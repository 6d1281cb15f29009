//! # HTTP Routes
//!
//! ```text
//! GET  /api/health                    liveness + storage mode
//! GET  /api/state                     whole state (null when empty)
//! PUT  /api/state                     sanitize → validate → replace
//! PUT  /api/snacks/{id}               narrow single-product upsert
//! GET  /api/report/monthly?month=     monthly report bundle
//! GET  /api/report/cumulative         all-time report
//! GET  /api/audit?limit=              recent audit entries
//! GET  /api/backup                    on-demand JSON backup
//! POST /api/customers/{name}/settle   mark a customer's bill collected
//! ```

mod audit;
mod backup;
mod health;
mod report;
mod settle;
mod snacks;
mod state;

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::context::AppContext;

pub fn router(ctx: AppContext) -> Router {
    Router::new()
        .route("/api/health", get(health::health))
        .route("/api/state", get(state::get_state).put(state::put_state))
        .route("/api/snacks/{id}", put(snacks::upsert_snack))
        .route("/api/report/monthly", get(report::monthly))
        .route("/api/report/cumulative", get(report::cumulative))
        .route("/api/audit", get(audit::recent))
        .route("/api/backup", get(backup::backup))
        .route("/api/customers/{name}/settle", post(settle::settle))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

//! Bill settlement endpoint.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};
use snack_core::billing::settle_customer;
use snack_core::{AuditLogEntry, Role};
use tracing::info;
use uuid::Uuid;

use crate::context::AppContext;
use crate::error::ApiError;

/// `POST /api/customers/{name}/settle` — marks every unsettled purchase of
/// the customer as collected. Idempotent: a repeat call settles nothing and
/// performs no write.
pub async fn settle(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::BadRequest("missing customer name".to_string()));
    }

    let mut state = ctx.db.state().read().await?;
    let now = Utc::now();
    let outcome = settle_customer(&mut state, &name, now);

    if outcome.is_noop() {
        return Ok(Json(json!({
            "ok": true,
            "settled": 0,
            "message": format!("no outstanding purchases for {name}"),
        })));
    }

    state.audit_logs.push(AuditLogEntry {
        id: Uuid::new_v4().to_string(),
        action: "billing.settle".to_string(),
        detail: format!("settled {} purchases for {}", outcome.settled, name),
        actor_id: None,
        actor_name: "System".to_string(),
        actor_role: Role::Staff,
        meta: json!({
            "customer": name,
            "amount": outcome.amount,
            "units": outcome.units,
        }),
        at: now,
    });

    ctx.db.state().replace(&state).await?;
    info!(customer = %name, settled = outcome.settled, "bill settled");

    Ok(Json(json!({
        "ok": true,
        "settled": outcome.settled,
        "message": format!("settled {} purchases for {name}", outcome.settled),
    })))
}

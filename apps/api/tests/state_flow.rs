//! End-to-end state flow against the real router and an in-memory database:
//! save a state blob, read it back, run reports, settle a bill, take a
//! backup.

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use snack_api::build;
use snack_api::config::ApiConfig;

fn config() -> ApiConfig {
    ApiConfig {
        port: 0,
        database_path: None,
        backup_dir: None,
        backup_interval: None,
    }
}

async fn app() -> Router {
    let (router, _ctx) = build(&config()).await.unwrap();
    router
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn sample_state() -> Value {
    json!({"state": {
        "snacks": [{"id": 1, "name": "มาม่า", "price": 7, "costPrice": 5, "stock": 48}],
        "customers": [{"name": "เอ", "shift": "A"}],
        "users": [{"id": 1, "displayName": "Boss", "role": "admin"}],
        "purchases": [{
            "id": "p1", "customerName": "เอ", "snackId": 1, "snackName": "มาม่า",
            "qty": 2, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"
        }],
        "auditLogs": []
    }})
}

#[tokio::test]
async fn test_health() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["db"], true);
    assert_eq!(body["mode"], "memory");
}

#[tokio::test]
async fn test_state_is_null_before_first_save() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["state"].is_null());
    assert_eq!(body["mode"], "memory");
}

#[tokio::test]
async fn test_save_and_reload_state() {
    let app = app().await;

    let (status, body) = send(&app, Method::PUT, "/api/state", Some(sample_state())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let (status, body) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(status, StatusCode::OK);
    let state = &body["state"];
    assert_eq!(state["snacks"][0]["name"], "มาม่า");
    assert_eq!(state["snacks"][0]["sellPrice"], 7.0);
    assert_eq!(state["customers"][0]["shift"], "A");
    // Line totals recomputed from unit fields.
    assert_eq!(state["purchases"][0]["lineRevenue"], 14.0);
    assert_eq!(state["purchases"][0]["lineProfit"], 4.0);
}

#[tokio::test]
async fn test_missing_state_object_is_rejected() {
    let app = app().await;
    let (status, body) = send(&app, Method::PUT, "/api/state", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_invalid_state_rejected_and_prior_state_kept() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let broken = json!({"state": {
        "snacks": [{"id": 1, "name": "bad", "price": -5}]
    }});
    let (status, body) = send(&app, Method::PUT, "/api/state", Some(broken)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation failed");
    assert!(body["details"].as_array().unwrap().len() >= 1);

    // Previous state untouched.
    let (_, body) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(body["state"]["snacks"][0]["name"], "มาม่า");
}

#[tokio::test]
async fn test_duplicate_purchase_ids_deduplicated_on_save() {
    let app = app().await;
    let state = json!({"state": {
        "users": [{"id": 1, "displayName": "Boss", "role": "admin"}],
        "purchases": [
            {"id": "p1", "customerName": "เอ", "snackName": "x",
             "qty": 1, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"},
            {"id": "p1", "customerName": "เอ", "snackName": "x",
             "qty": 1, "unitPrice": 7, "unitCost": 5, "date": "2026-02-08"}
        ]
    }});
    let (status, _) = send(&app, Method::PUT, "/api/state", Some(state)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/api/state", None).await;
    let ids: Vec<&str> = body["state"]["purchases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&"p1"));
    assert!(ids.contains(&"p1__dup1"));
}

#[tokio::test]
async fn test_snack_upsert() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/snacks/1",
        Some(json!({"snack": {"stock": 40}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["snack"]["stock"], 40.0);
    assert_eq!(body["snack"]["name"], "มาม่า");

    let (_, body) = send(&app, Method::GET, "/api/state", None).await;
    assert_eq!(body["state"]["snacks"][0]["stock"], 40.0);
}

#[tokio::test]
async fn test_snack_upsert_rejects_bad_id() {
    let app = app().await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/snacks/0",
        Some(json!({"snack": {"name": "x"}})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_monthly_report() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let (status, body) = send(&app, Method::GET, "/api/report/monthly?month=2026-02", None).await;
    assert_eq!(status, StatusCode::OK);
    let report = &body["report"];
    assert_eq!(report["summary"]["revenue"], 14.0);
    assert_eq!(report["summary"]["cost"], 10.0);
    assert_eq!(report["summary"]["profit"], 4.0);
    assert_eq!(report["billingByCustomer"]["เอ"]["total"], 14.0);
    assert_eq!(report["bestSellers"][0]["name"], "มาม่า");

    // Next month is empty.
    let (_, body) = send(&app, Method::GET, "/api/report/monthly?month=2026-03", None).await;
    assert_eq!(body["report"]["summary"]["transactions"], 0);
}

#[tokio::test]
async fn test_monthly_report_rejects_bad_month() {
    let app = app().await;
    for uri in [
        "/api/report/monthly",
        "/api/report/monthly?month=2026-13",
        "/api/report/monthly?month=garbage",
    ] {
        let (status, _) = send(&app, Method::GET, uri, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "expected 400 for {uri}");
    }
}

#[tokio::test]
async fn test_cumulative_report() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let (status, body) = send(&app, Method::GET, "/api/report/cumulative", None).await;
    assert_eq!(status, StatusCode::OK);
    let row = &body["report"]["rows"][0];
    assert_eq!(row["name"], "มาม่า");
    assert_eq!(row["sold"], 2.0);
    assert_eq!(row["estimated"], false);
}

#[tokio::test]
async fn test_settle_is_idempotent_and_audited() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    // "เอ", percent-encoded for the request line.
    let uri = "/api/customers/%E0%B9%80%E0%B8%AD/settle";
    let (status, body) = send(&app, Method::POST, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settled"], 1);

    // Second call settles nothing.
    let (status, body) = send(&app, Method::POST, uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["settled"], 0);

    // Exactly one billing.settle audit entry.
    let (_, body) = send(&app, Method::GET, "/api/audit?limit=50", None).await;
    let settle_entries: Vec<&Value> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["action"] == "billing.settle")
        .collect();
    assert_eq!(settle_entries.len(), 1);

    // Outstanding is cleared, billing history stays.
    let (_, body) = send(&app, Method::GET, "/api/report/monthly?month=2026-02", None).await;
    assert_eq!(body["report"]["billingByCustomer"]["เอ"]["total"], 14.0);
    assert!(body["report"]["outstandingByCustomer"]
        .as_object()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_audit_limit_clamped() {
    let app = app().await;
    let (status, body) = send(&app, Method::GET, "/api/audit?limit=99999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["logs"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_backup_endpoint_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config();
    config.backup_dir = Some(dir.path().to_path_buf());
    let (app, _ctx) = build(&config).await.unwrap();

    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let (status, body) = send(&app, Method::GET, "/api/backup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], true);
    let path = body["filePath"].as_str().unwrap();
    assert!(path.contains("snack-backup-manual-"));
    assert!(std::path::Path::new(path).exists());
    assert_eq!(body["state"]["snacks"][0]["name"], "มาม่า");
}

#[tokio::test]
async fn test_backup_without_dir_still_returns_state() {
    let app = app().await;
    send(&app, Method::PUT, "/api/state", Some(sample_state())).await;

    let (status, body) = send(&app, Method::GET, "/api/backup", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["saved"], false);
    assert!(body["filePath"].is_null());
    assert_eq!(body["state"]["snacks"][0]["name"], "มาม่า");
}

//! HTTP surface unit tests
//!
//! Each test builds the real router over transport and token-manager doubles
//! and drives it with `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http::Method;
use serde_json::{json, Value};
use tower::ServiceExt;

use gatelink::came::client::VendorClient;
use gatelink::server::serve::router;
use gatelink::server::state::ServerState;

use crate::common::{fake_jwt, FakeTokenManager, MapTransport};

const BASE: &str = "https://app.cameconnect.net/api";

fn app_over(transport: Arc<MapTransport>, token: &str) -> Router {
    let token_mngr = Arc::new(FakeTokenManager::new(token, BASE));
    let client = Arc::new(VendorClient::new(transport, token_mngr.clone()));
    router(Arc::new(ServerState::new(token_mngr, client)))
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app_over(Arc::new(MapTransport::new(404, "")), "token");

    let (status, body) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = app_over(Arc::new(MapTransport::new(404, "")), "token");

    let (status, body) = get(app, "/version").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["version"].is_string());
    assert!(body["git_hash"].is_string());
}

#[tokio::test]
async fn test_status_endpoint_normalizes_the_vendor_payload() {
    let payload = json!({
        "Success": true,
        "Data": {
            "Online": true,
            "States": [
                {"CommandId": 1, "Data": [17], "UpdatedAt": "2025-03-01T10:00:00Z"},
                {"CommandId": 3, "Data": [0], "UpdatedAt": "2025-03-01T10:05:00Z"},
            ],
        },
    });
    let transport = Arc::new(MapTransport::new(404, "").respond(
        Method::GET,
        "https://app.cameconnect.net/api/automations/42/status",
        200,
        &payload.to_string(),
    ));
    let app = app_over(transport, "token");

    let (status, body) = get(app, "/devices/42/status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["state"], json!("closed"));
    assert_eq!(body["position"], json!(0));
    assert_eq!(body["moving"], json!(false));
    assert_eq!(body["direction"], json!("unknown"));
    assert_eq!(body["online"], json!(true));
    assert_eq!(body["updated_at"], json!("2025-03-01T10:05:00Z"));
    assert_eq!(body["base"], json!(BASE));
}

#[tokio::test]
async fn test_status_endpoint_maps_vendor_errors_to_bad_gateway() {
    let app = app_over(Arc::new(MapTransport::new(500, "boom")), "token");

    let (status, body) = get(app, "/devices/42/status").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["last"]["status"], json!(500));
    assert_eq!(body["last"]["body"], json!("boom"));
}

#[tokio::test]
async fn test_commands_endpoint_returns_the_listing() {
    let transport = Arc::new(MapTransport::new(404, "").respond(
        Method::GET,
        "https://app.cameconnect.net/api/automations/42/commands",
        200,
        r#"{"Data":[{"Id":129,"Name":"open"}]}"#,
    ));
    let app = app_over(transport, "token");

    let (status, body) = get(app, "/devices/42/commands").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(
        body["url"],
        json!("https://app.cameconnect.net/api/automations/42/commands")
    );
    assert_eq!(body["data"]["Data"][0]["Id"], json!(129));
}

#[tokio::test]
async fn test_command_endpoint_reports_the_shape_used() {
    let transport = Arc::new(MapTransport::new(404, "not found").respond(
        Method::POST,
        "https://app.cameconnect.net/api/automations/42/commands/129",
        200,
        "",
    ));
    let app = app_over(transport, "token");

    let (status, body) = get(app, "/devices/42/command/129").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["used"]["method"], json!("POST"));
    assert_eq!(
        body["used"]["url"],
        json!("https://app.cameconnect.net/api/automations/42/commands/129")
    );
    assert_eq!(body["used"]["status"], json!(200));
}

#[tokio::test]
async fn test_command_endpoint_maps_exhaustion_to_bad_gateway() {
    let app = app_over(Arc::new(MapTransport::new(404, "not found")), "token");

    let (status, body) = get(app, "/devices/42/command/129").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["last"]["status"], json!(404));
    assert_eq!(
        body["last"]["url"],
        json!("https://app.cameconnect.net/api/devices/42/command/129")
    );
}

#[tokio::test]
async fn test_debug_token_reports_presence_only() {
    let app = app_over(Arc::new(MapTransport::new(404, "")), "secret-token");

    let (status, body) = get(app, "/debug/token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["access_token_present"], json!(true));
    assert_eq!(body["base"], json!(BASE));

    // The token itself never leaves the process
    assert!(body.get("access_token").is_none());
    assert!(!body.to_string().contains("secret-token"));
}

#[tokio::test]
async fn test_token_detail_handles_opaque_tokens() {
    let app = app_over(Arc::new(MapTransport::new(404, "")), "not-a-jwt");

    let (status, body) = get(app, "/debug/token_detail").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["has_payload"], json!(false));
    assert_eq!(body["exp"], Value::Null);
    assert_eq!(body["expires_in_s"], Value::Null);
}

#[tokio::test]
async fn test_token_detail_surfaces_the_exp_claim() {
    let token = fake_jwt(&json!({"exp": 4102444800i64}));
    let app = app_over(Arc::new(MapTransport::new(404, "")), &token);

    let (status, body) = get(app, "/debug/token_detail").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["has_payload"], json!(true));
    assert_eq!(body["exp"], json!(4102444800i64));
    assert!(body["expires_in_s"].is_i64());
}

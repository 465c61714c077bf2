//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::authn::token::peek_claims;
use crate::came::commands::{execute_command, list_commands, CommandOutcome};
use crate::came::status::{fetch_status, StatusSnapshot};
use crate::errors::BridgeError;
use crate::server::state::ServerState;
use crate::utils::version_info;

impl IntoResponse for BridgeError {
    fn into_response(self) -> Response {
        warn!("Request failed: {}", self);

        let (status, body) = match &self {
            BridgeError::ConfigError(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": "configuration", "detail": detail}),
            ),
            BridgeError::ExchangeError(detail) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "oauth exchange failed", "detail": detail}),
            ),
            BridgeError::UpstreamError(last) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "no vendor endpoint accepted the request", "last": last}),
            ),
            BridgeError::HttpError(e) => (
                StatusCode::BAD_GATEWAY,
                json!({"error": "vendor transport", "detail": e.to_string()}),
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({"error": self.to_string()}),
            ),
        };

        (status, Json(body)).into_response()
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Health check handler
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}

/// Version response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub git_hash: String,
    pub build_time: String,
}

/// Version handler
pub async fn version_handler() -> impl IntoResponse {
    let version = version_info();
    Json(VersionResponse {
        version: version.version,
        git_hash: version.git_hash,
        build_time: version.build_time,
    })
}

/// Command listing response
#[derive(Debug, Serialize)]
pub struct CommandListResponse {
    pub ok: bool,
    pub base: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Command listing handler
pub async fn list_commands_handler(
    State(state): State<Arc<ServerState>>,
    Path(device_id): Path<i64>,
) -> Result<Json<CommandListResponse>, BridgeError> {
    let active = state.token_mngr.ensure_token().await?;
    let listing = list_commands(&state.client, &active.base, device_id).await?;

    Ok(Json(CommandListResponse {
        ok: true,
        base: active.base,
        url: listing.url,
        data: listing.data,
        raw: listing.raw,
    }))
}

/// Device status handler
pub async fn device_status_handler(
    State(state): State<Arc<ServerState>>,
    Path(device_id): Path<i64>,
) -> Result<Json<StatusSnapshot>, BridgeError> {
    let active = state.token_mngr.ensure_token().await?;
    let snapshot = fetch_status(&state.client, &active.base, device_id).await?;
    Ok(Json(snapshot))
}

/// Command execution response
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub success: bool,
    pub used: CommandOutcome,
}

/// Command execution handler
pub async fn exec_command_handler(
    State(state): State<Arc<ServerState>>,
    Path((device_id, command_id)): Path<(i64, i64)>,
) -> Result<Json<CommandResponse>, BridgeError> {
    let active = state.token_mngr.ensure_token().await?;
    let outcome = execute_command(&state.client, &active.base, device_id, command_id).await?;

    Ok(Json(CommandResponse {
        success: true,
        used: outcome,
    }))
}

/// Token presence response
#[derive(Debug, Serialize)]
pub struct TokenDebugResponse {
    pub ok: bool,
    pub base: String,
    pub access_token_present: bool,
}

/// Token presence handler. Never echoes the token itself.
pub async fn debug_token_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<TokenDebugResponse>, BridgeError> {
    let active = state.token_mngr.ensure_token().await?;

    Ok(Json(TokenDebugResponse {
        ok: true,
        base: active.base,
        access_token_present: !active.access_token.is_empty(),
    }))
}

/// Token claim detail response
#[derive(Debug, Serialize)]
pub struct TokenDetailResponse {
    pub ok: bool,
    pub base: String,
    pub has_payload: bool,
    pub exp: Option<i64>,
    pub expires_in_s: Option<i64>,
}

/// Token claim detail handler. Claims are decoded without verification; a
/// token that is not a JWT reports `has_payload: false` instead of failing.
pub async fn token_detail_handler(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<TokenDetailResponse>, BridgeError> {
    let active = state.token_mngr.ensure_token().await?;
    let claims = peek_claims(&active.access_token);
    let exp = claims.as_ref().and_then(|c| c.exp);
    let now = Utc::now().timestamp();

    Ok(Json(TokenDetailResponse {
        ok: !active.access_token.is_empty(),
        base: active.base,
        has_payload: claims.is_some(),
        exp,
        expires_in_s: exp.map(|e| e - now),
    }))
}

//! HTTP server setup

use std::future::Future;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::options::ServerOptions;
use crate::errors::BridgeError;
use crate::server::handlers::{
    debug_token_handler, device_status_handler, exec_command_handler, health_handler,
    list_commands_handler, token_detail_handler, version_handler,
};
use crate::server::state::ServerState;

/// Build the bridge router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        // Health and version
        .route("/health", get(health_handler))
        .route("/version", get(version_handler))
        // Devices
        .route("/devices/{device_id}/commands", get(list_commands_handler))
        .route("/devices/{device_id}/status", get(device_status_handler))
        .route(
            "/devices/{device_id}/command/{command_id}",
            get(exec_command_handler),
        )
        // Debug
        .route("/debug/token", get(debug_token_handler))
        .route("/debug/token_detail", get(token_detail_handler))
        // State and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server
pub async fn serve(
    options: &ServerOptions,
    state: Arc<ServerState>,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<JoinHandle<Result<(), BridgeError>>, BridgeError> {
    let app = router(state);

    let addr = format!("{}:{}", options.host, options.port);
    info!("Starting HTTP server on {}", addr);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| BridgeError::ServerError(e.to_string()))?;

    let handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| BridgeError::ServerError(e.to_string()))
    });

    Ok(handle)
}

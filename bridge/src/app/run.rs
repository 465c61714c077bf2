//! Main application run loop

use std::future::Future;
use std::sync::Arc;

use tracing::info;

use crate::app::options::AppOptions;
use crate::authn::exchange::TokenExchange;
use crate::authn::token_mngr::{TokenManager, TokenManagerExt};
use crate::came::client::{HttpTransport, VendorClient};
use crate::errors::BridgeError;
use crate::server::serve::serve;
use crate::server::state::ServerState;

/// Run the Gatelink bridge until the shutdown signal fires
pub async fn run(
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), BridgeError> {
    info!("Initializing Gatelink bridge...");

    options.storage.layout.setup().await?;

    let state = init_server_state(&options)?;
    let handle = serve(&options.server, state, shutdown_signal).await?;

    handle
        .await
        .map_err(|e| BridgeError::ServerError(e.to_string()))??;

    info!("Shutdown complete");
    Ok(())
}

/// Wire the token manager and vendor client into shared server state.
///
/// No vendor traffic happens here; the first exchange runs lazily when a
/// request needs a token.
fn init_server_state(options: &AppOptions) -> Result<Arc<ServerState>, BridgeError> {
    let token_file = Arc::new(options.storage.layout.token_file());

    let exchange = Arc::new(TokenExchange::new(
        options.vendor.clone(),
        options.credentials.clone(),
    )?);

    let token_mngr: Arc<dyn TokenManagerExt> = Arc::new(TokenManager::new(
        token_file,
        exchange,
        options.vendor.default_base().to_string(),
    ));

    let transport = Arc::new(HttpTransport::new()?);
    let client = Arc::new(VendorClient::new(transport, token_mngr.clone()));

    Ok(Arc::new(ServerState::new(token_mngr, client)))
}

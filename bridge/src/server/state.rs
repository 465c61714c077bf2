//! Server state

use std::sync::Arc;

use crate::authn::token_mngr::TokenManagerExt;
use crate::came::client::VendorClient;

/// Server state shared across handlers
pub struct ServerState {
    pub token_mngr: Arc<dyn TokenManagerExt>,
    pub client: Arc<VendorClient>,
}

impl ServerState {
    pub fn new(token_mngr: Arc<dyn TokenManagerExt>, client: Arc<VendorClient>) -> Self {
        Self { token_mngr, client }
    }
}

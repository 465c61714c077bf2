//! Authenticated vendor request execution

use std::sync::Arc;

use async_trait::async_trait;
use http::{Method, StatusCode};
use reqwest::{header, Client};
use serde_json::Value;
use tracing::{debug, info};

use crate::authn::token_mngr::TokenManagerExt;
use crate::errors::BridgeError;

/// A vendor response reduced to what the callers need
#[derive(Debug, Clone)]
pub struct VendorResponse {
    pub status: u16,
    pub body: String,
}

impl VendorResponse {
    /// Parse the body as JSON
    pub fn json(&self) -> Result<Value, BridgeError> {
        let value = serde_json::from_str(&self.body)?;
        Ok(value)
    }
}

/// Transport trait for testability
#[async_trait]
pub trait TransportExt: Send + Sync {
    /// Send one bearer-authenticated request and read the body regardless of
    /// the status code. Only connection-level failures error here.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        bearer: &str,
        payload: Option<&Value>,
    ) -> Result<VendorResponse, BridgeError>;
}

/// Transport implementation over reqwest
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a new transport
    pub fn new() -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TransportExt for HttpTransport {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        bearer: &str,
        payload: Option<&Value>,
    ) -> Result<VendorResponse, BridgeError> {
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bearer {}", bearer))
            .header(header::ACCEPT, "application/json");

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        Ok(VendorResponse { status, body })
    }
}

/// Vendor client: pairs the transport with the token manager and owns the
/// 401-recovery rule.
pub struct VendorClient {
    transport: Arc<dyn TransportExt>,
    token_mngr: Arc<dyn TokenManagerExt>,
}

impl VendorClient {
    /// Create a new vendor client
    pub fn new(transport: Arc<dyn TransportExt>, token_mngr: Arc<dyn TokenManagerExt>) -> Self {
        Self {
            transport,
            token_mngr,
        }
    }

    /// Execute one authenticated call.
    ///
    /// A 401 triggers exactly one forced refresh followed by one retry; the
    /// retry's response is returned as-is, 401 included. Every other status
    /// passes straight through for the caller to interpret.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        payload: Option<&Value>,
    ) -> Result<VendorResponse, BridgeError> {
        let token = self.token_mngr.ensure_token().await?;
        let response = self
            .transport
            .execute(method.clone(), url, &token.access_token, payload)
            .await?;

        if response.status != StatusCode::UNAUTHORIZED.as_u16() {
            return Ok(response);
        }

        info!("Vendor returned 401 for {} {}, refreshing token and retrying once", method, url);
        let token = self.token_mngr.refresh_token().await?;
        self.transport
            .execute(method, url, &token.access_token, payload)
            .await
    }
}

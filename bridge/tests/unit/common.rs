//! Shared test doubles

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use http::Method;
use serde_json::Value;

use gatelink::authn::exchange::TokenExchangeExt;
use gatelink::authn::token::TokenRecord;
use gatelink::authn::token_mngr::{ActiveToken, TokenManagerExt};
use gatelink::came::client::{TransportExt, VendorResponse};
use gatelink::errors::BridgeError;

/// Build a token record the way the vendor's token endpoint would
pub fn record(access_token: &str, base: Option<&str>) -> TokenRecord {
    TokenRecord {
        access_token: access_token.to_string(),
        refresh_token: None,
        base: base.map(str::to_string),
        extra: serde_json::Map::new(),
    }
}

/// Assemble an unsigned JWT carrying the given claims
pub fn fake_jwt(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{}.{}.sig", header, payload)
}

/// Token manager double: hands out a fixed token and rewrites it on refresh
/// so callers can tell which token served which request
pub struct FakeTokenManager {
    token: Mutex<String>,
    base: String,
    refreshes: AtomicUsize,
}

impl FakeTokenManager {
    pub fn new(token: &str, base: &str) -> Self {
        Self {
            token: Mutex::new(token.to_string()),
            base: base.to_string(),
            refreshes: AtomicUsize::new(0),
        }
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenManagerExt for FakeTokenManager {
    async fn ensure_token(&self) -> Result<ActiveToken, BridgeError> {
        Ok(ActiveToken {
            access_token: self.token.lock().unwrap().clone(),
            base: self.base.clone(),
        })
    }

    async fn refresh_token(&self) -> Result<ActiveToken, BridgeError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        let mut token = self.token.lock().unwrap();
        *token = format!("{}-refreshed", token);
        Ok(ActiveToken {
            access_token: token.clone(),
            base: self.base.clone(),
        })
    }
}

/// Exchange double: returns a canned record and counts how often it ran
pub struct CountingExchange {
    record: TokenRecord,
    fetches: AtomicUsize,
}

impl CountingExchange {
    pub fn new(record: TokenRecord) -> Self {
        Self {
            record,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenExchangeExt for CountingExchange {
    async fn fetch_token(&self) -> Result<TokenRecord, BridgeError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.record.clone())
    }
}

/// Exchange double that fails the way a full host sweep does
pub struct FailingExchange;

#[async_trait]
impl TokenExchangeExt for FailingExchange {
    async fn fetch_token(&self) -> Result<TokenRecord, BridgeError> {
        Err(BridgeError::ExchangeError(
            "https://app.cameconnect.net/api: auth-code endpoint returned 403: denied".to_string(),
        ))
    }
}

/// Transport double: answers from a (method, url) table, falls back to a
/// fixed response, and records every call in order
pub struct MapTransport {
    responses: HashMap<(String, String), (u16, String)>,
    fallback: (u16, String),
    calls: Mutex<Vec<(String, String)>>,
}

impl MapTransport {
    pub fn new(fallback_status: u16, fallback_body: &str) -> Self {
        Self {
            responses: HashMap::new(),
            fallback: (fallback_status, fallback_body.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn respond(mut self, method: Method, url: &str, status: u16, body: &str) -> Self {
        self.responses.insert(
            (method.to_string(), url.to_string()),
            (status, body.to_string()),
        );
        self
    }

    pub fn calls_seen(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransportExt for MapTransport {
    async fn execute(
        &self,
        method: Method,
        url: &str,
        _bearer: &str,
        _payload: Option<&Value>,
    ) -> Result<VendorResponse, BridgeError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), url.to_string()));

        let (status, body) = self
            .responses
            .get(&(method.to_string(), url.to_string()))
            .cloned()
            .unwrap_or_else(|| self.fallback.clone());

        Ok(VendorResponse { status, body })
    }
}

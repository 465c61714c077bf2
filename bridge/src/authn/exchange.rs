//! OAuth authorization-code exchange against the vendor cloud

use async_trait::async_trait;
use reqwest::{header, Client};
use secrecy::ExposeSecret;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::form_urlencoded;
use uuid::Uuid;

use crate::app::options::{Credentials, VendorOptions};
use crate::authn::pkce::pkce_pair;
use crate::authn::token::TokenRecord;
use crate::errors::BridgeError;
use crate::utils::snippet;

/// Path of the authorization-code endpoint under an API base
pub const AUTH_CODE_SUFFIX: &str = "/oauth/auth-code";

/// Path of the token endpoint under an API base
pub const TOKEN_SUFFIX: &str = "/oauth/token";

/// Form content type the vendor requires, charset included
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Max characters of an upstream body kept in a failure reason
const REASON_SNIPPET_CHARS: usize = 500;

/// Token exchange trait for testability
#[async_trait]
pub trait TokenExchangeExt: Send + Sync {
    /// Run the full code-then-token exchange, trying each candidate host in
    /// order. The returned record carries the host that worked.
    async fn fetch_token(&self) -> Result<TokenRecord, BridgeError>;
}

/// Token exchange implementation
pub struct TokenExchange {
    client: Client,
    vendor: VendorOptions,
    credentials: Credentials,
}

impl TokenExchange {
    /// Create a new token exchange
    pub fn new(vendor: VendorOptions, credentials: Credentials) -> Result<Self, BridgeError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            vendor,
            credentials,
        })
    }

    /// One complete attempt against a single API base.
    ///
    /// Failure reasons come back as plain strings so the caller can aggregate
    /// them across hosts.
    async fn attempt_host(&self, base: &str) -> Result<TokenRecord, String> {
        let pair = pkce_pair();
        let code = self.request_auth_code(base, &pair.challenge).await?;
        self.exchange_code(base, &code, &pair.verifier).await
    }

    /// First leg: POST credentials to the auth-code endpoint.
    ///
    /// The vendor deviates from plain RFC 6749 here: the resource-owner
    /// credentials travel in the form body while the PKCE challenge and
    /// app identity travel as query parameters, all under Basic auth.
    async fn request_auth_code(&self, base: &str, challenge: &str) -> Result<String, String> {
        let url = format!("{}{}", base, AUTH_CODE_SUFFIX);
        debug!("POST {}", url);

        // The form serializer is not Send, so it must not live across the
        // request await below
        let body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("grant_type", "authorization_code");
            form.append_pair("username", &self.credentials.username);
            form.append_pair("password", self.credentials.password.expose_secret());
            form.append_pair("client_id", &self.credentials.client_id);
            form.finish()
        };

        let state = Uuid::new_v4().simple().to_string();
        let nonce = Uuid::new_v4().simple().to_string();

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .query(&[
                ("client_id", self.credentials.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.vendor.redirect_uri.as_str()),
                ("state", state.as_str()),
                ("nonce", nonce.as_str()),
                ("code_challenge", challenge),
                ("code_challenge_method", "S256"),
            ])
            .body(body)
            .send()
            .await
            .map_err(|e| format!("auth-code request: {}", e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.as_u16() != 200 {
            return Err(format!(
                "auth-code endpoint returned {}: {}",
                status.as_u16(),
                snippet(&text, REASON_SNIPPET_CHARS)
            ));
        }

        let payload: Value = serde_json::from_str(&text)
            .map_err(|e| format!("auth-code response is not JSON: {}", e))?;

        authorization_code(&payload).ok_or_else(|| {
            format!(
                "auth-code response carries no code: {}",
                snippet(&text, REASON_SNIPPET_CHARS)
            )
        })
    }

    /// Second leg: redeem the code for a token record.
    async fn exchange_code(
        &self,
        base: &str,
        code: &str,
        verifier: &str,
    ) -> Result<TokenRecord, String> {
        let url = format!("{}{}", base, TOKEN_SUFFIX);
        debug!("POST {}", url);

        let body = {
            let mut form = form_urlencoded::Serializer::new(String::new());
            form.append_pair("grant_type", "authorization_code");
            form.append_pair("code", code);
            form.append_pair("redirect_uri", &self.vendor.redirect_uri);
            form.append_pair("code_verifier", verifier);
            form.finish()
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(self.credentials.client_secret.expose_secret()),
            )
            .header(header::CONTENT_TYPE, FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| format!("token request: {}", e))?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if status.as_u16() != 200 {
            return Err(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                snippet(&text, REASON_SNIPPET_CHARS)
            ));
        }

        let record: TokenRecord = serde_json::from_str(&text)
            .map_err(|e| format!("token response is not JSON: {}", e))?;

        if !record.is_valid() {
            return Err("token response carries no access_token".to_string());
        }

        Ok(record)
    }
}

#[async_trait]
impl TokenExchangeExt for TokenExchange {
    async fn fetch_token(&self) -> Result<TokenRecord, BridgeError> {
        self.credentials.ensure_complete()?;

        if self.vendor.api_bases.is_empty() {
            return Err(BridgeError::ConfigError(
                "no vendor API base candidates configured".to_string(),
            ));
        }

        let mut failures: Vec<String> = Vec::new();

        for base in &self.vendor.api_bases {
            info!("Attempting OAuth exchange via {}", base);
            match self.attempt_host(base).await {
                Ok(mut record) => {
                    record.base = Some(base.clone());
                    info!("OAuth exchange succeeded via {}", base);
                    return Ok(record);
                }
                Err(reason) => {
                    warn!("OAuth exchange failed via {}: {}", base, reason);
                    failures.push(format!("{}: {}", base, reason));
                }
            }
        }

        Err(BridgeError::ExchangeError(failures.join("; ")))
    }
}

/// Pull the authorization code out of the auth-code response.
///
/// Deployments have been seen answering with any of three key spellings.
fn authorization_code(payload: &Value) -> Option<String> {
    ["code", "authorization_code", "Code"]
        .iter()
        .find_map(|key| {
            payload
                .get(*key)
                .and_then(Value::as_str)
                .filter(|code| !code.is_empty())
                .map(str::to_string)
        })
}

//! Application configuration options

use std::env;

use secrecy::{ExposeSecret, SecretString};

use crate::came;
use crate::errors::BridgeError;
use crate::storage::layout::StorageLayout;

/// Environment variables the vendor credentials load from
pub const ENV_CLIENT_ID: &str = "CAME_CONNECT_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "CAME_CONNECT_CLIENT_SECRET";
pub const ENV_USERNAME: &str = "CAME_CONNECT_USERNAME";
pub const ENV_PASSWORD: &str = "CAME_CONNECT_PASSWORD";

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// HTTP server configuration
    pub server: ServerOptions,

    /// Storage configuration
    pub storage: StorageOptions,

    /// Vendor cloud configuration
    pub vendor: VendorOptions,

    /// Vendor account credentials
    pub credentials: Credentials,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            server: ServerOptions::default(),
            storage: StorageOptions::default(),
            vendor: VendorOptions::default(),
            credentials: Credentials::default(),
        }
    }
}

/// Local HTTP server options
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Storage configuration options
#[derive(Debug, Clone)]
pub struct StorageOptions {
    /// Storage layout paths
    pub layout: StorageLayout,
}

impl Default for StorageOptions {
    fn default() -> Self {
        Self {
            layout: StorageLayout::default(),
        }
    }
}

/// Vendor cloud options
#[derive(Debug, Clone)]
pub struct VendorOptions {
    /// Candidate API base URLs, tried in order during the OAuth exchange
    pub api_bases: Vec<String>,

    /// Redirect URI registered with the vendor's authorization endpoint
    pub redirect_uri: String,
}

impl VendorOptions {
    /// Base used when a stored record predates host binding
    pub fn default_base(&self) -> &str {
        self.api_bases
            .first()
            .map(String::as_str)
            .unwrap_or(came::API_BASE_CANDIDATES[0])
    }
}

impl Default for VendorOptions {
    fn default() -> Self {
        Self {
            api_bases: came::API_BASE_CANDIDATES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            redirect_uri: came::REDIRECT_URI.to_string(),
        }
    }
}

/// Vendor account credentials. Secrets are wrapped so debug output and
/// option dumps stay redacted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: SecretString,
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    /// Load credentials from the environment. Missing variables load as
    /// empty strings; completeness is enforced at exchange time, not here.
    pub fn from_env() -> Self {
        Self {
            client_id: env::var(ENV_CLIENT_ID).unwrap_or_default(),
            client_secret: SecretString::from(env::var(ENV_CLIENT_SECRET).unwrap_or_default()),
            username: env::var(ENV_USERNAME).unwrap_or_default(),
            password: SecretString::from(env::var(ENV_PASSWORD).unwrap_or_default()),
        }
    }

    /// All four values present
    pub fn is_complete(&self) -> bool {
        !self.client_id.is_empty()
            && !self.client_secret.expose_secret().is_empty()
            && !self.username.is_empty()
            && !self.password.expose_secret().is_empty()
    }

    pub fn ensure_complete(&self) -> Result<(), BridgeError> {
        if self.is_complete() {
            Ok(())
        } else {
            Err(BridgeError::ConfigError(format!(
                "missing CAME Connect credentials; set {}, {}, {} and {}",
                ENV_CLIENT_ID, ENV_CLIENT_SECRET, ENV_USERNAME, ENV_PASSWORD
            )))
        }
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: SecretString::from(String::new()),
            username: String::new(),
            password: SecretString::from(String::new()),
        }
    }
}

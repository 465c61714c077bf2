//! Settings file management

use serde::{Deserialize, Serialize};

use crate::came;
use crate::logs::LogLevel;

/// Bridge settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Write daily-rotated log files under the storage layout's logs directory
    #[serde(default)]
    pub log_to_file: bool,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSettings,

    /// Vendor cloud configuration
    #[serde(default)]
    pub vendor: VendorSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            log_to_file: false,
            server: ServerSettings::default(),
            vendor: VendorSettings::default(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Bind host
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_server_port")]
    pub port: u16,
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

/// Vendor cloud settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorSettings {
    /// Candidate API base URLs, tried in order during the OAuth exchange
    #[serde(default = "default_api_bases")]
    pub api_bases: Vec<String>,

    /// Redirect URI registered with the vendor's authorization endpoint
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
}

fn default_api_bases() -> Vec<String> {
    came::API_BASE_CANDIDATES
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_redirect_uri() -> String {
    came::REDIRECT_URI.to_string()
}

impl Default for VendorSettings {
    fn default() -> Self {
        Self {
            api_bases: default_api_bases(),
            redirect_uri: default_redirect_uri(),
        }
    }
}

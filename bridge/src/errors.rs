//! Error types for the Gatelink bridge

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// One vendor call attempt, kept so gateway failures can report what was tried last.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptRecord {
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl fmt::Display for AttemptRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)?;
        if let Some(status) = self.status {
            write!(f, " -> {}", status)?;
        }
        if let Some(error) = &self.error {
            write!(f, " ({})", error)?;
        }
        Ok(())
    }
}

/// Main error type for the bridge
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("OAuth exchange failed on all hosts: {0}")]
    ExchangeError(String),

    #[error("Upstream call failed: {0}")]
    UpstreamError(AttemptRecord),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for BridgeError {
    fn from(err: anyhow::Error) -> Self {
        BridgeError::Internal(err.to_string())
    }
}

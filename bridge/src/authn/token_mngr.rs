//! Token manager for vendor authentication

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::authn::exchange::TokenExchangeExt;
use crate::authn::token::TokenRecord;
use crate::errors::BridgeError;
use crate::filesys::file::File;

/// A token resolved for immediate use: the bearer value plus the API base
/// every vendor URL must be built against.
#[derive(Debug, Clone)]
pub struct ActiveToken {
    pub access_token: String,
    pub base: String,
}

/// Token manager trait for testability
#[async_trait]
pub trait TokenManagerExt: Send + Sync {
    /// Return a usable token, running the exchange only when neither the
    /// cache nor the store has one.
    async fn ensure_token(&self) -> Result<ActiveToken, BridgeError>;

    /// Force a fresh exchange and replace the stored record.
    async fn refresh_token(&self) -> Result<ActiveToken, BridgeError>;
}

/// Token manager implementation
pub struct TokenManager {
    token_file: Arc<File>,
    exchange: Arc<dyn TokenExchangeExt>,
    default_base: String,
    cached_record: RwLock<Option<TokenRecord>>,
}

impl TokenManager {
    /// Create a new token manager
    pub fn new(
        token_file: Arc<File>,
        exchange: Arc<dyn TokenExchangeExt>,
        default_base: String,
    ) -> Self {
        Self {
            token_file,
            exchange,
            default_base,
            cached_record: RwLock::new(None),
        }
    }

    /// Load the record from the store. Absent or unreadable files both mean
    /// "no token yet".
    async fn load_record(&self) -> Option<TokenRecord> {
        match self.token_file.read_json::<TokenRecord>().await {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("No stored token record: {}", e);
                None
            }
        }
    }

    /// Persist the record. A write failure is logged and swallowed so a
    /// read-only data directory cannot take the bridge down.
    async fn persist_record(&self, record: &TokenRecord) {
        let result = async {
            let contents = serde_json::to_vec_pretty(record)?;
            self.token_file.write_atomic(&contents).await
        }
        .await;

        if let Err(e) = result {
            warn!("Failed to persist token record: {}", e);
        }
    }

    fn active(&self, record: &TokenRecord) -> ActiveToken {
        ActiveToken {
            access_token: record.access_token.clone(),
            // An empty bound base counts as unbound
            base: record
                .base
                .clone()
                .filter(|base| !base.is_empty())
                .unwrap_or_else(|| self.default_base.clone()),
        }
    }

    /// Exchange, persist, cache.
    async fn obtain(&self) -> Result<ActiveToken, BridgeError> {
        let record = self.exchange.fetch_token().await?;
        self.persist_record(&record).await;

        let active = self.active(&record);
        let mut cached = self.cached_record.write().await;
        *cached = Some(record);

        Ok(active)
    }
}

#[async_trait]
impl TokenManagerExt for TokenManager {
    async fn ensure_token(&self) -> Result<ActiveToken, BridgeError> {
        // Try the cache first
        {
            let cached = self.cached_record.read().await;
            if let Some(record) = cached.as_ref() {
                if record.is_valid() {
                    return Ok(self.active(record));
                }
            }
        }

        // Then the store
        if let Some(record) = self.load_record().await {
            if record.is_valid() {
                let active = self.active(&record);
                let mut cached = self.cached_record.write().await;
                *cached = Some(record);
                return Ok(active);
            }
        }

        // Nothing usable anywhere: run the exchange
        self.obtain().await
    }

    async fn refresh_token(&self) -> Result<ActiveToken, BridgeError> {
        info!("Refreshing vendor token...");
        self.obtain().await
    }
}

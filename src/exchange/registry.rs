//! Exchange client registry
//!
//! One shared client handle per configured exchange id, constructed once at
//! run start and immutable afterwards. The registry is an explicit lookup
//! table owned by the run, passed by handle into each partition's execution
//! context; it is not ambient global state.

use super::client::ExchangeClient;
use super::rest::{RestExchange, RestExchangeConfig};
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// Base endpoints for exchanges with a klines-compatible REST API
///
/// Resolving an id to its driver goes through this table, never through
/// runtime reflection over the id string.
const DRIVERS: &[(&str, &str)] = &[
    ("binance", "https://api.binance.com"),
    ("binanceus", "https://api.binance.us"),
    ("mexc", "https://api.mexc.com"),
];

/// Immutable-after-init map from exchange id to a shared client handle
pub struct ExchangeRegistry {
    clients: HashMap<String, Arc<dyn ExchangeClient>>,
}

impl ExchangeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }

    /// Build the registry from configuration
    ///
    /// Exchanges without a known driver are left unregistered; their
    /// partitions fail individually at `resolve` time instead of aborting
    /// the whole run.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        let mut registry = Self::new();

        for exchange in &config.exchanges {
            let Some(base_url) = driver_base_url(&exchange.id) else {
                warn!(exchange = %exchange.id, "no driver for exchange, its partitions will fail");
                continue;
            };

            let client = RestExchange::new(RestExchangeConfig {
                id: exchange.id.clone(),
                base_url: base_url.to_string(),
                api_key: exchange.api_key.clone(),
                secret: exchange.secret.clone(),
                ..RestExchangeConfig::default()
            })?;
            registry.register(Arc::new(client));
        }

        Ok(registry)
    }

    /// Register a client under its own id
    ///
    /// Replaces any previous handle for the same id.
    pub fn register(&mut self, client: Arc<dyn ExchangeClient>) {
        self.clients.insert(client.id().to_string(), client);
    }

    /// Resolve an exchange id to its shared client handle
    pub fn resolve(&self, id: &str) -> Result<Arc<dyn ExchangeClient>> {
        self.clients
            .get(id)
            .cloned()
            .ok_or_else(|| Error::unknown_exchange(id))
    }

    /// Registered exchange ids
    pub fn ids(&self) -> Vec<&str> {
        self.clients.keys().map(String::as_str).collect()
    }

    /// Number of registered clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Check whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

impl Default for ExchangeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExchangeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExchangeRegistry")
            .field("ids", &self.ids())
            .finish()
    }
}

/// Look up the REST base URL for an exchange id
fn driver_base_url(id: &str) -> Option<&'static str> {
    DRIVERS
        .iter()
        .find(|(driver_id, _)| *driver_id == id)
        .map(|(_, url)| *url)
}

//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::SubscribeConfig;
use crate::middleware::CorsPolicy;
use crate::shopify::{AdminClient, ShopifyError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Everything inside is read-only after start-up.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SubscribeConfig,
    cors: CorsPolicy,
    shopify: AdminClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shopify client cannot be built from the config.
    pub fn new(config: SubscribeConfig) -> Result<Self, ShopifyError> {
        let shopify = AdminClient::new(&config.shopify)?;
        let cors = CorsPolicy::new(config.allowed_origins.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                cors,
                shopify,
            }),
        })
    }

    /// Get a reference to the service configuration.
    #[must_use]
    pub fn config(&self) -> &SubscribeConfig {
        &self.inner.config
    }

    /// Get a reference to the CORS policy.
    #[must_use]
    pub fn cors(&self) -> &CorsPolicy {
        &self.inner.cors
    }

    /// Get a reference to the Shopify Admin API client.
    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }
}

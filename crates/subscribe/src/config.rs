//! Service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE_DOMAIN` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_TOKEN` - Admin API access token
//!
//! ## Optional
//! - `ALLOWED_ORIGINS` - Comma-separated CORS allow-list (default: any origin)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2024-07)
//! - `SHOPIFY_API` - `rest` or `graphql` (default: rest)
//! - `SHOPIFY_ADMIN_BASE_URL` - Override for `https://{SHOPIFY_STORE_DOMAIN}`
//! - `SUBSCRIBE_HOST` - Bind address (default: 0.0.0.0)
//! - `SUBSCRIBE_PORT` - Listen port (default: 3000)
//! - `SUBSCRIBE_MARKER_TAG` - Tag that marks signups (default: Suscripción MixPerfume)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Sentry traces sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use mixperfume_core::SUBSCRIPTION_TAG;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_API_VERSION: &str = "2024-07";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Subscription endpoint configuration.
#[derive(Debug, Clone)]
pub struct SubscribeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Origins allowed to post the signup form (empty = any origin)
    pub allowed_origins: Vec<String>,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Marker tag added to every signup
    pub marker_tag: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Which Admin API dialect to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShopifyApi {
    /// REST: create, then search and update on conflict.
    #[default]
    Rest,
    /// GraphQL: `customerCreate`, then `customers` and `customerUpdate` on conflict.
    GraphQl,
}

impl FromStr for ShopifyApi {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rest" => Ok(Self::Rest),
            "graphql" => Ok(Self::GraphQl),
            other => Err(format!("expected 'rest' or 'graphql', got '{other}'")),
        }
    }
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store_domain: String,
    /// Admin API access token
    pub admin_token: SecretString,
    /// Admin API version (e.g., 2024-07)
    pub api_version: String,
    /// API dialect used for customer upserts
    pub api: ShopifyApi,
    /// Base URL the Admin API paths are joined onto
    pub base_url: Url,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store_domain", &self.store_domain)
            .field("admin_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("api", &self.api)
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

impl SubscribeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("SUBSCRIBE_HOST", "0.0.0.0")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("SUBSCRIBE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("SUBSCRIBE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("SUBSCRIBE_PORT".to_string(), e.to_string()))?;
        let allowed_origins = parse_origin_list(&get_env_or_default("ALLOWED_ORIGINS", ""));
        let shopify = ShopifyAdminConfig::from_env()?;
        let marker_tag = get_optional_env("SUBSCRIBE_MARKER_TAG")
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| SUBSCRIPTION_TAG.to_string());
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            host,
            port,
            allowed_origins,
            shopify,
            marker_tag,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl ShopifyAdminConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let store_domain = get_required_env("SHOPIFY_STORE_DOMAIN")?;
        let admin_token = SecretString::from(get_required_env("SHOPIFY_ADMIN_TOKEN")?);
        let api_version = get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION);
        let api = get_env_or_default("SHOPIFY_API", "rest")
            .parse::<ShopifyApi>()
            .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_API".to_string(), e))?;
        let base_url = match get_optional_env("SHOPIFY_ADMIN_BASE_URL") {
            Some(url) => parse_base_url("SHOPIFY_ADMIN_BASE_URL", &url)?,
            None => parse_base_url("SHOPIFY_STORE_DOMAIN", &format!("https://{store_domain}"))?,
        };

        Ok(Self {
            store_domain,
            admin_token,
            api_version,
            api,
            base_url,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Split a comma-separated origin list, dropping blank entries.
#[must_use]
pub fn parse_origin_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a base URL, ending its path with `/` so joins keep any prefix.
fn parse_base_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let mut url =
        Url::parse(raw).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origin_list() {
        assert_eq!(
            parse_origin_list(" https://a.com ,https://b.com,, "),
            vec!["https://a.com", "https://b.com"]
        );
        assert!(parse_origin_list("").is_empty());
        assert!(parse_origin_list(" , ").is_empty());
    }

    #[test]
    fn test_shopify_api_from_str() {
        assert_eq!("rest".parse::<ShopifyApi>().unwrap(), ShopifyApi::Rest);
        assert_eq!(" GraphQL ".parse::<ShopifyApi>().unwrap(), ShopifyApi::GraphQl);
        assert!("soap".parse::<ShopifyApi>().is_err());
    }

    #[test]
    fn test_parse_base_url() {
        let url = parse_base_url("K", "https://store.myshopify.com").unwrap();
        assert_eq!(url.as_str(), "https://store.myshopify.com/");

        let url = parse_base_url("K", "https://proxy.example/shopify").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/shopify/");

        let url = parse_base_url("K", "https://proxy.example/shopify/").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example/shopify/");

        let err = parse_base_url("K", "not a url").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "K"));
    }

    #[test]
    fn test_socket_addr() {
        let config = SubscribeConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            allowed_origins: vec![],
            shopify: ShopifyAdminConfig {
                store_domain: "test.myshopify.com".to_string(),
                admin_token: SecretString::from("shpat_test"),
                api_version: "2024-07".to_string(),
                api: ShopifyApi::Rest,
                base_url: Url::parse("https://test.myshopify.com").unwrap(),
            },
            marker_tag: SUBSCRIPTION_TAG.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_shopify_config_debug_redacts_token() {
        let config = ShopifyAdminConfig {
            store_domain: "test.myshopify.com".to_string(),
            admin_token: SecretString::from("shpat_super_secret_admin_token"),
            api_version: "2024-07".to_string(),
            api: ShopifyApi::GraphQl,
            base_url: Url::parse("https://test.myshopify.com").unwrap(),
        };

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("GraphQl"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_secret_admin_token"));
    }
}

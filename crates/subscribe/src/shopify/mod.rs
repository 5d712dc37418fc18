//! Shopify Admin API customer clients (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Shopify Admin API token.** It can read and write
//! every customer in the store; the token never leaves the server and is
//! never logged.
//!
//! # Architecture
//!
//! The upsert flow needs three customer operations: create, search by
//! email, and update. [`CustomerStore`] describes them once, and two
//! transports implement it:
//! - [`RestClient`] - `customers.json`, `customers/search.json`, `customers/{id}.json`
//! - [`GraphQlClient`] - `customerCreate`, `customers`, `customerUpdate`
//!
//! [`AdminClient`] picks one from configuration. Each operation issues
//! exactly one HTTP request and never retries.
//!
//! # Example
//!
//! ```rust,ignore
//! use mixperfume_subscribe::shopify::{AdminClient, CustomerStore};
//!
//! let client = AdminClient::new(&config.shopify)?;
//! let outcome = client.create_customer(&payload).await?;
//! ```

mod conflict;
mod graphql;
mod rest;
pub mod types;

use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use thiserror::Error;
use url::Url;

use crate::config::{ShopifyAdminConfig, ShopifyApi};

pub use conflict::{detect_graphql_conflict, detect_rest_conflict, mentions_email_taken};
pub use graphql::GraphQlClient;
pub use rest::RestClient;
pub use types::*;

/// Header carrying the Admin API access token.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Errors that can occur when talking to the Shopify Admin API.
///
/// These are transport-level failures. Answers from Shopify, including
/// error statuses, are reported through the outcome types instead.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The access token is not a valid header value.
    #[error("Invalid access token format")]
    InvalidToken,
}

/// Customer operations the upsert flow needs from Shopify.
///
/// Every method performs exactly one HTTP request.
pub trait CustomerStore: Send + Sync {
    /// Create a customer.
    fn create_customer(
        &self,
        payload: &CustomerPayload,
    ) -> impl Future<Output = Result<CreateOutcome, ShopifyError>> + Send;

    /// Find a customer by exact email.
    fn find_customer_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<LookupOutcome, ShopifyError>> + Send;

    /// Overwrite a customer's contact fields, address and tags.
    fn update_customer(
        &self,
        id: &str,
        payload: &CustomerPayload,
    ) -> impl Future<Output = Result<UpdateOutcome, ShopifyError>> + Send;
}

/// Shopify Admin API client, REST or GraphQL per configuration.
#[derive(Clone)]
pub enum AdminClient {
    Rest(RestClient),
    GraphQl(GraphQlClient),
}

impl AdminClient {
    /// Create the client selected by `config.api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is not a valid header value or
    /// the HTTP client fails to build.
    pub fn new(config: &ShopifyAdminConfig) -> Result<Self, ShopifyError> {
        let http = build_http_client(config)?;
        Ok(match config.api {
            ShopifyApi::Rest => Self::Rest(RestClient::new(http, config)),
            ShopifyApi::GraphQl => Self::GraphQl(GraphQlClient::new(http, config)?),
        })
    }
}

impl CustomerStore for AdminClient {
    async fn create_customer(
        &self,
        payload: &CustomerPayload,
    ) -> Result<CreateOutcome, ShopifyError> {
        match self {
            Self::Rest(client) => client.create_customer(payload).await,
            Self::GraphQl(client) => client.create_customer(payload).await,
        }
    }

    async fn find_customer_by_email(&self, email: &str) -> Result<LookupOutcome, ShopifyError> {
        match self {
            Self::Rest(client) => client.find_customer_by_email(email).await,
            Self::GraphQl(client) => client.find_customer_by_email(email).await,
        }
    }

    async fn update_customer(
        &self,
        id: &str,
        payload: &CustomerPayload,
    ) -> Result<UpdateOutcome, ShopifyError> {
        match self {
            Self::Rest(client) => client.update_customer(id, payload).await,
            Self::GraphQl(client) => client.update_customer(id, payload).await,
        }
    }
}

/// Build a `reqwest` client that sends the access token on every request.
fn build_http_client(config: &ShopifyAdminConfig) -> Result<reqwest::Client, ShopifyError> {
    let mut headers = HeaderMap::new();

    let mut token = HeaderValue::from_str(config.admin_token.expose_secret())
        .map_err(|_| ShopifyError::InvalidToken)?;
    token.set_sensitive(true);
    headers.insert(ACCESS_TOKEN_HEADER, token);

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .build()?)
}

/// Join an Admin API path onto the configured base URL.
fn admin_url(base_url: &Url, api_version: &str, path: &str) -> Result<Url, ShopifyError> {
    Ok(base_url.join(&format!("admin/api/{api_version}/{path}"))?)
}

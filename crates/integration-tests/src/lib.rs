//! Integration tests for the MixPerfume subscription endpoint.
//!
//! Each test runs the real router on a local port with `wiremock` standing
//! in for the Shopify Admin API, so outbound calls can be counted and no
//! real store is touched.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mixperfume-integration-tests
//! ```

use std::net::SocketAddr;

use mixperfume_core::SUBSCRIPTION_TAG;
use mixperfume_subscribe::{
    app,
    config::{ShopifyAdminConfig, ShopifyApi, SubscribeConfig},
    state::AppState,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use url::Url;
use wiremock::MockServer;

/// Admin API version used by every test.
pub const API_VERSION: &str = "2024-07";

/// Origin allowed by default test apps.
pub const STOREFRONT_ORIGIN: &str = "https://mixperfume.com.ar";

/// A running subscription service wired to a mock Shopify.
pub struct TestContext {
    pub shopify: MockServer,
    pub client: reqwest::Client,
    addr: SocketAddr,
}

impl TestContext {
    /// Start a service using the given transport and allowed origins.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be started.
    pub async fn start(api: ShopifyApi, allowed_origins: &[&str]) -> Self {
        let shopify = MockServer::start().await;
        let base_url = Url::parse(&shopify.uri()).expect("valid mock server URL");
        Self::launch(shopify, base_url, api, allowed_origins).await
    }

    /// Start a service whose Shopify base URL refuses connections.
    ///
    /// # Panics
    ///
    /// Panics if the service cannot be started.
    pub async fn unreachable(api: ShopifyApi) -> Self {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind a free port");
        let port = closed.local_addr().expect("listener has an address").port();
        drop(closed);

        let base_url = Url::parse(&format!("http://127.0.0.1:{port}")).expect("valid URL");
        Self::launch(MockServer::start().await, base_url, api, &[STOREFRONT_ORIGIN]).await
    }

    async fn launch(
        shopify: MockServer,
        base_url: Url,
        api: ShopifyApi,
        allowed_origins: &[&str],
    ) -> Self {
        let config = SubscribeConfig {
            host: "127.0.0.1".parse().expect("valid host"),
            port: 0,
            allowed_origins: allowed_origins.iter().map(ToString::to_string).collect(),
            shopify: ShopifyAdminConfig {
                store_domain: "mixperfume-test.myshopify.com".to_string(),
                admin_token: SecretString::from("shpat_test_token"),
                api_version: API_VERSION.to_string(),
                api,
                base_url,
            },
            marker_tag: SUBSCRIPTION_TAG.to_string(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let state = AppState::new(config).expect("Failed to build application state");
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener has an address");

        tokio::spawn(async move {
            axum::serve(listener, app(state))
                .await
                .expect("Test server error");
        });

        Self {
            shopify,
            client: reqwest::Client::new(),
            addr,
        }
    }

    /// Start a REST-backed service with the default allowed origin.
    pub async fn rest() -> Self {
        Self::start(ShopifyApi::Rest, &[STOREFRONT_ORIGIN]).await
    }

    /// Start a GraphQL-backed service with the default allowed origin.
    pub async fn graphql() -> Self {
        Self::start(ShopifyApi::GraphQl, &[STOREFRONT_ORIGIN]).await
    }

    /// URL of a path on the service under test.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Post a signup from the allowed storefront origin.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be sent.
    pub async fn subscribe(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url("/api/subscribe-capture"))
            .header("Origin", STOREFRONT_ORIGIN)
            .json(body)
            .send()
            .await
            .expect("Failed to post signup")
    }

    /// Number of requests Shopify received so far.
    pub async fn shopify_calls(&self) -> usize {
        self.shopify
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }
}

/// Admin API path for a REST resource.
#[must_use]
pub fn rest_path(resource: &str) -> String {
    format!("/admin/api/{API_VERSION}/{resource}")
}

/// Admin API GraphQL endpoint path.
#[must_use]
pub fn graphql_path() -> String {
    rest_path("graphql.json")
}

/// A complete, valid signup form.
#[must_use]
pub fn signup() -> Value {
    json!({
        "email": "ana@example.com",
        "firstName": "Ana",
        "lastName": "García",
        "phone": "11 2345-6789",
        "address1": "Av. Corrientes 1234",
        "address2": "3B",
        "city": "Buenos Aires",
        "province": "CABA",
        "zip": "C1043",
        "plan": "Mensual",
        "categoria": "Nicho",
        "price": "25000"
    })
}

/// `signup()` with one field removed.
#[must_use]
pub fn signup_without(field: &str) -> Value {
    let mut body = signup();
    if let Some(object) = body.as_object_mut() {
        object.remove(field);
    }
    body
}

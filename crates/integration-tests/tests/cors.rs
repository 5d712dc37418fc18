//! Origin allow-list and preflight handling over a real socket.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use mixperfume_integration_tests::{STOREFRONT_ORIGIN, TestContext, signup};
use mixperfume_subscribe::config::ShopifyApi;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use wiremock::matchers::any;
use wiremock::{Mock, ResponseTemplate};

async fn expect_no_shopify_calls(ctx: &TestContext) {
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&ctx.shopify)
        .await;
}

#[tokio::test]
async fn preflight_returns_empty_ok_with_cors_headers() {
    let ctx = TestContext::rest().await;
    expect_no_shopify_calls(&ctx).await;

    for path in ["/api/subscribe-capture", "/does/not/exist"] {
        let response = ctx
            .client
            .request(Method::OPTIONS, ctx.url(path))
            .header("Origin", STOREFRONT_ORIGIN)
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers["access-control-allow-origin"], STOREFRONT_ORIGIN);
        assert_eq!(headers["vary"], "Origin");
        assert_eq!(headers["access-control-allow-methods"], "POST,OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert!(response.bytes().await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn unknown_origin_is_forbidden_with_first_allowed_origin() {
    let ctx = TestContext::start(
        ShopifyApi::Rest,
        &["https://mixperfume.com.ar", "https://www.mixperfume.com.ar"],
    )
    .await;
    expect_no_shopify_calls(&ctx).await;

    let response = ctx
        .client
        .post(ctx.url("/api/subscribe-capture"))
        .header("Origin", "https://evil.example")
        .json(&signup())
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://mixperfume.com.ar"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Forbidden origin (CORS)");
}

#[tokio::test]
async fn empty_allow_list_accepts_any_origin() {
    let ctx = TestContext::start(ShopifyApi::Rest, &[]).await;

    let response = ctx
        .client
        .get(ctx.url("/api/subscribe-capture"))
        .header("Origin", "https://anywhere.example")
        .send()
        .await
        .unwrap();

    // Origin passes, method does not
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://anywhere.example"
    );
}

#[tokio::test]
async fn health_is_outside_cors() {
    let ctx = TestContext::rest().await;

    let response = ctx
        .client
        .get(ctx.url("/health"))
        .header("Origin", "https://evil.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

//! HTTP route handlers for the subscription endpoint.
//!
//! # Route Structure
//!
//! ```text
//! POST    /api/subscribe-capture  - Capture a signup, upsert the customer
//! OPTIONS *                       - CORS preflight (answered by middleware)
//! GET     /health                 - Health check (no CORS)
//! ```
//!
//! Other methods on the capture route get 405; unknown paths get 404.

pub mod subscribe;

use axum::{Router, routing::post};

use crate::state::AppState;

/// Path of the signup capture endpoint.
pub const SUBSCRIBE_PATH: &str = "/api/subscribe-capture";

/// Create the signup routes router.
pub fn subscribe_routes() -> Router<AppState> {
    Router::new()
        .route(
            SUBSCRIBE_PATH,
            post(subscribe::subscribe_capture).fallback(subscribe::method_not_allowed),
        )
        .fallback(subscribe::not_found)
}

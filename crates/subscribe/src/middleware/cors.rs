//! Origin allow-list check and CORS response headers.
//!
//! Every response passing through the middleware carries:
//! - `Access-Control-Allow-Origin` - the request origin when allowed,
//!   otherwise the first allowed origin (or `*` with an empty list)
//! - `Vary: Origin`
//! - `Access-Control-Allow-Methods: POST,OPTIONS`
//! - `Access-Control-Allow-Headers: Content-Type`
//!
//! Preflight `OPTIONS` requests are answered here with 200 and no body,
//! whatever the path. Disallowed origins get 403 before any handler runs.

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, Method, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN, VARY,
        },
    },
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Origins allowed to call the endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

/// Outcome of checking one request origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsDecision {
    pub allowed: bool,
    /// Value for `Access-Control-Allow-Origin`.
    pub allow_origin: String,
}

impl CorsPolicy {
    /// An empty list allows any origin.
    #[must_use]
    pub const fn new(allowed_origins: Vec<String>) -> Self {
        Self { allowed_origins }
    }

    /// Decide whether `origin` (empty when the header is absent) may call.
    #[must_use]
    pub fn decide(&self, origin: &str) -> CorsDecision {
        let allowed =
            self.allowed_origins.is_empty() || self.allowed_origins.iter().any(|o| o == origin);

        let allow_origin = if allowed {
            origin.to_string()
        } else {
            self.allowed_origins
                .first()
                .cloned()
                .unwrap_or_else(|| "*".to_string())
        };

        CorsDecision {
            allowed,
            allow_origin,
        }
    }
}

impl CorsDecision {
    fn apply(&self, headers: &mut HeaderMap) {
        if let Ok(value) = HeaderValue::from_str(&self.allow_origin) {
            headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        }
        headers.insert(VARY, HeaderValue::from_static("Origin"));
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST,OPTIONS"),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        );
    }
}

/// Apply the CORS policy to every request.
pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let decision = policy.decide(&origin);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else if decision.allowed {
        next.run(request).await
    } else {
        tracing::warn!(origin = %origin, "Rejected request from disallowed origin");
        AppError::ForbiddenOrigin.into_response()
    };

    decision.apply(response.headers_mut());
    response
}

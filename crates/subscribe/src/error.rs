//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Server errors are captured to
//! Sentry before the response is rendered. Reconciliation failures echo the
//! upstream exchange back to the caller, since the endpoint is only called by
//! our own storefront form.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use mixperfume_core::ValidationError;
use serde_json::{Value, json};
use thiserror::Error;

use crate::services::ReconcileError;

/// Application-level error type for the subscription endpoint.
#[derive(Debug, Error)]
pub enum AppError {
    /// Origin is not on the allow-list.
    #[error("Forbidden origin (CORS)")]
    ForbiddenOrigin,

    /// Only POST is served.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// No such route.
    #[error("Not found")]
    NotFound,

    /// Body is not JSON.
    #[error("Invalid JSON body")]
    InvalidBody(#[source] serde_json::Error),

    /// Required form fields are missing.
    #[error("Missing required fields")]
    Validation(#[from] ValidationError),

    /// Upsert in Shopify failed.
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::ForbiddenOrigin => StatusCode::FORBIDDEN,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidBody(_)
            | Self::Validation(_)
            | Self::Reconcile(ReconcileError::Rejected(_)) => StatusCode::BAD_REQUEST,
            Self::Reconcile(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> Value {
        match self {
            Self::Validation(ValidationError::MissingFields(fields)) => json!({
                "error": self.to_string(),
                "fields": fields,
            }),
            Self::Reconcile(err) => match err {
                ReconcileError::Rejected(user_errors) => json!({ "error": user_errors }),
                ReconcileError::CreateFailed(exchange)
                | ReconcileError::CustomerNotFound(exchange)
                | ReconcileError::UpdateFailed(exchange) => json!({
                    "error": err.to_string(),
                    "request": exchange.request,
                    "response": exchange.response,
                }),
                ReconcileError::Transport(source) => json!({
                    "error": "Shopify request failed",
                    "detail": source.to_string(),
                }),
            },
            _ => json!({ "error": self.to_string() }),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        (status, Json(self.body())).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

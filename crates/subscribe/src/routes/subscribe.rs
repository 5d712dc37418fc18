//! Subscription signup capture.
//!
//! Validates the storefront's signup form, builds the Shopify customer
//! payload and upserts it by email.

use axum::{Json, body::Bytes, extract::State};
use chrono::Utc;
use mixperfume_core::SubscriptionRequest;
use serde::Serialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::services::{UpsertAction, upsert_customer};
use crate::shopify::{CustomerPayload, CustomerSummary};
use crate::state::AppState;

/// Body of a successful signup.
#[derive(Debug, Serialize)]
pub struct SubscribeResponse {
    pub ok: bool,
    pub action: UpsertAction,
    pub customer: CustomerSummary,
}

/// Capture a signup and upsert it as a Shopify customer.
///
/// The body is parsed leniently; missing required fields are rejected
/// before any call to Shopify is made.
#[instrument(skip_all, fields(email))]
pub async fn subscribe_capture(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<SubscribeResponse>> {
    let subscription = SubscriptionRequest::from_json(&body)
        .map_err(AppError::InvalidBody)?
        .validate()?;
    tracing::Span::current().record("email", subscription.email.as_str());

    let payload =
        CustomerPayload::from_subscription(&subscription, &state.config().marker_tag, Utc::now());
    if !payload.province_resolved() {
        tracing::debug!(
            province = %payload.address.province,
            country = %payload.address.country_code,
            "Province passed through unmapped"
        );
    }

    let upserted = upsert_customer(state.shopify(), &payload).await?;
    tracing::info!(action = ?upserted.action, customer_id = %upserted.customer.id, "Signup captured");

    Ok(Json(SubscribeResponse {
        ok: true,
        action: upserted.action,
        customer: upserted.customer,
    }))
}

/// Any method other than POST on the capture route.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Unknown paths.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

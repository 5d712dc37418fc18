//! Create-or-update of a signup in Shopify, keyed by email.
//!
//! ```text
//! create ──201──────────────────────────────▶ Created
//!   │ email taken
//!   ▼
//! search by email ──none──▶ CustomerNotFound
//!   │ found
//!   ▼
//! update (merged tags) ──200/201────────────▶ Updated
//! ```
//!
//! Every step is a single upstream call and nothing is retried.

use mixperfume_core::{join_tags, merge_tags, split_tags};
use serde::Serialize;
use thiserror::Error;

use crate::shopify::{
    CreateOutcome, CustomerPayload, CustomerStore, CustomerSummary, Exchange, LookupOutcome,
    ShopifyError, UpdateOutcome, UserError,
};

/// Which branch produced the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertAction {
    Created,
    Updated,
}

/// Successful upsert result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub action: UpsertAction,
    pub customer: CustomerSummary,
}

/// Terminal failures of the upsert flow.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Shopify refused the input with field-level errors.
    #[error("Shopify rejected the customer ({} field errors)", .0.len())]
    Rejected(Vec<UserError>),

    /// Create failed without an email conflict.
    #[error("Customer create failed")]
    CreateFailed(Exchange),

    /// Email was reported taken but the customer could not be found.
    #[error("Existing customer not found")]
    CustomerNotFound(Exchange),

    /// Update of the existing customer failed.
    #[error("Customer update failed")]
    UpdateFailed(Exchange),

    /// The request never got a response.
    #[error("Shopify request failed: {0}")]
    Transport(#[from] ShopifyError),
}

/// Create the customer, or update the existing one when the email is taken.
///
/// # Errors
///
/// Returns `ReconcileError` describing the step that failed, with the
/// upstream exchange attached where there is one.
#[tracing::instrument(skip_all, fields(email = %payload.email))]
pub async fn upsert_customer<S: CustomerStore>(
    store: &S,
    payload: &CustomerPayload,
) -> Result<Upserted, ReconcileError> {
    let conflict = match store.create_customer(payload).await? {
        CreateOutcome::Created(customer) => {
            return Ok(Upserted {
                action: UpsertAction::Created,
                customer,
            });
        }
        CreateOutcome::Conflict(conflict) => conflict,
        CreateOutcome::Rejected(errors) => return Err(ReconcileError::Rejected(errors)),
        CreateOutcome::Failed(exchange) => return Err(ReconcileError::CreateFailed(exchange)),
    };

    tracing::info!(detection = ?conflict.detection, "Email taken, updating existing customer");

    let existing = match store.find_customer_by_email(&payload.email).await? {
        LookupOutcome::Found(existing) => existing,
        LookupOutcome::NotFound(exchange) => {
            tracing::warn!("Conflicting customer could not be found");
            return Err(ReconcileError::CustomerNotFound(exchange));
        }
    };

    let merged = merge_tags(&existing.tags, &join_tags(&payload.tags));
    let update = payload.with_tags(split_tags(&merged).map(String::from).collect());

    match store.update_customer(&existing.id, &update).await? {
        UpdateOutcome::Updated(customer) => Ok(Upserted {
            action: UpsertAction::Updated,
            customer,
        }),
        UpdateOutcome::Rejected(errors) => Err(ReconcileError::Rejected(errors)),
        UpdateOutcome::Failed(exchange) => Err(ReconcileError::UpdateFailed(exchange)),
    }
}

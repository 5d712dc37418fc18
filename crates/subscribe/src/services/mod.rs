//! Business logic services for the subscription endpoint.
//!
//! - `reconciler` - Create-or-update of a signup as a Shopify customer

pub mod reconciler;

pub use reconciler::{ReconcileError, UpsertAction, Upserted, upsert_customer};

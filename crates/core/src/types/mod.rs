//! Core types for the subscription capture endpoint.
//!
//! This module provides type-safe wrappers for the signup form and the
//! values derived from it.

pub mod annotation;
pub mod phone;
pub mod province;
pub mod request;

pub use annotation::{
    SUBSCRIPTION_TAG, compose_note, compose_tags, join_tags, merge_tags, split_tags,
};
pub use phone::{NormalizedPhone, normalize_phone};
pub use province::{ARGENTINA, Province, ProvinceField, ProvinceTable, resolve_province};
pub use request::{DEFAULT_COUNTRY, Subscription, SubscriptionRequest, ValidationError};

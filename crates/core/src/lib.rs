//! `MixPerfume` Core - Domain types for the subscription capture endpoint.
//!
//! This crate holds everything the signup endpoint decides locally, before
//! and after talking to Shopify:
//! - Required-field validation of the signup form
//! - Phone normalization to the Argentine `+54` convention
//! - Province name to Shopify province code mapping
//! - Customer tag and note composition, and tag merging on update
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no environment access. The `subscribe` crate wires these into
//! the HTTP service.
//!
//! # Modules
//!
//! - [`types`] - Request, phone, province and annotation types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;

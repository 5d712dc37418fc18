//! HTTP middleware for the subscription endpoint.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (origin allow-list, preflight)

pub mod cors;

pub use cors::{CorsDecision, CorsPolicy, cors_middleware};

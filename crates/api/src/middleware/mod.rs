//! HTTP middleware and extractors.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP context)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! The bearer-token guard is an extractor ([`CurrentUser`]) rather than a
//! layer, so only handlers that ask for it are protected.

pub mod auth;
pub mod request_id;

pub use auth::{CurrentUser, bearer_token};
pub use request_id::request_id_middleware;

//! HTTP middleware stack for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (stricter for admin)
//!
//! The admin role guard is the `RequireAdmin` extractor. Every `/api`
//! handler takes it, so there is exactly one place that decides who is an
//! admin.

pub mod auth;
pub mod request_id;
pub mod security_headers;

pub use auth::{AdminRejection, CallbackCaller, RequireAdmin, RequireUser};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;

//! HTTP middleware and extractors for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. CORS (only when `STOREFRONT_ALLOWED_ORIGIN` is set)
//! 3. `TraceLayer` (request span with method, uri, status, latency)
//! 4. Request ID (reuse or generate `x-request-id`)

pub mod auth;
pub mod request_id;

pub use auth::{OptionalSession, RequireSession};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

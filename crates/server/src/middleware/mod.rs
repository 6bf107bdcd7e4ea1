//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//!
//! Authentication is an extractor, not a layer: handlers that need an
//! identity take a [`RequireIdentity`] argument.

pub mod identity;
pub mod request_id;

pub use identity::RequireIdentity;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};

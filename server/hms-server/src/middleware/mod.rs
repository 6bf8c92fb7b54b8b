//! Middleware and extractors for request processing

pub mod auth_context;
pub mod request;

pub use auth_context::AuthContext;
pub use request::{audit_logging_middleware, create_cors_layer, request_timing_middleware};

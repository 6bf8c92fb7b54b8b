//! Common error handling utilities for WardLine HMS
//!
//! Binaries and startup code share the [`HmsError`] enum so that failures in
//! configuration, logging, database bootstrap and the HTTP listener surface
//! with one consistent shape. Request-level errors live in the server crate
//! (`ApiError`); domain crates keep their own `thiserror` enums.
//!
//! # Example
//!
//! ```rust
//! use error_common::{HmsError, Result};
//!
//! fn parse_port(raw: &str) -> Result<u16> {
//!     raw.parse()
//!         .map_err(|_| HmsError::ConfigError(format!("invalid port: {raw}")))
//! }
//!
//! assert!(parse_port("8080").is_ok());
//! assert!(parse_port("eighty").is_err());
//! ```

pub mod types;

pub use types::*;

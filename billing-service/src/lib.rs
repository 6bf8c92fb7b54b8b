//! Billing Service for hospital invoicing
//!
//! Pure domain logic, no database access:
//! - Line items and invoice total computation (tax, discount, insurance offset)
//! - Payment application and payment status derivation
//! - Financial summaries for the reporting dashboard

pub mod service;
pub mod models;
pub mod payment;
pub mod reporting;
pub mod error;

pub use service::*;
pub use models::*;
pub use payment::*;
pub use reporting::*;
pub use error::*;

//! Scheduling Service for outpatient appointments
//!
//! - Appointment status enum and its lifecycle rules
//! - Doctor time-slot conflict detection
//! - Appointment statistics for the clinical dashboard

pub mod models;
pub mod lifecycle;
pub mod conflict;
pub mod stats;
pub mod error;

pub use models::*;
pub use lifecycle::*;
pub use conflict::*;
pub use stats::*;
pub use error::*;

//! Ward Service for rooms and bed assignments
//!
//! Occupancy is never stored: it is derived at read time by matching
//! active bed assignments against each room's bed slots.

pub mod models;
pub mod occupancy;
pub mod charges;
pub mod error;

pub use models::*;
pub use occupancy::*;
pub use charges::*;
pub use error::*;

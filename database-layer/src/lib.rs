//! PostgreSQL persistence for WardLine HMS
//!
//! Owns the connection pool, the embedded migrations and one repository per
//! aggregate. Business rules live in the domain crates (`ward-service`,
//! `scheduling-service`, `billing-service`); repositories load the rows those
//! rules need, run them inside a transaction where the outcome depends on
//! concurrent writers, and persist the result.
//!
//! ```rust,ignore
//! use database_layer::{DatabasePool, PoolSettings, PatientRepository, PatientFilter};
//!
//! let db = DatabasePool::connect(&database_url, &PoolSettings::default()).await?;
//! db.migrate().await?;
//!
//! let patients = PatientRepository::new(db.pool().clone());
//! let page = patients.list(&PatientFilter::default()).await?;
//! ```

pub mod appointment_repository;
pub mod audit;
pub mod billing_repository;
pub mod connection;
pub mod error;
pub mod models;
pub mod patient_repository;
pub mod query;
pub mod report_repository;
pub mod room_repository;
pub mod staff_repository;

pub use appointment_repository::{AppointmentFilter, AppointmentRepository};
pub use audit::{AuditEntry, AuditRepository};
pub use billing_repository::{BillingRepository, InvoiceFilter};
pub use connection::{DatabasePool, PoolSettings};
pub use error::{DatabaseError, DatabaseResult, OptionalExt};
pub use models::*;
pub use patient_repository::{PatientFilter, PatientRepository};
pub use query::{Page, PaginatedQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use report_repository::{AppointmentOutcome, PatientDemographic, ReportRepository, StayRecord};
pub use room_repository::{AssignmentFilter, BedTransfer, RoomFilter, RoomRepository, RoomView};
pub use staff_repository::{StaffFilter, StaffRepository};

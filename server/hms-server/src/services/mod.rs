//! Services composed on top of the repositories

pub mod audit;
pub mod identifiers;
pub mod reporting;

pub use audit::AuditService;
pub use reporting::{ClinicalReport, FinancialReport, OperationalReport, ReportWindow};

use thiserror::Error;

use crate::models::AppointmentStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot move appointment from {from} to {to}")]
    InvalidTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Doctor already has an appointment overlapping this slot")]
    SlotConflict,

    #[error("Only scheduled appointments can be rescheduled (current status: {0})")]
    NotReschedulable(AppointmentStatus),
}

pub type SchedulingResult<T> = Result<T, SchedulingError>;

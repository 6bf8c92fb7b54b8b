use chrono::{DateTime, Utc};

use crate::error::{SchedulingError, SchedulingResult};
use crate::models::AppointmentStatus;

/// Whether `from -> to` is a legal status change.
///
/// The main path advances one step at a time; cancelled and no-show
/// branch off any non-terminal state. Terminal states are final.
pub fn can_transition(from: AppointmentStatus, to: AppointmentStatus) -> bool {
    if from.is_terminal() || from == to {
        return false;
    }
    match (from.main_path_index(), to.main_path_index()) {
        (_, None) => true,
        (Some(current), Some(next)) => next == current + 1,
        (None, Some(_)) => false,
    }
}

pub fn validate_transition(from: AppointmentStatus, to: AppointmentStatus) -> SchedulingResult<()> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(SchedulingError::InvalidTransition { from, to })
    }
}

/// Statuses reachable from `from` in one move
pub fn next_statuses(from: AppointmentStatus) -> Vec<AppointmentStatus> {
    AppointmentStatus::ALL
        .into_iter()
        .filter(|to| can_transition(from, *to))
        .collect()
}

/// Timestamp columns written by a status change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusStamps {
    pub checked_in_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Validated status change ready to persist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
    pub status: AppointmentStatus,
    pub stamps: StatusStamps,
    pub cancellation_reason: Option<String>,
}

/// Validate a move and compute the columns it sets
pub fn plan_status_change(
    from: AppointmentStatus,
    to: AppointmentStatus,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> SchedulingResult<StatusChange> {
    validate_transition(from, to)?;

    let mut stamps = StatusStamps::default();
    match to {
        AppointmentStatus::CheckedIn => stamps.checked_in_at = Some(now),
        AppointmentStatus::InProgress => stamps.started_at = Some(now),
        AppointmentStatus::Completed => stamps.completed_at = Some(now),
        _ => {}
    }

    let cancellation_reason = if to == AppointmentStatus::Cancelled {
        reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty())
    } else {
        None
    };

    tracing::debug!(from = %from, to = %to, "Appointment status change planned");

    Ok(StatusChange {
        status: to,
        stamps,
        cancellation_reason,
    })
}

pub fn ensure_reschedulable(status: AppointmentStatus) -> SchedulingResult<()> {
    if status == AppointmentStatus::Scheduled {
        Ok(())
    } else {
        Err(SchedulingError::NotReschedulable(status))
    }
}

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

use crate::error::{SchedulingError, SchedulingResult};

pub const MIN_DURATION_MINUTES: i32 = 5;
pub const MAX_DURATION_MINUTES: i32 = 480;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "appointment_status", rename_all = "kebab-case"))]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::CheckedIn => "checked-in",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no-show",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled | AppointmentStatus::NoShow
        )
    }

    /// Position on the main path, `None` for the side branches
    pub(crate) fn main_path_index(self) -> Option<u8> {
        match self {
            AppointmentStatus::Scheduled => Some(0),
            AppointmentStatus::CheckedIn => Some(1),
            AppointmentStatus::InProgress => Some(2),
            AppointmentStatus::Completed => Some(3),
            AppointmentStatus::Cancelled | AppointmentStatus::NoShow => None,
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = SchedulingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| SchedulingError::Validation(format!("Unknown appointment status: {s}")))
    }
}

/// A half-open interval `[start, start + duration)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSlot {
    pub start: DateTime<Utc>,
    pub duration_minutes: i32,
}

impl TimeSlot {
    pub fn new(start: DateTime<Utc>, duration_minutes: i32) -> SchedulingResult<Self> {
        validate_duration(duration_minutes)?;
        Ok(Self {
            start,
            duration_minutes,
        })
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.start + Duration::minutes(i64::from(self.duration_minutes))
    }

    /// Touching slots (one ends exactly when the other starts) do not overlap
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end() && other.start < self.end()
    }
}

pub fn validate_duration(duration_minutes: i32) -> SchedulingResult<()> {
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration_minutes) {
        return Err(SchedulingError::Validation(format!(
            "Duration must be between {MIN_DURATION_MINUTES} and {MAX_DURATION_MINUTES} minutes"
        )));
    }
    Ok(())
}

/// Booking time must lie strictly in the future
pub fn validate_booking_time(scheduled_at: DateTime<Utc>, now: DateTime<Utc>) -> SchedulingResult<()> {
    if scheduled_at <= now {
        return Err(SchedulingError::Validation(
            "Appointments must be scheduled in the future".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, hour, minute, 0).unwrap()
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(serde_json::to_string(&AppointmentStatus::NoShow).unwrap(), "\"no-show\"");
        assert_eq!("checked-in".parse::<AppointmentStatus>().unwrap(), AppointmentStatus::CheckedIn);
        assert!("done".parse::<AppointmentStatus>().is_err());
        for status in AppointmentStatus::ALL {
            assert_eq!(status.to_string().parse::<AppointmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
        assert!(AppointmentStatus::NoShow.is_terminal());
        assert!(!AppointmentStatus::InProgress.is_terminal());
    }

    #[test]
    fn test_slot_overlap() {
        let a = TimeSlot::new(at(9, 0), 30).unwrap();
        let b = TimeSlot::new(at(9, 15), 30).unwrap();
        let c = TimeSlot::new(at(9, 30), 30).unwrap();
        let inner = TimeSlot::new(at(9, 5), 10).unwrap();

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(!a.overlaps(&c));
        assert!(!c.overlaps(&a));
        assert!(a.overlaps(&inner));
    }

    #[test]
    fn test_duration_bounds() {
        assert!(TimeSlot::new(at(9, 0), 4).is_err());
        assert!(TimeSlot::new(at(9, 0), 5).is_ok());
        assert!(TimeSlot::new(at(9, 0), 480).is_ok());
        assert!(TimeSlot::new(at(9, 0), 481).is_err());
    }

    #[test]
    fn test_booking_time_must_be_future() {
        let now = at(12, 0);
        assert!(validate_booking_time(at(12, 0), now).is_err());
        assert!(validate_booking_time(at(11, 59), now).is_err());
        assert!(validate_booking_time(at(12, 1), now).is_ok());
    }
}

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::models::AppointmentStatus;

/// Appointment counts for a reporting window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AppointmentStats {
    pub total: u64,
    pub by_status: BTreeMap<String, u64>,
    pub by_department: BTreeMap<String, u64>,
    /// Percent of terminal appointments that completed, 1 dp
    pub completion_rate: f64,
    /// Percent of terminal appointments that were no-shows, 1 dp
    pub no_show_rate: f64,
}

impl AppointmentStats {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = (AppointmentStatus, &'a str)>,
    {
        let mut stats = AppointmentStats::default();
        let mut terminal: u64 = 0;
        let mut completed: u64 = 0;
        let mut no_show: u64 = 0;

        for (status, department) in records {
            stats.total += 1;
            *stats.by_status.entry(status.as_str().to_string()).or_default() += 1;
            let department = if department.trim().is_empty() { "unassigned" } else { department };
            *stats.by_department.entry(department.to_string()).or_default() += 1;

            if status.is_terminal() {
                terminal += 1;
            }
            match status {
                AppointmentStatus::Completed => completed += 1,
                AppointmentStatus::NoShow => no_show += 1,
                _ => {}
            }
        }

        stats.completion_rate = percent(completed, terminal);
        stats.no_show_rate = percent(no_show, terminal);
        stats
    }
}

/// `part / whole` as a percentage rounded to one decimal, zero when `whole` is zero
#[allow(clippy::cast_precision_loss)]
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 * 1000.0 / whole as f64).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use AppointmentStatus::*;

    #[test]
    fn test_percent() {
        assert!((percent(1, 3) - 33.3).abs() < f64::EPSILON);
        assert!((percent(2, 3) - 66.7).abs() < f64::EPSILON);
        assert!(percent(5, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rates_use_terminal_appointments_only() {
        let records = vec![
            (Completed, "cardiology"),
            (Completed, "cardiology"),
            (NoShow, "neurology"),
            (Cancelled, "neurology"),
            (Scheduled, "cardiology"),
            (InProgress, ""),
        ];
        let stats = AppointmentStats::from_records(records);

        assert_eq!(stats.total, 6);
        assert!((stats.completion_rate - 50.0).abs() < f64::EPSILON);
        assert!((stats.no_show_rate - 25.0).abs() < f64::EPSILON);
        assert_eq!(stats.by_department["cardiology"], 3);
        assert_eq!(stats.by_department["unassigned"], 1);
        assert_eq!(stats.by_status["completed"], 2);
    }

    #[test]
    fn test_empty_stats() {
        let stats = AppointmentStats::from_records(Vec::<(AppointmentStatus, &str)>::new());
        assert_eq!(stats.total, 0);
        assert!(stats.completion_rate.abs() < f64::EPSILON);
    }
}

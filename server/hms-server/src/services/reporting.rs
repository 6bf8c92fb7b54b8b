//! Dashboard reports
//!
//! Each report loads the rows it needs through the repositories and folds
//! them with the pure aggregation functions below.

use billing_service::FinancialSummary;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use database_layer::{age_on, AppointmentOutcome, PatientDemographic, RoomFilter, StaffMember, StayRecord};
use scheduling_service::AppointmentStats;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use ward_service::{length_of_stay_days, OccupancySummary};

use crate::error::ApiError;
use crate::server::HmsServer;

pub const AGE_BUCKETS: [&str; 4] = ["0-17", "18-39", "40-64", "65+"];

/// Half-open reporting window `[from, to)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl ReportWindow {
    /// Whole days `from..=to`; defaults to the 30 days ending today
    pub fn from_dates(from: Option<NaiveDate>, to: Option<NaiveDate>, today: NaiveDate) -> Result<Self, ApiError> {
        let to = to.unwrap_or(today);
        let from = from.unwrap_or(to - Duration::days(29));
        if from > to {
            return Err(ApiError::validation("'from' must not be after 'to'"));
        }
        Ok(Self {
            from: from.and_time(NaiveTime::MIN).and_utc(),
            to: (to + Duration::days(1)).and_time(NaiveTime::MIN).and_utc(),
        })
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.from <= t && t < self.to
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OperationalReport {
    pub generated_at: DateTime<Utc>,
    pub occupancy: OccupancySummary,
    pub active_admissions: i64,
    /// Today's appointments keyed by status
    pub appointments_today: BTreeMap<String, u64>,
    /// Active staff whose shift covers the current hour, keyed by role
    pub staff_on_duty: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FinancialReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: FinancialSummary,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PatientStats {
    /// Registered before the end of the window
    pub total_patients: u64,
    pub new_patients: u64,
    pub by_gender: BTreeMap<String, u64>,
    pub by_age_group: BTreeMap<String, u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AdmissionStats {
    pub admissions: u64,
    pub discharges: u64,
    /// Days, 1 dp, over stays discharged in the window
    pub average_length_of_stay: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClinicalReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub patients: PatientStats,
    pub admissions: AdmissionStats,
    pub appointments: AppointmentStats,
}

pub async fn operational_report(server: &HmsServer, now: DateTime<Utc>) -> Result<OperationalReport, ApiError> {
    let rooms = server.rooms.list_rooms(&RoomFilter::default(), now).await?;
    let occupancy = OccupancySummary::from_rooms(rooms.iter().map(|view| (view.room.room_type, &view.occupancy)));

    let active_admissions = server.reports.active_admissions(now).await?;

    let day_start = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let today = server
        .reports
        .appointment_outcomes(day_start, day_start + Duration::days(1))
        .await?;

    let staff = server.staff.list_active().await?;

    Ok(OperationalReport {
        generated_at: now,
        occupancy,
        active_admissions,
        appointments_today: count_by_status(&today),
        staff_on_duty: staff_on_duty(&staff, now.hour()),
    })
}

pub async fn financial_report(
    server: &HmsServer,
    window: ReportWindow,
    today: NaiveDate,
) -> Result<FinancialReport, ApiError> {
    let invoices = server.invoices.created_between(window.from, window.to).await?;
    let snapshots: Vec<_> = invoices
        .into_iter()
        .map(|invoice| invoice.with_effective_status(today).snapshot())
        .collect();

    Ok(FinancialReport {
        from: window.from,
        to: window.to,
        summary: FinancialSummary::from_invoices(&snapshots),
    })
}

pub async fn clinical_report(
    server: &HmsServer,
    window: ReportWindow,
    today: NaiveDate,
) -> Result<ClinicalReport, ApiError> {
    let demographics = server.reports.patient_demographics().await?;
    let stays = server.reports.stays_between(window.from, window.to).await?;
    let outcomes = server.reports.appointment_outcomes(window.from, window.to).await?;

    Ok(ClinicalReport {
        from: window.from,
        to: window.to,
        patients: patient_stats(&demographics, &window, today),
        admissions: admission_stats(&stays, &window),
        appointments: AppointmentStats::from_records(
            outcomes
                .iter()
                .map(|o| (o.status, o.department.as_deref().unwrap_or(""))),
        ),
    })
}

pub fn age_bucket(age: i32) -> &'static str {
    match age {
        ..=17 => "0-17",
        18..=39 => "18-39",
        40..=64 => "40-64",
        _ => "65+",
    }
}

/// Patients registered before the window closes, with ages taken on the
/// window's last day (or today, for a window reaching past today)
pub fn patient_stats(patients: &[PatientDemographic], window: &ReportWindow, today: NaiveDate) -> PatientStats {
    let mut stats = PatientStats::default();
    for bucket in AGE_BUCKETS {
        stats.by_age_group.insert(bucket.to_string(), 0);
    }
    let age_date = (window.to - Duration::days(1)).date_naive().min(today);

    for patient in patients.iter().filter(|p| p.created_at < window.to) {
        stats.total_patients += 1;
        if window.contains(patient.created_at) {
            stats.new_patients += 1;
        }
        *stats.by_gender.entry(patient.gender.as_str().to_string()).or_default() += 1;
        let bucket = age_bucket(age_on(patient.date_of_birth, age_date));
        *stats.by_age_group.entry(bucket.to_string()).or_default() += 1;
    }
    stats
}

#[allow(clippy::cast_precision_loss)]
pub fn admission_stats(stays: &[StayRecord], window: &ReportWindow) -> AdmissionStats {
    let mut stats = AdmissionStats::default();
    let mut total_days = 0.0;

    for stay in stays {
        if window.contains(stay.admission_date) {
            stats.admissions += 1;
        }
        if let Some(discharged) = stay.discharge_date.filter(|d| window.contains(*d)) {
            stats.discharges += 1;
            total_days += length_of_stay_days(stay.admission_date, discharged);
        }
    }

    if stats.discharges > 0 {
        stats.average_length_of_stay = (total_days / stats.discharges as f64 * 10.0).round() / 10.0;
    }
    stats
}

pub fn count_by_status(outcomes: &[AppointmentOutcome]) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for outcome in outcomes {
        *counts.entry(outcome.status.as_str().to_string()).or_default() += 1;
    }
    counts
}

pub fn staff_on_duty(staff: &[StaffMember], hour: u32) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    for member in staff.iter().filter(|m| m.is_active && m.shift.covers_hour(hour)) {
        *counts.entry(member.role.as_str().to_string()).or_default() += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use database_layer::{Gender, Shift, StaffRole};
    use scheduling_service::AppointmentStatus;
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 31).unwrap()
    }

    fn may() -> ReportWindow {
        ReportWindow::from_dates(NaiveDate::from_ymd_opt(2026, 5, 1), Some(today()), today()).unwrap()
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_window_defaults_and_bounds() {
        let window = ReportWindow::from_dates(None, None, today()).unwrap();
        assert_eq!(window.to, Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());
        assert_eq!(window.from, Utc.with_ymd_and_hms(2026, 5, 2, 0, 0, 0).unwrap());
        assert!(window.contains(at(31, 23)));
        assert!(!window.contains(window.to));

        let reversed = ReportWindow::from_dates(Some(today()), NaiveDate::from_ymd_opt(2026, 5, 1), today());
        assert!(matches!(reversed, Err(ApiError::Validation { .. })));
    }

    #[test]
    fn test_age_buckets() {
        assert_eq!(age_bucket(0), "0-17");
        assert_eq!(age_bucket(17), "0-17");
        assert_eq!(age_bucket(18), "18-39");
        assert_eq!(age_bucket(40), "40-64");
        assert_eq!(age_bucket(64), "40-64");
        assert_eq!(age_bucket(65), "65+");
    }

    #[test]
    fn test_patient_stats() {
        let patient = |gender, year, created_day| PatientDemographic {
            gender,
            date_of_birth: NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
            created_at: if created_day == 0 {
                Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            } else {
                at(created_day, 9)
            },
        };
        let stats = patient_stats(
            &[
                patient(Gender::Female, 2015, 3),
                patient(Gender::Female, 1990, 0),
                patient(Gender::Male, 1950, 20),
            ],
            &may(),
            today(),
        );

        assert_eq!(stats.total_patients, 3);
        assert_eq!(stats.new_patients, 2);
        assert_eq!(stats.by_gender["female"], 2);
        assert_eq!(stats.by_age_group["0-17"], 1);
        assert_eq!(stats.by_age_group["18-39"], 1);
        assert_eq!(stats.by_age_group["40-64"], 0);
        assert_eq!(stats.by_age_group["65+"], 1);
    }

    #[test]
    fn test_patient_stats_as_of_window_end() {
        let early_may =
            ReportWindow::from_dates(NaiveDate::from_ymd_opt(2026, 5, 1), NaiveDate::from_ymd_opt(2026, 5, 10), today())
                .unwrap();
        let turns_eighteen_mid_may = PatientDemographic {
            gender: Gender::Male,
            date_of_birth: NaiveDate::from_ymd_opt(2008, 5, 15).unwrap(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
        };
        let registered_after = PatientDemographic {
            gender: Gender::Female,
            date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            created_at: at(20, 9),
        };

        let stats = patient_stats(&[turns_eighteen_mid_may, registered_after], &early_may, today());
        assert_eq!(stats.total_patients, 1);
        assert_eq!(stats.new_patients, 0);
        assert_eq!(stats.by_gender.get("female"), None);
        assert_eq!(stats.by_age_group["0-17"], 1);
        assert_eq!(stats.by_age_group["18-39"], 0);
        assert_eq!(stats.by_age_group["40-64"], 0);
    }

    #[test]
    fn test_admission_stats() {
        let stays = [
            // admitted and discharged in window: 2 days
            StayRecord { admission_date: at(10, 8), discharge_date: Some(at(12, 8)) },
            // admitted before window, discharged inside: 1 day counted from admission
            StayRecord {
                admission_date: Utc.with_ymd_and_hms(2026, 4, 30, 20, 0, 0).unwrap(),
                discharge_date: Some(at(1, 20)),
            },
            // still admitted
            StayRecord { admission_date: at(29, 8), discharge_date: None },
        ];
        let stats = admission_stats(&stays, &may());
        assert_eq!(stats.admissions, 2);
        assert_eq!(stats.discharges, 2);
        assert!((stats.average_length_of_stay - 1.5).abs() < f64::EPSILON);

        assert_eq!(admission_stats(&[], &may()), AdmissionStats::default());
    }

    #[test]
    fn test_count_by_status() {
        let outcome = |status| AppointmentOutcome { status, department: None };
        let counts = count_by_status(&[
            outcome(AppointmentStatus::Scheduled),
            outcome(AppointmentStatus::Scheduled),
            outcome(AppointmentStatus::CheckedIn),
        ]);
        assert_eq!(counts["scheduled"], 2);
        assert_eq!(counts["checked-in"], 1);
    }

    #[test]
    fn test_staff_on_duty() {
        let member = |role, shift, is_active| StaffMember {
            id: Uuid::new_v4(),
            employee_code: "EMP".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            role,
            department: None,
            specialization: None,
            email: "a@b.org".into(),
            phone: None,
            license_number: None,
            shift,
            password_hash: None,
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let staff = [
            member(StaffRole::Doctor, Shift::Day, true),
            member(StaffRole::Nurse, Shift::Night, true),
            member(StaffRole::Nurse, Shift::Rotating, true),
            member(StaffRole::Doctor, Shift::Day, false),
        ];

        let morning = staff_on_duty(&staff, 9);
        assert_eq!(morning.get("doctor"), Some(&1));
        assert_eq!(morning.get("nurse"), Some(&1));

        let night = staff_on_duty(&staff, 2);
        assert_eq!(night.get("doctor"), None);
        assert_eq!(night.get("nurse"), Some(&2));
    }
}

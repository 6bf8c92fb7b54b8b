use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{WardError, WardResult};
use crate::models::{validate_bed_number, AssignmentWindow, BedSlot, OccupancyStatus, RoomType};

/// Bed view of a room at instant `t`.
///
/// Slots run `1..=capacity`; assignments for bed numbers outside that range
/// are ignored.
pub fn bed_slots(capacity: i32, assignments: &[AssignmentWindow], t: DateTime<Utc>) -> Vec<BedSlot> {
    (1..=capacity.max(0))
        .map(|bed_number| {
            let holder = assignments
                .iter()
                .find(|a| a.bed_number == bed_number && a.is_active_at(t));
            BedSlot {
                bed_number,
                occupied: holder.is_some(),
                assignment_id: holder.map(|a| a.assignment_id),
                patient_id: holder.map(|a| a.patient_id),
            }
        })
        .collect()
}

pub fn classify(occupied: usize, capacity: i32) -> OccupancyStatus {
    let capacity = usize::try_from(capacity).unwrap_or(0);
    if occupied == 0 {
        OccupancyStatus::Available
    } else if occupied >= capacity {
        OccupancyStatus::Full
    } else {
        OccupancyStatus::Partial
    }
}

/// Occupancy of a single room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoomOccupancy {
    pub capacity: i32,
    pub occupied_beds: usize,
    pub available_beds: usize,
    pub status: OccupancyStatus,
    pub beds: Vec<BedSlot>,
}

impl RoomOccupancy {
    pub fn compute(capacity: i32, assignments: &[AssignmentWindow], t: DateTime<Utc>) -> Self {
        let beds = bed_slots(capacity, assignments, t);
        let occupied_beds = beds.iter().filter(|b| b.occupied).count();
        Self {
            capacity,
            occupied_beds,
            available_beds: beds.len() - occupied_beds,
            status: classify(occupied_beds, capacity),
            beds,
        }
    }

    /// Highest occupied bed number, 0 when empty
    pub fn highest_occupied_bed(&self) -> i32 {
        self.beds
            .iter()
            .filter(|b| b.occupied)
            .map(|b| b.bed_number)
            .max()
            .unwrap_or(0)
    }
}

/// Checks run inside the assignment transaction before inserting.
///
/// A new assignment holds its bed from `at` onwards, so it conflicts with any
/// stay on the same bed, or of the same patient, that is not discharged by
/// `at`. This covers backdated admissions into a bed taken later and
/// future-dated admissions into a bed taken now.
pub fn check_assignable(
    capacity: i32,
    bed_number: i32,
    patient_id: Uuid,
    room_assignments: &[AssignmentWindow],
    patient_assignments: &[AssignmentWindow],
    at: DateTime<Utc>,
) -> WardResult<()> {
    validate_bed_number(bed_number, capacity)?;

    if patient_assignments
        .iter()
        .any(|a| a.patient_id == patient_id && a.overlaps_stay_from(at))
    {
        return Err(WardError::PatientAlreadyAdmitted);
    }

    if room_assignments
        .iter()
        .any(|a| a.bed_number == bed_number && a.overlaps_stay_from(at))
    {
        return Err(WardError::BedOccupied(bed_number));
    }

    Ok(())
}

/// Resolve the discharge instant for an assignment
pub fn check_discharge(
    window: &AssignmentWindow,
    requested: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> WardResult<DateTime<Utc>> {
    if window.discharge_date.is_some() {
        return Err(WardError::AlreadyDischarged);
    }
    let at = requested.unwrap_or(now);
    if at < window.admission_date {
        return Err(WardError::Validation(
            "Discharge date cannot precede the admission date".to_string(),
        ));
    }
    Ok(at)
}

pub fn check_capacity_change(new_capacity: i32, current: &RoomOccupancy) -> WardResult<()> {
    crate::models::validate_capacity(new_capacity)?;
    let highest = current.highest_occupied_bed();
    if highest > new_capacity {
        return Err(WardError::CapacityBelowOccupied(highest));
    }
    Ok(())
}

pub fn check_removable(current: &RoomOccupancy) -> WardResult<()> {
    if current.occupied_beds > 0 {
        return Err(WardError::RoomOccupied);
    }
    Ok(())
}

/// Hospital-wide occupancy figures for the operational dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OccupancySummary {
    pub total_rooms: u64,
    pub total_beds: u64,
    pub occupied_beds: u64,
    /// Percent, 1 dp
    pub occupancy_rate: f64,
    pub by_status: BTreeMap<String, u64>,
    pub by_room_type: BTreeMap<String, u64>,
}

impl OccupancySummary {
    #[allow(clippy::cast_precision_loss)]
    pub fn from_rooms<'a, I>(rooms: I) -> Self
    where
        I: IntoIterator<Item = (RoomType, &'a RoomOccupancy)>,
    {
        let mut summary = OccupancySummary::default();
        for (room_type, occupancy) in rooms {
            summary.total_rooms += 1;
            summary.total_beds += u64::try_from(occupancy.capacity).unwrap_or(0);
            summary.occupied_beds += occupancy.occupied_beds as u64;
            *summary.by_status.entry(occupancy.status.as_str().to_string()).or_default() += 1;
            *summary.by_room_type.entry(room_type.as_str().to_string()).or_default() += 1;
        }
        if summary.total_beds > 0 {
            summary.occupancy_rate =
                (summary.occupied_beds as f64 * 1000.0 / summary.total_beds as f64).round() / 10.0;
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 10, 12, 0, 0).unwrap()
    }

    fn window(bed: i32, admitted_days_ago: i64, discharged_days_ago: Option<i64>) -> AssignmentWindow {
        AssignmentWindow {
            assignment_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            bed_number: bed,
            admission_date: now() - Duration::days(admitted_days_ago),
            discharge_date: discharged_days_ago.map(|d| now() - Duration::days(d)),
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(0, 4), OccupancyStatus::Available);
        assert_eq!(classify(2, 4), OccupancyStatus::Partial);
        assert_eq!(classify(4, 4), OccupancyStatus::Full);
        assert_eq!(classify(5, 4), OccupancyStatus::Full);
    }

    #[test]
    fn test_bed_slots_ignore_out_of_range_and_inactive() {
        let assignments = vec![
            window(1, 3, None),
            window(2, 10, Some(5)),
            window(7, 1, None),
        ];
        let slots = bed_slots(3, &assignments, now());

        assert_eq!(slots.len(), 3);
        assert!(slots[0].occupied);
        assert_eq!(slots[0].assignment_id, Some(assignments[0].assignment_id));
        assert!(!slots[1].occupied);
        assert!(!slots[2].occupied);
    }

    #[test]
    fn test_room_occupancy() {
        let assignments = vec![window(1, 1, None), window(2, 1, None)];
        let occupancy = RoomOccupancy::compute(2, &assignments, now());
        assert_eq!(occupancy.status, OccupancyStatus::Full);
        assert_eq!(occupancy.available_beds, 0);
        assert_eq!(occupancy.highest_occupied_bed(), 2);
    }

    #[test]
    fn test_check_assignable() {
        let occupied = window(1, 2, None);
        let patient = Uuid::new_v4();

        assert_eq!(
            check_assignable(2, 1, patient, &[occupied], &[], now()),
            Err(WardError::BedOccupied(1))
        );
        assert!(check_assignable(2, 2, patient, &[occupied], &[], now()).is_ok());
        assert!(matches!(
            check_assignable(2, 3, patient, &[], &[], now()),
            Err(WardError::BedOutOfRange { .. })
        ));

        let mut elsewhere = window(4, 1, None);
        elsewhere.patient_id = patient;
        assert_eq!(
            check_assignable(2, 2, patient, &[], &[elsewhere], now()),
            Err(WardError::PatientAlreadyAdmitted)
        );
    }

    #[test]
    fn test_backdated_admission_conflicts_with_later_stay() {
        let occupant = window(1, 1, None);
        let patient = Uuid::new_v4();
        let two_days_ago = now() - Duration::days(2);

        assert_eq!(
            check_assignable(2, 1, patient, &[occupant], &[], two_days_ago),
            Err(WardError::BedOccupied(1))
        );

        // stay that ended before the backdated admission does not block it
        let earlier = window(1, 10, Some(5));
        assert!(check_assignable(2, 1, patient, &[earlier], &[], two_days_ago).is_ok());

        let mut admitted_later = window(2, 1, None);
        admitted_later.patient_id = patient;
        assert_eq!(
            check_assignable(2, 1, patient, &[], &[admitted_later], two_days_ago),
            Err(WardError::PatientAlreadyAdmitted)
        );
    }

    #[test]
    fn test_future_admission_conflicts_with_current_stay() {
        let occupant = window(1, 1, None);
        let patient = Uuid::new_v4();
        let tomorrow = now() + Duration::days(1);

        assert_eq!(
            check_assignable(2, 1, patient, &[occupant], &[], tomorrow),
            Err(WardError::BedOccupied(1))
        );

        // discharged before the planned admission
        let mut leaving = window(1, 3, None);
        leaving.discharge_date = Some(now() + Duration::hours(2));
        assert!(check_assignable(2, 1, patient, &[leaving], &[], tomorrow).is_ok());

        // a booked future stay blocks an open-ended admission today
        let mut booked = window(1, 0, None);
        booked.admission_date = now() + Duration::days(3);
        assert_eq!(
            check_assignable(2, 1, patient, &[booked], &[], now()),
            Err(WardError::BedOccupied(1))
        );
    }

    #[test]
    fn test_discharge_rules() {
        let open = window(1, 3, None);
        assert_eq!(check_discharge(&open, None, now()).unwrap(), now());
        assert!(check_discharge(&open, Some(now() - Duration::days(4)), now()).is_err());

        let closed = window(1, 3, Some(1));
        assert_eq!(check_discharge(&closed, None, now()), Err(WardError::AlreadyDischarged));
    }

    #[test]
    fn test_capacity_change_and_removal() {
        let occupancy = RoomOccupancy::compute(4, &[window(3, 1, None)], now());
        assert_eq!(check_capacity_change(2, &occupancy), Err(WardError::CapacityBelowOccupied(3)));
        assert!(check_capacity_change(3, &occupancy).is_ok());
        assert_eq!(check_removable(&occupancy), Err(WardError::RoomOccupied));

        let empty = RoomOccupancy::compute(4, &[], now());
        assert!(check_removable(&empty).is_ok());
    }

    #[test]
    fn test_occupancy_summary() {
        let full = RoomOccupancy::compute(1, &[window(1, 1, None)], now());
        let partial = RoomOccupancy::compute(2, &[window(2, 1, None)], now());
        let empty = RoomOccupancy::compute(3, &[], now());

        let summary = OccupancySummary::from_rooms(vec![
            (RoomType::Icu, &full),
            (RoomType::General, &partial),
            (RoomType::General, &empty),
        ]);

        assert_eq!(summary.total_rooms, 3);
        assert_eq!(summary.total_beds, 6);
        assert_eq!(summary.occupied_beds, 2);
        assert!((summary.occupancy_rate - 33.3).abs() < f64::EPSILON);
        assert_eq!(summary.by_status["full"], 1);
        assert_eq!(summary.by_room_type["general"], 2);
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::{WardError, WardResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "room_type", rename_all = "kebab-case"))]
pub enum RoomType {
    General,
    SemiPrivate,
    Private,
    Icu,
    Emergency,
    Maternity,
    Pediatric,
}

impl RoomType {
    pub const ALL: [RoomType; 7] = [
        RoomType::General,
        RoomType::SemiPrivate,
        RoomType::Private,
        RoomType::Icu,
        RoomType::Emergency,
        RoomType::Maternity,
        RoomType::Pediatric,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::General => "general",
            RoomType::SemiPrivate => "semi-private",
            RoomType::Private => "private",
            RoomType::Icu => "icu",
            RoomType::Emergency => "emergency",
            RoomType::Maternity => "maternity",
            RoomType::Pediatric => "pediatric",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RoomType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| WardError::Validation(format!("Unknown room type: {s}")))
    }
}

/// Derived room occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    Available,
    Partial,
    Full,
}

impl OccupancyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OccupancyStatus::Available => "available",
            OccupancyStatus::Partial => "partial",
            OccupancyStatus::Full => "full",
        }
    }
}

impl FromStr for OccupancyStatus {
    type Err = WardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(OccupancyStatus::Available),
            "partial" => Ok(OccupancyStatus::Partial),
            "full" => Ok(OccupancyStatus::Full),
            other => Err(WardError::Validation(format!("Unknown occupancy status: {other}"))),
        }
    }
}

/// The date range of a bed assignment, as needed for occupancy checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentWindow {
    pub assignment_id: Uuid,
    pub patient_id: Uuid,
    pub bed_number: i32,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
}

impl AssignmentWindow {
    /// `admission <= t` and not yet discharged at `t`
    pub fn is_active_at(&self, t: DateTime<Utc>) -> bool {
        self.admission_date <= t && self.discharge_date.map_or(true, |discharged| discharged > t)
    }

    /// Whether this stay overlaps an open-ended stay starting at `from`.
    ///
    /// True for stays still running at `from` and for stays that begin later.
    pub fn overlaps_stay_from(&self, from: DateTime<Utc>) -> bool {
        self.discharge_date.map_or(true, |discharged| discharged > from)
    }
}

/// One bed of a room at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BedSlot {
    pub bed_number: i32,
    pub occupied: bool,
    pub assignment_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
}

pub fn validate_capacity(capacity: i32) -> WardResult<()> {
    if capacity < 1 {
        return Err(WardError::Validation("Room capacity must be at least 1".to_string()));
    }
    Ok(())
}

pub fn validate_daily_rate(rate: Decimal) -> WardResult<()> {
    if rate < Decimal::ZERO {
        return Err(WardError::Validation("Daily rate cannot be negative".to_string()));
    }
    Ok(())
}

pub fn validate_bed_number(bed_number: i32, capacity: i32) -> WardResult<()> {
    if bed_number < 1 || bed_number > capacity {
        return Err(WardError::BedOutOfRange { bed_number, capacity });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_room_type_strings() {
        assert_eq!(serde_json::to_string(&RoomType::SemiPrivate).unwrap(), "\"semi-private\"");
        assert_eq!("icu".parse::<RoomType>().unwrap(), RoomType::Icu);
        assert!("suite".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_assignment_active_window() {
        let admitted = Utc.with_ymd_and_hms(2026, 2, 1, 8, 0, 0).unwrap();
        let mut window = AssignmentWindow {
            assignment_id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            bed_number: 1,
            admission_date: admitted,
            discharge_date: None,
        };

        assert!(!window.is_active_at(admitted - Duration::seconds(1)));
        assert!(window.is_active_at(admitted));
        assert!(window.is_active_at(admitted + Duration::days(30)));

        window.discharge_date = Some(admitted + Duration::days(2));
        assert!(window.is_active_at(admitted + Duration::days(1)));
        assert!(!window.is_active_at(admitted + Duration::days(2)));

        assert!(window.overlaps_stay_from(admitted - Duration::days(5)));
        assert!(window.overlaps_stay_from(admitted + Duration::days(1)));
        assert!(!window.overlaps_stay_from(admitted + Duration::days(2)));
    }

    #[test]
    fn test_validators() {
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(1).is_ok());
        assert!(validate_daily_rate(Decimal::NEGATIVE_ONE).is_err());
        assert!(validate_daily_rate(Decimal::ZERO).is_ok());
        assert_eq!(
            validate_bed_number(3, 2),
            Err(WardError::BedOutOfRange {
                bed_number: 3,
                capacity: 2
            })
        );
        assert!(validate_bed_number(0, 2).is_err());
        assert!(validate_bed_number(2, 2).is_ok());
    }
}

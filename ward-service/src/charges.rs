use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Room charge for one admission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StayCharge {
    pub days: i64,
    pub daily_rate: Decimal,
    pub amount: Decimal,
}

/// Calendar days between admission and discharge (or `now` while still
/// admitted), never less than one
pub fn billable_days(admission: DateTime<Utc>, discharge: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let end = discharge.unwrap_or(now);
    let days = (end.date_naive() - admission.date_naive()).num_days();
    days.max(1)
}

pub fn stay_charge(
    daily_rate: Decimal,
    admission: DateTime<Utc>,
    discharge: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> StayCharge {
    let days = billable_days(admission, discharge, now);
    StayCharge {
        days,
        daily_rate,
        amount: daily_rate * Decimal::from(days),
    }
}

/// Length of stay in fractional days, used for the average length-of-stay figure
#[allow(clippy::cast_precision_loss)]
pub fn length_of_stay_days(admission: DateTime<Utc>, discharge: DateTime<Utc>) -> f64 {
    (discharge - admission).num_seconds().max(0) as f64 / 86_400.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_same_day_bills_one_day() {
        let admitted = Utc.with_ymd_and_hms(2026, 1, 5, 8, 0, 0).unwrap();
        let discharged = Utc.with_ymd_and_hms(2026, 1, 5, 18, 0, 0).unwrap();
        let charge = stay_charge(dec!(250.00), admitted, Some(discharged), discharged);
        assert_eq!(charge.days, 1);
        assert_eq!(charge.amount, dec!(250.00));
    }

    #[test]
    fn test_counts_calendar_days() {
        let admitted = Utc.with_ymd_and_hms(2026, 1, 5, 23, 0, 0).unwrap();
        let discharged = Utc.with_ymd_and_hms(2026, 1, 8, 1, 0, 0).unwrap();
        assert_eq!(billable_days(admitted, Some(discharged), discharged), 3);
    }

    #[test]
    fn test_open_stay_uses_now() {
        let admitted = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 11, 9, 0, 0).unwrap();
        let charge = stay_charge(dec!(99.50), admitted, None, now);
        assert_eq!(charge.days, 10);
        assert_eq!(charge.amount, dec!(995.00));
    }

    #[test]
    fn test_length_of_stay() {
        let admitted = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let discharged = Utc.with_ymd_and_hms(2026, 1, 2, 12, 0, 0).unwrap();
        assert!((length_of_stay_days(admitted, discharged) - 1.5).abs() < f64::EPSILON);
    }
}

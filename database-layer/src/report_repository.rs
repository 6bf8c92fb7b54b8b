//! Read-only queries behind the reporting dashboards
//!
//! Rows are fetched narrow and aggregated by the domain crates, so the
//! figures stay testable without a database.

use chrono::{DateTime, NaiveDate, Utc};
use scheduling_service::AppointmentStatus;
use sqlx::{FromRow, Pool, Postgres};

use crate::error::DatabaseResult;
use crate::models::Gender;

#[derive(Debug, Clone, FromRow)]
pub struct PatientDemographic {
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct StayRecord {
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AppointmentOutcome {
    pub status: AppointmentStatus,
    pub department: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: Pool<Postgres>,
}

impl ReportRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Every patient on record
    pub async fn patient_demographics(&self) -> DatabaseResult<Vec<PatientDemographic>> {
        let rows = sqlx::query_as::<_, PatientDemographic>(
            "SELECT gender, date_of_birth, created_at FROM patients WHERE is_deleted = false",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Stays admitted or discharged within `[from, to)`
    pub async fn stays_between(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DatabaseResult<Vec<StayRecord>> {
        let rows = sqlx::query_as::<_, StayRecord>(
            r#"
            SELECT admission_date, discharge_date FROM bed_assignments
            WHERE (admission_date >= $1 AND admission_date < $2)
               OR (discharge_date >= $1 AND discharge_date < $2)
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Appointments scheduled within `[from, to)`
    pub async fn appointment_outcomes(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DatabaseResult<Vec<AppointmentOutcome>> {
        let rows = sqlx::query_as::<_, AppointmentOutcome>(
            r#"
            SELECT status, department FROM appointments
            WHERE is_deleted = false AND scheduled_at >= $1 AND scheduled_at < $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Assignments open at `at`
    pub async fn active_admissions(&self, at: DateTime<Utc>) -> DatabaseResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM bed_assignments
            WHERE admission_date <= $1 AND (discharge_date IS NULL OR discharge_date > $1)
            "#,
        )
        .bind(at)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

use chrono::{DateTime, Utc};
use scheduling_service::{
    ensure_reschedulable, ensure_slot_free, plan_status_change, validate_booking_time, AppointmentStatus,
    BookedSlot, SchedulingError, TimeSlot,
};
use sqlx::{PgConnection, Pool, Postgres};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DatabaseError, DatabaseResult, OptionalExt};
use crate::models::{Appointment, CreateAppointment, StaffMember, StaffRole, UpdateAppointment};
use crate::query::{Page, PaginatedQuery};

#[derive(Debug, Clone, Default)]
pub struct AppointmentFilter {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub department: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Repository for outpatient appointments
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    pool: Pool<Postgres>,
}

impl AppointmentRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Book a slot; the doctor row is locked so concurrent bookings serialize
    pub async fn book(&self, input: &CreateAppointment, now: DateTime<Utc>) -> DatabaseResult<Appointment> {
        validate_booking_time(input.scheduled_at, now)?;
        let slot = TimeSlot::new(input.scheduled_at, input.duration_minutes)?;

        let mut tx = self.pool.begin().await?;
        let doctor = lock_doctor(&mut tx, input.doctor_id).await?;

        let patient: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM patients WHERE id = $1 AND is_deleted = false")
                .bind(input.patient_id)
                .fetch_optional(&mut *tx)
                .await?;
        if patient.is_none() {
            return Err(DatabaseError::not_found("Patient"));
        }

        let booked = doctor_calendar(&mut tx, doctor.id, &slot).await?;
        ensure_slot_free(&slot, &booked, None)?;

        let department = input.department.clone().or_else(|| doctor.department.clone());
        let appointment = sqlx::query_as::<_, Appointment>(
            r#"
            INSERT INTO appointments (
                id, patient_id, doctor_id, department, scheduled_at, duration_minutes, reason, notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.patient_id)
        .bind(doctor.id)
        .bind(department)
        .bind(input.scheduled_at)
        .bind(input.duration_minutes)
        .bind(&input.reason)
        .bind(&input.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(appointment_id = %appointment.id, doctor_id = %doctor.id, "Appointment booked");
        Ok(appointment)
    }

    pub async fn get(&self, id: Uuid) -> DatabaseResult<Appointment> {
        sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 AND is_deleted = false")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Appointment")
    }

    /// Edit details; moving the slot is only allowed while still scheduled
    pub async fn update(&self, id: Uuid, input: &UpdateAppointment, now: DateTime<Utc>) -> DatabaseResult<Appointment> {
        let mut tx = self.pool.begin().await?;
        let current = lock_appointment(&mut tx, id).await?;

        let reschedules = input.scheduled_at.is_some_and(|at| at != current.scheduled_at)
            || input.duration_minutes.is_some_and(|d| d != current.duration_minutes);

        if reschedules {
            ensure_reschedulable(current.status)?;
            let start = input.scheduled_at.unwrap_or(current.scheduled_at);
            validate_booking_time(start, now)?;
            let slot = TimeSlot::new(start, input.duration_minutes.unwrap_or(current.duration_minutes))?;

            lock_doctor(&mut tx, current.doctor_id).await?;
            let booked = doctor_calendar(&mut tx, current.doctor_id, &slot).await?;
            ensure_slot_free(&slot, &booked, Some(current.id))?;
        } else if current.status.is_terminal() {
            return Err(DatabaseError::Conflict(format!(
                "Appointment is {} and can no longer be edited",
                current.status
            )));
        }

        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET
                scheduled_at = COALESCE($2, scheduled_at),
                duration_minutes = COALESCE($3, duration_minutes),
                department = COALESCE($4, department),
                reason = COALESCE($5, reason),
                notes = COALESCE($6, notes),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.scheduled_at)
        .bind(input.duration_minutes)
        .bind(&input.department)
        .bind(&input.reason)
        .bind(&input.notes)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        target: AppointmentStatus,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Appointment> {
        let mut tx = self.pool.begin().await?;
        let current = lock_appointment(&mut tx, id).await?;
        let change = plan_status_change(current.status, target, reason, now)?;

        let updated = sqlx::query_as::<_, Appointment>(
            r#"
            UPDATE appointments
            SET
                status = $2,
                checked_in_at = COALESCE($3, checked_in_at),
                started_at = COALESCE($4, started_at),
                completed_at = COALESCE($5, completed_at),
                cancellation_reason = COALESCE($6, cancellation_reason),
                updated_at = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(change.status)
        .bind(change.stamps.checked_in_at)
        .bind(change.stamps.started_at)
        .bind(change.stamps.completed_at)
        .bind(change.cancellation_reason)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(appointment_id = %id, from = %current.status, to = %updated.status, "Appointment status changed");
        Ok(updated)
    }

    pub async fn list(&self, filter: &AppointmentFilter) -> DatabaseResult<Page<Appointment>> {
        let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM appointments WHERE 1=1");
        apply_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = PaginatedQuery::new("SELECT * FROM appointments WHERE 1=1");
        apply_filter(&mut query, filter);
        query
            .order_by("scheduled_at", "ASC")
            .paginate(filter.page, filter.page_size);
        let items = query.build_query_as::<Appointment>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    /// Soft delete
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE appointments SET is_deleted = true, updated_at = $2 WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Appointment"));
        }
        Ok(())
    }

    /// Open appointments of a patient from `now` on
    pub async fn upcoming_for_patient(
        &self,
        patient_id: Uuid,
        now: DateTime<Utc>,
        limit: i64,
    ) -> DatabaseResult<Vec<Appointment>> {
        let appointments = sqlx::query_as::<_, Appointment>(
            r#"
            SELECT * FROM appointments
            WHERE patient_id = $1
              AND is_deleted = false
              AND scheduled_at >= $2
              AND status IN ('scheduled', 'checked-in', 'in-progress')
            ORDER BY scheduled_at ASC
            LIMIT $3
            "#,
        )
        .bind(patient_id)
        .bind(now)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(appointments)
    }
}

fn apply_filter(query: &mut PaginatedQuery<'_>, filter: &AppointmentFilter) {
    query
        .filter_not_deleted()
        .filter_eq("patient_id", filter.patient_id)
        .filter_eq("doctor_id", filter.doctor_id)
        .filter_eq("status", filter.status)
        .filter_eq("department", filter.department.clone())
        .filter_gte("scheduled_at", filter.from)
        .filter_lt("scheduled_at", filter.to);
}

async fn lock_appointment(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<Appointment> {
    sqlx::query_as::<_, Appointment>("SELECT * FROM appointments WHERE id = $1 AND is_deleted = false FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .or_not_found("Appointment")
}

/// The booked doctor must be an active staff member with the doctor role
async fn lock_doctor(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<StaffMember> {
    let doctor = sqlx::query_as::<_, StaffMember>("SELECT * FROM staff WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .or_not_found("Doctor")?;

    if doctor.role != StaffRole::Doctor || !doctor.is_active {
        return Err(SchedulingError::Validation(format!("{} is not an active doctor", doctor.full_name())).into());
    }
    Ok(doctor)
}

/// Non-terminal appointments of a doctor that could collide with `slot`
async fn doctor_calendar(conn: &mut PgConnection, doctor_id: Uuid, slot: &TimeSlot) -> DatabaseResult<Vec<BookedSlot>> {
    let rows = sqlx::query_as::<_, Appointment>(
        r#"
        SELECT * FROM appointments
        WHERE doctor_id = $1
          AND is_deleted = false
          AND status IN ('scheduled', 'checked-in', 'in-progress')
          AND scheduled_at < $3
          AND scheduled_at + make_interval(mins => duration_minutes) > $2
        "#,
    )
    .bind(doctor_id)
    .bind(slot.start)
    .bind(slot.end())
    .fetch_all(conn)
    .await?;

    debug!(doctor_id = %doctor_id, candidates = rows.len(), "Loaded doctor calendar");
    Ok(rows.iter().map(Appointment::booked_slot).collect())
}

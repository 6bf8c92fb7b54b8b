use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgConnection, Pool, Postgres};
use std::collections::HashMap;
use tracing::{debug, info};
use utoipa::ToSchema;
use uuid::Uuid;
use ward_service::{
    check_assignable, check_capacity_change, check_discharge, check_removable, validate_capacity,
    validate_daily_rate, AssignmentWindow, OccupancyStatus, RoomOccupancy, RoomType,
};

use crate::error::{DatabaseError, DatabaseResult, OptionalExt};
use crate::models::{BedAssignment, CreateBedAssignment, CreateRoom, Room, UpdateRoom};
use crate::query::PaginatedQuery;

#[derive(Debug, Clone, Default)]
pub struct RoomFilter {
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    pub department: Option<String>,
    pub status: Option<OccupancyStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub room_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub active_only: bool,
}

/// A room together with its occupancy at read time
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomView {
    #[serde(flatten)]
    pub room: Room,
    pub occupancy: RoomOccupancy,
}

/// Both sides of a bed transfer
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BedTransfer {
    pub discharged: BedAssignment,
    pub admitted: BedAssignment,
}

/// Repository for rooms and bed assignments
#[derive(Debug, Clone)]
pub struct RoomRepository {
    pool: Pool<Postgres>,
}

impl RoomRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    // -- rooms --------------------------------------------------------------

    pub async fn create_room(&self, input: &CreateRoom) -> DatabaseResult<Room> {
        validate_capacity(input.capacity)?;
        validate_daily_rate(input.daily_rate)?;

        let room = sqlx::query_as::<_, Room>(
            r#"
            INSERT INTO rooms (id, room_number, room_type, floor, capacity, daily_rate, department)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.room_number.trim())
        .bind(input.room_type)
        .bind(input.floor)
        .bind(input.capacity)
        .bind(input.daily_rate)
        .bind(&input.department)
        .fetch_one(&self.pool)
        .await?;

        debug!(room_id = %room.id, room_number = %room.room_number, "Room created");
        Ok(room)
    }

    pub async fn get_room(&self, id: Uuid) -> DatabaseResult<Room> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 AND is_active = true")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Room")
    }

    /// Room by id whether active or retired; past stays still reference retired rooms
    pub async fn get_room_including_retired(&self, id: Uuid) -> DatabaseResult<Room> {
        sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Room")
    }

    pub async fn get_room_view(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<RoomView> {
        let room = self.get_room(id).await?;
        let windows = open_windows(&mut *self.pool.acquire().await?, id, now).await?;
        let occupancy = RoomOccupancy::compute(room.capacity, &windows, now);
        Ok(RoomView { room, occupancy })
    }

    /// Capacity may not drop below the highest occupied bed number
    pub async fn update_room(&self, id: Uuid, input: &UpdateRoom, now: DateTime<Utc>) -> DatabaseResult<Room> {
        if let Some(rate) = input.daily_rate {
            validate_daily_rate(rate)?;
        }

        let mut tx = self.pool.begin().await?;
        let room = lock_room(&mut tx, id).await?;

        if let Some(capacity) = input.capacity {
            let windows = open_windows(&mut tx, id, now).await?;
            let occupancy = RoomOccupancy::compute(room.capacity, &windows, now);
            check_capacity_change(capacity, &occupancy)?;
        }

        let updated = sqlx::query_as::<_, Room>(
            r#"
            UPDATE rooms
            SET
                room_number = COALESCE($2, room_number),
                room_type = COALESCE($3, room_type),
                floor = COALESCE($4, floor),
                capacity = COALESCE($5, capacity),
                daily_rate = COALESCE($6, daily_rate),
                department = COALESCE($7, department),
                updated_at = $8
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.room_number.as_deref().map(str::trim))
        .bind(input.room_type)
        .bind(input.floor)
        .bind(input.capacity)
        .bind(input.daily_rate)
        .bind(&input.department)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Soft delete, refused while any bed is occupied
    pub async fn delete_room(&self, id: Uuid, now: DateTime<Utc>) -> DatabaseResult<()> {
        let mut tx = self.pool.begin().await?;
        let room = lock_room(&mut tx, id).await?;

        let windows = open_windows(&mut tx, id, now).await?;
        check_removable(&RoomOccupancy::compute(room.capacity, &windows, now))?;

        sqlx::query("UPDATE rooms SET is_active = false, updated_at = $2 WHERE id = $1")
            .bind(id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(room_id = %id, "Room deactivated");
        Ok(())
    }

    /// Rooms with computed occupancy; the status filter applies after occupancy is known
    pub async fn list_rooms(&self, filter: &RoomFilter, now: DateTime<Utc>) -> DatabaseResult<Vec<RoomView>> {
        let mut query = PaginatedQuery::new("SELECT * FROM rooms WHERE 1=1");
        query
            .filter_active()
            .filter_eq("room_type", filter.room_type)
            .filter_eq("floor", filter.floor)
            .filter_eq("department", filter.department.clone())
            .order_by("floor, room_number", "ASC");
        let rooms = query.build_query_as::<Room>().fetch_all(&self.pool).await?;

        let room_ids: Vec<Uuid> = rooms.iter().map(|r| r.id).collect();
        let assignments = sqlx::query_as::<_, BedAssignment>(
            r#"
            SELECT * FROM bed_assignments
            WHERE room_id = ANY($1)
              AND admission_date <= $2
              AND (discharge_date IS NULL OR discharge_date > $2)
            "#,
        )
        .bind(&room_ids)
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        let mut by_room: HashMap<Uuid, Vec<AssignmentWindow>> = HashMap::new();
        for assignment in &assignments {
            by_room.entry(assignment.room_id).or_default().push(assignment.window());
        }

        let views = rooms
            .into_iter()
            .map(|room| {
                let windows = by_room.get(&room.id).map(Vec::as_slice).unwrap_or_default();
                let occupancy = RoomOccupancy::compute(room.capacity, windows, now);
                RoomView { room, occupancy }
            })
            .filter(|view| filter.status.map_or(true, |status| view.occupancy.status == status))
            .collect();

        Ok(views)
    }

    // -- bed assignments ----------------------------------------------------

    pub async fn get_assignment(&self, id: Uuid) -> DatabaseResult<BedAssignment> {
        sqlx::query_as::<_, BedAssignment>("SELECT * FROM bed_assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Bed assignment")
    }

    /// Check bed and patient availability and insert, all in one transaction
    pub async fn assign_bed(&self, input: &CreateBedAssignment, now: DateTime<Utc>) -> DatabaseResult<BedAssignment> {
        let mut tx = self.pool.begin().await?;
        let assignment = assign_in_tx(&mut tx, input, input.admission_date.unwrap_or(now)).await?;
        tx.commit().await?;

        info!(
            assignment_id = %assignment.id,
            room_id = %assignment.room_id,
            bed_number = assignment.bed_number,
            "Patient admitted to bed"
        );
        Ok(assignment)
    }

    pub async fn discharge(
        &self,
        id: Uuid,
        discharge_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<BedAssignment> {
        let mut tx = self.pool.begin().await?;
        let discharged = discharge_in_tx(&mut tx, id, discharge_at, now).await?;
        tx.commit().await?;

        info!(assignment_id = %id, "Patient discharged from bed");
        Ok(discharged)
    }

    /// Discharge now and admit to another bed atomically
    pub async fn transfer(
        &self,
        id: Uuid,
        new_room_id: Uuid,
        new_bed_number: i32,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DatabaseResult<BedTransfer> {
        let mut tx = self.pool.begin().await?;
        let discharged = discharge_in_tx(&mut tx, id, Some(now), now).await?;

        let input = CreateBedAssignment {
            patient_id: discharged.patient_id,
            room_id: new_room_id,
            bed_number: new_bed_number,
            admission_date: Some(now),
            admitting_doctor_id: discharged.admitting_doctor_id,
            notes: notes.or_else(|| discharged.notes.clone()),
        };
        let admitted = assign_in_tx(&mut tx, &input, now).await?;
        tx.commit().await?;

        info!(from = %discharged.id, to = %admitted.id, "Patient transferred");
        Ok(BedTransfer { discharged, admitted })
    }

    pub async fn list_assignments(
        &self,
        filter: &AssignmentFilter,
        now: DateTime<Utc>,
    ) -> DatabaseResult<Vec<BedAssignment>> {
        let mut query = PaginatedQuery::new("SELECT * FROM bed_assignments WHERE 1=1");
        query
            .filter_eq("room_id", filter.room_id)
            .filter_eq("patient_id", filter.patient_id);
        if filter.active_only {
            query.filter_active_at("admission_date", "discharge_date", now);
        }
        query.order_by("admission_date", "DESC");

        let assignments = query.build_query_as::<BedAssignment>().fetch_all(&self.pool).await?;
        Ok(assignments)
    }

    /// The patient's bed at `now`, if admitted
    pub async fn current_assignment(&self, patient_id: Uuid, now: DateTime<Utc>) -> DatabaseResult<Option<BedAssignment>> {
        let assignment = sqlx::query_as::<_, BedAssignment>(
            r#"
            SELECT * FROM bed_assignments
            WHERE patient_id = $1
              AND admission_date <= $2
              AND (discharge_date IS NULL OR discharge_date > $2)
            ORDER BY admission_date DESC
            LIMIT 1
            "#,
        )
        .bind(patient_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }
}

async fn lock_room(conn: &mut PgConnection, id: Uuid) -> DatabaseResult<Room> {
    sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = $1 AND is_active = true FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .or_not_found("Room")
}

/// Assignments of a room not yet discharged at `at`
async fn open_windows(conn: &mut PgConnection, room_id: Uuid, at: DateTime<Utc>) -> DatabaseResult<Vec<AssignmentWindow>> {
    let rows = sqlx::query_as::<_, BedAssignment>(
        "SELECT * FROM bed_assignments WHERE room_id = $1 AND (discharge_date IS NULL OR discharge_date > $2)",
    )
    .bind(room_id)
    .bind(at)
    .fetch_all(conn)
    .await?;
    Ok(rows.iter().map(BedAssignment::window).collect())
}

async fn assign_in_tx(
    conn: &mut PgConnection,
    input: &CreateBedAssignment,
    at: DateTime<Utc>,
) -> DatabaseResult<BedAssignment> {
    let room = lock_room(conn, input.room_id).await?;

    let patient: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM patients WHERE id = $1 AND is_deleted = false FOR UPDATE")
            .bind(input.patient_id)
            .fetch_optional(&mut *conn)
            .await?;
    if patient.is_none() {
        return Err(DatabaseError::not_found("Patient"));
    }

    let room_windows = open_windows(conn, input.room_id, at).await?;
    let patient_windows: Vec<AssignmentWindow> = sqlx::query_as::<_, BedAssignment>(
        "SELECT * FROM bed_assignments WHERE patient_id = $1 AND (discharge_date IS NULL OR discharge_date > $2)",
    )
    .bind(input.patient_id)
    .bind(at)
    .fetch_all(&mut *conn)
    .await?
    .iter()
    .map(BedAssignment::window)
    .collect();

    check_assignable(
        room.capacity,
        input.bed_number,
        input.patient_id,
        &room_windows,
        &patient_windows,
        at,
    )?;

    let assignment = sqlx::query_as::<_, BedAssignment>(
        r#"
        INSERT INTO bed_assignments (
            id, patient_id, room_id, bed_number, admission_date, admitting_doctor_id, notes
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.patient_id)
    .bind(input.room_id)
    .bind(input.bed_number)
    .bind(at)
    .bind(input.admitting_doctor_id)
    .bind(&input.notes)
    .fetch_one(conn)
    .await?;

    Ok(assignment)
}

async fn discharge_in_tx(
    conn: &mut PgConnection,
    id: Uuid,
    discharge_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> DatabaseResult<BedAssignment> {
    let current = sqlx::query_as::<_, BedAssignment>("SELECT * FROM bed_assignments WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .or_not_found("Bed assignment")?;

    let at = check_discharge(&current.window(), discharge_at, now)?;

    let discharged = sqlx::query_as::<_, BedAssignment>(
        "UPDATE bed_assignments SET discharge_date = $2, updated_at = $3 WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(at)
    .bind(now)
    .fetch_one(conn)
    .await?;

    Ok(discharged)
}

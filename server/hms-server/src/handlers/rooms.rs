use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use database_layer::{
    AssignmentFilter, BedAssignment, BedTransfer, CreateBedAssignment, CreateRoom, Room, RoomFilter, RoomView,
    UpdateRoom,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use ward_service::{OccupancyStatus, RoomType};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_length, validate_required, validate_uuid};

impl RequestValidation for CreateRoom {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.room_number, "Room number is required");
        validate_length!(self.room_number, 1, 20, "Room number must be between 1 and 20 characters");
        validate_field!(self.capacity, self.capacity >= 1, "Capacity must be at least 1");
        validate_field!(self.daily_rate, !self.daily_rate.is_sign_negative(), "Daily rate cannot be negative");
        Ok(())
    }
}

impl RequestValidation for UpdateRoom {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref number) = self.room_number {
            validate_length!(number, 1, 20, "Room number must be between 1 and 20 characters");
        }
        if let Some(capacity) = self.capacity {
            validate_field!(capacity, capacity >= 1, "Capacity must be at least 1");
        }
        if let Some(rate) = self.daily_rate {
            validate_field!(rate, !rate.is_sign_negative(), "Daily rate cannot be negative");
        }
        Ok(())
    }
}

impl RequestValidation for CreateBedAssignment {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "Patient ID is required");
        validate_uuid!(self.room_id, "Room ID is required");
        validate_field!(self.bed_number, self.bed_number >= 1, "Bed number must be at least 1");
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListRoomsParams {
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    pub department: Option<String>,
    /// Filter on computed occupancy
    pub status: Option<OccupancyStatus>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAssignmentsParams {
    pub room_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    /// Only assignments active now
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct DischargeRequest {
    /// Defaults to now; must not precede admission
    pub discharge_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    pub room_id: Uuid,
    pub bed_number: i32,
    pub notes: Option<String>,
}

impl RequestValidation for TransferRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.room_id, "Room ID is required");
        validate_field!(self.bed_number, self.bed_number >= 1, "Bed number must be at least 1");
        Ok(())
    }
}

// ============================================================================
// ROOMS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::ROOMS,
    params(ListRoomsParams),
    responses(
        (status = 200, description = "Rooms with current occupancy", body = Vec<RoomView>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rooms",
    security(("bearer_auth" = []))
)]
pub async fn list_rooms(
    State(server): State<HmsServer>,
    Query(params): Query<ListRoomsParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<RoomView>>>, ApiError> {
    let filter = RoomFilter {
        room_type: params.room_type,
        floor: params.floor,
        department: params.department,
        status: params.status,
    };
    let rooms = server.rooms.list_rooms(&filter, Utc::now()).await?;
    Ok(Json(api_success(rooms)))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::ROOMS,
    request_body = CreateRoom,
    responses(
        (status = 201, description = "Room created successfully", body = Room),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Room number already exists"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rooms",
    security(("bearer_auth" = []))
)]
pub async fn create_room(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreateRoom>,
) -> Result<(StatusCode, Json<ApiResponse<Room>>), ApiError> {
    req.validate()?;

    let room = server.rooms.create_room(&req).await?;
    server
        .audit
        .log_action(&auth, "create", "room", room.id, json!({ "room_number": room.room_number }))
        .await;

    Ok((StatusCode::CREATED, Json(api_success(room))))
}

/// Room with its bed slots and occupancy status
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::ROOM_BY_ID,
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Room retrieved successfully", body = RoomView),
        (status = 404, description = "Room not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rooms",
    security(("bearer_auth" = []))
)]
pub async fn get_room(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<RoomView>>, ApiError> {
    Ok(Json(api_success(server.rooms.get_room_view(id, Utc::now()).await?)))
}

#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::ROOM_BY_ID,
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoom,
    responses(
        (status = 200, description = "Room updated successfully", body = Room),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Capacity below an occupied bed number"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rooms",
    security(("bearer_auth" = []))
)]
pub async fn update_room(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateRoom>,
) -> Result<Json<ApiResponse<Room>>, ApiError> {
    req.validate()?;

    let room = server.rooms.update_room(id, &req, Utc::now()).await?;
    server
        .audit
        .log_action(&auth, "update", "room", id, json!({ "capacity": room.capacity }))
        .await;

    Ok(Json(api_success(room)))
}

/// Retire an unoccupied room (administrators only)
#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::ROOM_BY_ID,
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 204, description = "Room deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Room still has occupied beds"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "rooms",
    security(("bearer_auth" = []))
)]
pub async fn delete_room(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    server.rooms.delete_room(id, Utc::now()).await?;
    server.audit.log_action(&auth, "delete", "room", id, json!({})).await;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// BED ASSIGNMENTS
// ============================================================================

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::BED_ASSIGNMENTS,
    params(ListAssignmentsParams),
    responses(
        (status = 200, description = "Bed assignments", body = Vec<BedAssignment>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bed-assignments",
    security(("bearer_auth" = []))
)]
pub async fn list_assignments(
    State(server): State<HmsServer>,
    Query(params): Query<ListAssignmentsParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<BedAssignment>>>, ApiError> {
    let filter = AssignmentFilter {
        room_id: params.room_id,
        patient_id: params.patient_id,
        active_only: params.active_only,
    };
    let assignments = server.rooms.list_assignments(&filter, Utc::now()).await?;
    Ok(Json(api_success(assignments)))
}

/// Admit a patient to a bed
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::BED_ASSIGNMENTS,
    request_body = CreateBedAssignment,
    responses(
        (status = 201, description = "Bed assigned", body = BedAssignment),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Room or patient not found"),
        (status = 409, description = "Bed occupied, bed out of range, or patient already admitted"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bed-assignments",
    security(("bearer_auth" = []))
)]
pub async fn assign_bed(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreateBedAssignment>,
) -> Result<(StatusCode, Json<ApiResponse<BedAssignment>>), ApiError> {
    req.validate()?;

    let assignment = server.rooms.assign_bed(&req, Utc::now()).await?;
    server
        .audit
        .log_action(
            &auth,
            "admit",
            "bed_assignment",
            assignment.id,
            json!({ "patient_id": assignment.patient_id, "room_id": assignment.room_id, "bed_number": assignment.bed_number }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(api_success(assignment))))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::BED_ASSIGNMENT_BY_ID,
    params(("id" = Uuid, Path, description = "Bed assignment ID")),
    responses(
        (status = 200, description = "Bed assignment", body = BedAssignment),
        (status = 404, description = "Bed assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bed-assignments",
    security(("bearer_auth" = []))
)]
pub async fn get_assignment(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<BedAssignment>>, ApiError> {
    Ok(Json(api_success(server.rooms.get_assignment(id).await?)))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::BED_ASSIGNMENT_DISCHARGE,
    params(("id" = Uuid, Path, description = "Bed assignment ID")),
    request_body = DischargeRequest,
    responses(
        (status = 200, description = "Patient discharged", body = BedAssignment),
        (status = 400, description = "Discharge precedes admission"),
        (status = 404, description = "Bed assignment not found"),
        (status = 409, description = "Already discharged"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bed-assignments",
    security(("bearer_auth" = []))
)]
pub async fn discharge(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    body: Option<Json<DischargeRequest>>,
) -> Result<Json<ApiResponse<BedAssignment>>, ApiError> {
    let req = body.map(|Json(req)| req).unwrap_or_default();

    let assignment = server.rooms.discharge(id, req.discharge_date, Utc::now()).await?;
    server
        .audit
        .log_action(
            &auth,
            "discharge",
            "bed_assignment",
            id,
            json!({ "discharge_date": assignment.discharge_date }),
        )
        .await;

    Ok(Json(api_success(assignment)))
}

/// Discharge now and admit to another bed in one step
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::BED_ASSIGNMENT_TRANSFER,
    params(("id" = Uuid, Path, description = "Bed assignment ID")),
    request_body = TransferRequest,
    responses(
        (status = 200, description = "Patient transferred", body = BedTransfer),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Bed assignment or room not found"),
        (status = 409, description = "Target bed unavailable or assignment already closed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "bed-assignments",
    security(("bearer_auth" = []))
)]
pub async fn transfer_bed(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<TransferRequest>,
) -> Result<Json<ApiResponse<BedTransfer>>, ApiError> {
    req.validate()?;

    let transfer = server
        .rooms
        .transfer(id, req.room_id, req.bed_number, req.notes, Utc::now())
        .await?;
    server
        .audit
        .log_action(
            &auth,
            "transfer",
            "bed_assignment",
            id,
            json!({ "new_assignment_id": transfer.admitted.id, "room_id": req.room_id, "bed_number": req.bed_number }),
        )
        .await;

    Ok(Json(api_success(transfer)))
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use database_layer::{Appointment, AppointmentFilter, CreateAppointment, UpdateAppointment};
use scheduling_service::{AppointmentStatus, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use serde::Deserialize;
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::types::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_range, validate_uuid};

const DURATION_MESSAGE: &str = "Duration must be between 5 and 480 minutes";

impl RequestValidation for CreateAppointment {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "Patient ID is required");
        validate_uuid!(self.doctor_id, "Doctor ID is required");
        validate_range!(self.duration_minutes, MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, DURATION_MESSAGE);
        validate_field!(
            self.scheduled_at,
            self.scheduled_at > Utc::now(),
            "Appointment must be scheduled in the future"
        );
        Ok(())
    }
}

impl RequestValidation for UpdateAppointment {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(duration) = self.duration_minutes {
            validate_range!(duration, MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, DURATION_MESSAGE);
        }
        if let Some(at) = self.scheduled_at {
            validate_field!(at, at > Utc::now(), "Appointment must be scheduled in the future");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListAppointmentsParams {
    pub patient_id: Option<Uuid>,
    pub doctor_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub department: Option<String>,
    /// Scheduled at or after (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Scheduled before (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
    /// Recorded when cancelling
    pub reason: Option<String>,
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::APPOINTMENTS,
    params(ListAppointmentsParams),
    responses(
        (status = 200, description = "Appointments retrieved successfully", body = Vec<Appointment>),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn list_appointments(
    State(server): State<HmsServer>,
    Query(params): Query<ListAppointmentsParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Appointment>>>, ApiError> {
    if let (Some(from), Some(to)) = (params.from, params.to) {
        validate_field!(from, from < to, "'from' must be before 'to'");
    }

    let pagination = PaginationParams::new(params.page, params.page_size);
    let page = server
        .appointments
        .list(&AppointmentFilter {
            patient_id: params.patient_id,
            doctor_id: params.doctor_id,
            status: params.status,
            department: params.department,
            from: params.from,
            to: params.to,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(pagination.wrap_page(page)))
}

/// Book an appointment with an active doctor
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::APPOINTMENTS,
    request_body = CreateAppointment,
    responses(
        (status = 201, description = "Appointment booked", body = Appointment),
        (status = 400, description = "Invalid request or doctor is not an active doctor"),
        (status = 404, description = "Patient or doctor not found"),
        (status = 409, description = "Doctor already booked for an overlapping slot"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn book_appointment(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreateAppointment>,
) -> Result<(StatusCode, Json<ApiResponse<Appointment>>), ApiError> {
    req.validate()?;

    let appointment = server.appointments.book(&req, Utc::now()).await?;
    server
        .audit
        .log_action(
            &auth,
            "book",
            "appointment",
            appointment.id,
            json!({ "patient_id": appointment.patient_id, "doctor_id": appointment.doctor_id, "scheduled_at": appointment.scheduled_at }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(api_success(appointment))))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::APPOINTMENT_BY_ID,
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 200, description = "Appointment retrieved successfully", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn get_appointment(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    Ok(Json(api_success(server.appointments.get(id).await?)))
}

/// Edit details; rescheduling is only possible while `scheduled`
#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::APPOINTMENT_BY_ID,
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateAppointment,
    responses(
        (status = 200, description = "Appointment updated", body = Appointment),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Not reschedulable or slot conflict"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn update_appointment(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateAppointment>,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    req.validate()?;

    let appointment = server.appointments.update(id, &req, Utc::now()).await?;
    server
        .audit
        .log_action(
            &auth,
            "update",
            "appointment",
            id,
            json!({ "scheduled_at": appointment.scheduled_at, "duration_minutes": appointment.duration_minutes }),
        )
        .await;

    Ok(Json(api_success(appointment)))
}

/// Move the appointment through its lifecycle
#[utoipa::path(
    patch,
    path = crate::routes::paths::api_v1::APPOINTMENT_STATUS,
    params(("id" = Uuid, Path, description = "Appointment ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Appointment),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Transition not allowed"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn update_status(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Appointment>>, ApiError> {
    let appointment = server
        .appointments
        .update_status(id, req.status, req.reason, Utc::now())
        .await?;

    server
        .audit
        .log_action(
            &auth,
            "status_change",
            "appointment",
            id,
            json!({ "status": appointment.status, "cancellation_reason": appointment.cancellation_reason }),
        )
        .await;

    Ok(Json(api_success(appointment)))
}

#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::APPOINTMENT_BY_ID,
    params(("id" = Uuid, Path, description = "Appointment ID")),
    responses(
        (status = 204, description = "Appointment deleted"),
        (status = 404, description = "Appointment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "appointments",
    security(("bearer_auth" = []))
)]
pub async fn delete_appointment(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    server.appointments.delete(id).await?;
    server.audit.log_action(&auth, "delete", "appointment", id, json!({})).await;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use database_layer::{Appointment, BedAssignment, CreatePatient, Gender, Patient, PatientFilter, UpdatePatient};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::services::identifiers::unique_mrn;
use crate::types::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_field, validate_length};

const UPCOMING_APPOINTMENTS: i64 = 5;

impl RequestValidation for CreatePatient {
    fn validate(&self) -> Result<(), ApiError> {
        validate_length!(self.first_name, 1, 100, "First name must be between 1 and 100 characters");
        validate_length!(self.last_name, 1, 100, "Last name must be between 1 and 100 characters");
        validate_field!(
            self.date_of_birth,
            self.date_of_birth <= Utc::now().date_naive(),
            "Date of birth cannot be in the future"
        );
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

impl RequestValidation for UpdatePatient {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref name) = self.first_name {
            validate_length!(name, 1, 100, "First name must be between 1 and 100 characters");
        }
        if let Some(ref name) = self.last_name {
            validate_length!(name, 1, 100, "Last name must be between 1 and 100 characters");
        }
        if let Some(dob) = self.date_of_birth {
            validate_field!(dob, dob <= Utc::now().date_naive(), "Date of birth cannot be in the future");
        }
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPatientsParams {
    /// Matches name, MRN or phone
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Patient record with admission, upcoming appointments and balance
#[derive(Debug, Serialize, ToSchema)]
pub struct PatientSummary {
    pub patient: Patient,
    pub current_admission: Option<BedAssignment>,
    pub upcoming_appointments: Vec<Appointment>,
    pub outstanding_balance: Decimal,
}

/// List patients
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENTS,
    params(ListPatientsParams),
    responses(
        (status = 200, description = "Patients retrieved successfully", body = Vec<Patient>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn list_patients(
    State(server): State<HmsServer>,
    Query(params): Query<ListPatientsParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<Patient>>>, ApiError> {
    let pagination = PaginationParams::new(params.page, params.page_size);
    let page = server
        .patients
        .list(&PatientFilter {
            search: params.search,
            gender: params.gender,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(pagination.wrap_page(page)))
}

/// Register a patient; the MRN is generated
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::PATIENTS,
    request_body = CreatePatient,
    responses(
        (status = 201, description = "Patient created successfully", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn create_patient(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreatePatient>,
) -> Result<(StatusCode, Json<ApiResponse<Patient>>), ApiError> {
    req.validate()?;

    let mrn = unique_mrn(&server.patients, Utc::now()).await?;
    let patient = server.patients.create(&mrn, &req).await?;

    server
        .audit
        .log_action(&auth, "create", "patient", patient.id, json!({ "mrn": patient.mrn }))
        .await;

    Ok((StatusCode::CREATED, Json(api_success(patient))))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient retrieved successfully", body = Patient),
        (status = 404, description = "Patient not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn get_patient(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    Ok(Json(api_success(server.patients.get(id).await?)))
}

/// Partial update; omitted fields keep their value
#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    request_body = UpdatePatient,
    responses(
        (status = 200, description = "Patient updated successfully", body = Patient),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "Patient not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn update_patient(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdatePatient>,
) -> Result<Json<ApiResponse<Patient>>, ApiError> {
    req.validate()?;

    let patient = server.patients.update(id, &req).await?;
    server
        .audit
        .log_action(&auth, "update", "patient", id, json!({ "mrn": patient.mrn }))
        .await;

    Ok(Json(api_success(patient)))
}

/// Soft delete (administrators only)
#[utoipa::path(
    delete,
    path = crate::routes::paths::api_v1::PATIENT_BY_ID,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Patient not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn delete_patient(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<StatusCode, ApiError> {
    auth.require_admin()?;

    server.patients.delete(id).await?;
    server.audit.log_action(&auth, "delete", "patient", id, json!({})).await;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::PATIENT_SUMMARY,
    params(("id" = Uuid, Path, description = "Patient ID")),
    responses(
        (status = 200, description = "Patient summary", body = PatientSummary),
        (status = 404, description = "Patient not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "patients",
    security(("bearer_auth" = []))
)]
pub async fn patient_summary(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<PatientSummary>>, ApiError> {
    let now = Utc::now();
    let patient = server.patients.get(id).await?;

    let (current_admission, upcoming_appointments, outstanding_balance) = tokio::try_join!(
        server.rooms.current_assignment(id, now),
        server.appointments.upcoming_for_patient(id, now, UPCOMING_APPOINTMENTS),
        server.patients.outstanding_balance(id),
    )?;

    Ok(Json(api_success(PatientSummary {
        patient,
        current_admission,
        upcoming_appointments,
        outstanding_balance,
    })))
}

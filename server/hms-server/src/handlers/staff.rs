use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use database_layer::{CreateStaff, StaffFilter, StaffMember, StaffRole, UpdateStaff};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{ApiError, ApiResponse, api_success};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::types::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_length, validate_required};

impl RequestValidation for CreateStaff {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.employee_code, "Employee code is required");
        validate_length!(self.employee_code, 1, 50, "Employee code must be between 1 and 50 characters");
        validate_length!(self.first_name, 1, 100, "First name must be between 1 and 100 characters");
        validate_length!(self.last_name, 1, 100, "Last name must be between 1 and 100 characters");
        validate_email!(self.email, "Invalid email format");
        Ok(())
    }
}

impl RequestValidation for UpdateStaff {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(ref name) = self.first_name {
            validate_length!(name, 1, 100, "First name must be between 1 and 100 characters");
        }
        if let Some(ref name) = self.last_name {
            validate_length!(name, 1, 100, "Last name must be between 1 and 100 characters");
        }
        if let Some(ref email) = self.email {
            validate_email!(email, "Invalid email format");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListStaffParams {
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    /// Matches name, email or employee code
    pub search: Option<String>,
    /// Defaults to true
    pub active_only: Option<bool>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListDoctorsParams {
    pub department: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::STAFF,
    params(ListStaffParams),
    responses(
        (status = 200, description = "Staff retrieved successfully", body = Vec<StaffMember>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn list_staff(
    State(server): State<HmsServer>,
    Query(params): Query<ListStaffParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<StaffMember>>>, ApiError> {
    let pagination = PaginationParams::new(params.page, params.page_size);
    let page = server
        .staff
        .list(&StaffFilter {
            role: params.role,
            department: params.department,
            search: params.search,
            active_only: params.active_only.unwrap_or(true),
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(pagination.wrap_page(page)))
}

/// Active doctors, optionally within one department
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::STAFF_DOCTORS,
    params(ListDoctorsParams),
    responses(
        (status = 200, description = "Doctors retrieved successfully", body = Vec<StaffMember>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn list_doctors(
    State(server): State<HmsServer>,
    Query(params): Query<ListDoctorsParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<StaffMember>>>, ApiError> {
    let pagination = PaginationParams::new(params.page, params.page_size);
    let page = server
        .staff
        .list(&StaffFilter {
            role: Some(StaffRole::Doctor),
            department: params.department,
            search: None,
            active_only: true,
            page: params.page,
            page_size: params.page_size,
        })
        .await?;

    Ok(Json(pagination.wrap_page(page)))
}

/// Add a staff member (administrators only)
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::STAFF,
    request_body = CreateStaff,
    responses(
        (status = 201, description = "Staff member created successfully", body = StaffMember),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Administrator role required"),
        (status = 409, description = "Email or employee code already in use"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn create_staff(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreateStaff>,
) -> Result<(StatusCode, Json<ApiResponse<StaffMember>>), ApiError> {
    auth.require_admin()?;
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => Some(server.passwords.hash(password).await?),
        None => None,
    };
    let member = server.staff.create(&req, password_hash).await?;

    server
        .audit
        .log_action(
            &auth,
            "create",
            "staff",
            member.id,
            json!({ "employee_code": member.employee_code, "role": member.role }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(api_success(member))))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::STAFF_BY_ID,
    params(("id" = Uuid, Path, description = "Staff member ID")),
    responses(
        (status = 200, description = "Staff member retrieved successfully", body = StaffMember),
        (status = 404, description = "Staff member not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn get_staff(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<StaffMember>>, ApiError> {
    Ok(Json(api_success(server.staff.get(id).await?)))
}

/// Update a staff member (administrators only); a new password is re-hashed
#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::STAFF_BY_ID,
    params(("id" = Uuid, Path, description = "Staff member ID")),
    request_body = UpdateStaff,
    responses(
        (status = 200, description = "Staff member updated successfully", body = StaffMember),
        (status = 400, description = "Invalid request"),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Staff member not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn update_staff(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateStaff>,
) -> Result<Json<ApiResponse<StaffMember>>, ApiError> {
    auth.require_admin()?;
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(password) => Some(server.passwords.hash(password).await?),
        None => None,
    };
    let member = server.staff.update(id, &req, password_hash).await?;

    server
        .audit
        .log_action(
            &auth,
            "update",
            "staff",
            id,
            json!({ "role": member.role, "password_changed": req.password.is_some() }),
        )
        .await;

    Ok(Json(api_success(member)))
}

/// Deactivate a staff member (administrators only)
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::STAFF_DEACTIVATE,
    params(("id" = Uuid, Path, description = "Staff member ID")),
    responses(
        (status = 200, description = "Staff member deactivated", body = StaffMember),
        (status = 403, description = "Administrator role required"),
        (status = 404, description = "Staff member not found"),
        (status = 409, description = "Already inactive, or deactivating own account"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "staff",
    security(("bearer_auth" = []))
)]
pub async fn deactivate_staff(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<StaffMember>>, ApiError> {
    auth.require_admin()?;
    if id == auth.user_id {
        return Err(ApiError::conflict("Administrators cannot deactivate their own account"));
    }

    let member = server.staff.deactivate(id).await?;
    server.revoked.revoke(id).await;
    server.audit.log_action(&auth, "deactivate", "staff", id, json!({})).await;

    Ok(Json(api_success(member)))
}

use axum::{extract::State, Json};
use database_layer::StaffMember;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::validation::RequestValidation;
use crate::{validate_email, validate_required};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "dr.okafor@wardline.example")]
    pub email: String,
    pub password: String,
}

impl RequestValidation for LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.email, "Email is required");
        validate_email!(self.email, "Invalid email format");
        validate_required!(self.password, "Password is required");
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub staff: StaffMember,
}

/// Exchange staff credentials for a bearer token
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::AUTH_LOGIN,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
pub async fn login(
    State(server): State<HmsServer>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    req.validate()?;

    let member = server.staff.find_active_by_email(&req.email).await?;
    let verified = match member.as_ref().and_then(|m| m.password_hash.as_deref()) {
        Some(hash) => server.passwords.verify(&req.password, hash).await?,
        None => false,
    };

    let Some(member) = member.filter(|_| verified) else {
        warn!("Rejected login attempt");
        server.audit.log_login(None, &req.email, false).await;
        return Err(ApiError::authentication("Invalid email or password"));
    };

    let issued = server.tokens.issue(&member)?;
    server.audit.log_login(Some(member.id), &member.email, true).await;
    info!(staff_id = %member.id, role = %member.role, "Staff member logged in");

    Ok(Json(api_success(LoginResponse {
        access_token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        staff: member,
    })))
}

/// The staff member the token belongs to
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::AUTH_ME,
    responses(
        (status = 200, description = "Authenticated staff member", body = StaffMember),
        (status = 401, description = "Unauthorized")
    ),
    tag = "auth",
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(server): State<HmsServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<StaffMember>>, ApiError> {
    let member = server.staff.get(auth.user_id).await?;
    if !member.is_active {
        return Err(ApiError::authentication("Account is deactivated"));
    }
    Ok(Json(api_success(member)))
}

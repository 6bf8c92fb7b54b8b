use axum::{
    extract::{Path, State},
    Json,
};
use database_layer::AuditLog;
use uuid::Uuid;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;

const HISTORY_LIMIT: i64 = 100;

/// Most recent audit entries for one entity, newest first
#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::AUDIT_ENTITY_HISTORY,
    params(
        ("entity_type" = String, Path, description = "Entity type, e.g. patient or invoice"),
        ("entity_id" = Uuid, Path, description = "Entity ID")
    ),
    responses(
        (status = 200, description = "Audit history", body = Vec<AuditLog>),
        (status = 403, description = "Administrator role required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "audit",
    security(("bearer_auth" = []))
)]
pub async fn entity_history(
    State(server): State<HmsServer>,
    Path((entity_type, entity_id)): Path<(String, Uuid)>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<AuditLog>>>, ApiError> {
    auth.require_admin()?;

    let entries = server.audit.history(&entity_type, entity_id, HISTORY_LIMIT).await?;
    Ok(Json(api_success(entries)))
}

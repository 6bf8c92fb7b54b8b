use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use crate::error::{api_success, ApiResponse};
use crate::server::HmsServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `degraded`
    #[schema(example = "healthy")]
    pub status: String,
    /// Current timestamp in RFC3339 format
    #[schema(example = "2026-01-15T10:30:00Z")]
    pub timestamp: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    /// Seconds since the server started
    #[schema(example = 3600)]
    pub uptime: u64,
    /// Individual dependency checks
    pub checks: BTreeMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    #[schema(example = "WardLine HMS")]
    pub name: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    pub api_version: String,
}

/// Liveness plus a database round trip
#[utoipa::path(
    get,
    path = crate::routes::paths::health::HEALTH,
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(server): State<HmsServer>) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let database_ok = server.db.is_healthy().await;

    let mut checks = BTreeMap::new();
    checks.insert(
        "database".to_string(),
        if database_ok { "healthy" } else { "unreachable" }.to_string(),
    );

    let now = Utc::now();
    let uptime = u64::try_from((now - server.started_at).num_seconds()).unwrap_or(0);
    let body = HealthResponse {
        status: if database_ok { "healthy" } else { "degraded" }.to_string(),
        timestamp: now.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime,
        checks,
    };

    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(api_success(body)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::health::VERSION,
    responses((status = 200, description = "Version information", body = VersionResponse)),
    tag = "health"
)]
pub async fn version_info(State(server): State<HmsServer>) -> Json<ApiResponse<VersionResponse>> {
    Json(api_success(VersionResponse {
        name: server.config.server.name.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        api_version: "v1".to_string(),
    }))
}

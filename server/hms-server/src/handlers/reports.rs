use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::services::{reporting, ClinicalReport, FinancialReport, OperationalReport, ReportWindow};

/// Inclusive date range; defaults to the 30 days ending today
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportParams {
    /// First day (YYYY-MM-DD)
    pub from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD)
    pub to: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::REPORTS_OPERATIONAL,
    responses(
        (status = 200, description = "Current occupancy, admissions, appointments and staffing", body = OperationalReport),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn operational(
    State(server): State<HmsServer>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<OperationalReport>>, ApiError> {
    let report = reporting::operational_report(&server, Utc::now()).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::REPORTS_FINANCIAL,
    params(ReportParams),
    responses(
        (status = 200, description = "Billing totals for the window", body = FinancialReport),
        (status = 400, description = "Invalid date range"),
        (status = 403, description = "Administrator role required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn financial(
    State(server): State<HmsServer>,
    Query(params): Query<ReportParams>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<FinancialReport>>, ApiError> {
    auth.require_admin()?;

    let today = Utc::now().date_naive();
    let window = ReportWindow::from_dates(params.from, params.to, today)?;
    let report = reporting::financial_report(&server, window, today).await?;
    Ok(Json(api_success(report)))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::REPORTS_CLINICAL,
    params(ReportParams),
    responses(
        (status = 200, description = "Patient, admission and appointment statistics", body = ClinicalReport),
        (status = 400, description = "Invalid date range"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "reports",
    security(("bearer_auth" = []))
)]
pub async fn clinical(
    State(server): State<HmsServer>,
    Query(params): Query<ReportParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<ClinicalReport>>, ApiError> {
    let today = Utc::now().date_naive();
    let window = ReportWindow::from_dates(params.from, params.to, today)?;
    let report = reporting::clinical_report(&server, window, today).await?;
    Ok(Json(api_success(report)))
}

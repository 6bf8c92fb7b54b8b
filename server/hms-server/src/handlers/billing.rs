use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use billing_service::{round_money, status_after_repricing, InvoiceInput, LineItem, PaymentMethod, PaymentStatus};
use chrono::{DateTime, NaiveDate, Utc};
use database_layer::{BillingRecord, InvoiceFilter, PricedInvoice, Room};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use ward_service::{stay_charge, StayCharge};

use crate::error::{api_success, ApiError, ApiResponse};
use crate::middleware::AuthContext;
use crate::server::HmsServer;
use crate::types::PaginationParams;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_uuid};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateInvoiceRequest {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    /// Adds a room stay line for this admission
    pub bed_assignment_id: Option<Uuid>,
    #[serde(default)]
    pub services: Vec<LineItem>,
    /// Percentage; falls back to the configured default
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub insurance_coverage: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl RequestValidation for CreateInvoiceRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_uuid!(self.patient_id, "Patient ID is required");
        validate_field!(
            self.services,
            !self.services.is_empty() || self.bed_assignment_id.is_some(),
            "Invoice must contain at least one line item"
        );
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateInvoiceRequest {
    /// Replaces every line item when present
    pub services: Option<Vec<LineItem>>,
    pub tax_rate: Option<Decimal>,
    pub discount: Option<Decimal>,
    pub insurance_coverage: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentRequest {
    pub amount: Decimal,
    pub method: PaymentMethod,
}

impl RequestValidation for PaymentRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(
            self.amount,
            round_money(self.amount) > Decimal::ZERO,
            "Payment amount must be at least 0.01"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListInvoicesParams {
    pub patient_id: Option<Uuid>,
    /// Effective status; `overdue` includes unpaid invoices past due
    pub status: Option<PaymentStatus>,
    /// Created at or after (RFC 3339)
    pub from: Option<DateTime<Utc>>,
    /// Created before (RFC 3339)
    pub to: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MarkOverdueResponse {
    pub updated: u64,
}

fn stay_line(room: &Room, charge: &StayCharge) -> LineItem {
    let unit = if charge.days == 1 { "day" } else { "days" };
    LineItem::new(
        format!("Room {} stay ({} {unit})", room.room_number, charge.days),
        Decimal::from(charge.days),
        charge.daily_rate,
    )
    .with_category("room")
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::INVOICES,
    params(ListInvoicesParams),
    responses(
        (status = 200, description = "Invoices retrieved successfully", body = Vec<BillingRecord>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn list_invoices(
    State(server): State<HmsServer>,
    Query(params): Query<ListInvoicesParams>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<Vec<BillingRecord>>>, ApiError> {
    let today = Utc::now().date_naive();
    let pagination = PaginationParams::new(params.page, params.page_size);
    let mut page = server
        .invoices
        .list(
            &InvoiceFilter {
                patient_id: params.patient_id,
                status: params.status,
                from: params.from,
                to: params.to,
                page: params.page,
                page_size: params.page_size,
            },
            today,
        )
        .await?;

    page.items = page
        .items
        .into_iter()
        .map(|record| record.with_effective_status(today))
        .collect();

    Ok(Json(pagination.wrap_page(page)))
}

/// Issue an invoice, optionally billing a bed assignment's room stay
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::INVOICES,
    request_body = CreateInvoiceRequest,
    responses(
        (status = 201, description = "Invoice created", body = BillingRecord),
        (status = 400, description = "Invalid line items or amounts"),
        (status = 404, description = "Patient or bed assignment not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn create_invoice(
    State(server): State<HmsServer>,
    auth: AuthContext,
    Json(req): Json<CreateInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BillingRecord>>), ApiError> {
    req.validate()?;

    let now = Utc::now();
    server.patients.get(req.patient_id).await?;

    let mut services = req.services;
    if let Some(assignment_id) = req.bed_assignment_id {
        let assignment = server.rooms.get_assignment(assignment_id).await?;
        if assignment.patient_id != req.patient_id {
            return Err(ApiError::validation("Bed assignment belongs to a different patient"));
        }
        let room = server.rooms.get_room_including_retired(assignment.room_id).await?;
        let charge = stay_charge(room.daily_rate, assignment.admission_date, assignment.discharge_date, now);
        services.push(stay_line(&room, &charge));
    }

    let tax_rate = server.billing.tax_rate_or_default(req.tax_rate);
    let discount = req.discount.unwrap_or(Decimal::ZERO);
    let insurance_coverage = req.insurance_coverage.unwrap_or(Decimal::ZERO);
    let totals = server.billing.compute_totals(&InvoiceInput {
        items: services.clone(),
        tax_rate,
        discount,
        insurance_coverage,
    })?;

    let priced = PricedInvoice {
        patient_id: req.patient_id,
        appointment_id: req.appointment_id,
        bed_assignment_id: req.bed_assignment_id,
        services,
        subtotal: totals.subtotal,
        tax_rate,
        tax_amount: totals.tax_amount,
        discount,
        insurance_coverage,
        total: totals.total,
        payment_status: server.billing.initial_status(&totals),
        due_date: Some(req.due_date.unwrap_or_else(|| server.billing.due_date(now.date_naive()))),
        notes: req.notes,
    };

    let invoice_number = server.billing.invoice_number(now);
    let record = server.invoices.create(&invoice_number, &priced).await?;

    server
        .audit
        .log_action(
            &auth,
            "create",
            "invoice",
            record.id,
            json!({ "invoice_number": record.invoice_number, "patient_id": record.patient_id, "total": record.total }),
        )
        .await;

    Ok((StatusCode::CREATED, Json(api_success(record))))
}

#[utoipa::path(
    get,
    path = crate::routes::paths::api_v1::INVOICE_BY_ID,
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice retrieved successfully", body = BillingRecord),
        (status = 404, description = "Invoice not found"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn get_invoice(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    _auth: AuthContext,
) -> Result<Json<ApiResponse<BillingRecord>>, ApiError> {
    let record = server.invoices.get(id).await?;
    Ok(Json(api_success(record.with_effective_status(Utc::now().date_naive()))))
}

/// Re-price an invoice; rejected once any payment has been recorded
#[utoipa::path(
    put,
    path = crate::routes::paths::api_v1::INVOICE_BY_ID,
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = UpdateInvoiceRequest,
    responses(
        (status = 200, description = "Invoice updated", body = BillingRecord),
        (status = 400, description = "Invalid line items or amounts"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice has payments or is cancelled"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn update_invoice(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<UpdateInvoiceRequest>,
) -> Result<Json<ApiResponse<BillingRecord>>, ApiError> {
    let billing = &server.billing;
    let record = server
        .invoices
        .update(id, |current| {
            let services = req.services.clone().unwrap_or_else(|| current.services.0.clone());
            let tax_rate = req.tax_rate.unwrap_or(current.tax_rate);
            let discount = req.discount.unwrap_or(current.discount);
            let insurance_coverage = req.insurance_coverage.unwrap_or(current.insurance_coverage);
            let totals = billing.compute_totals(&InvoiceInput {
                items: services.clone(),
                tax_rate,
                discount,
                insurance_coverage,
            })?;

            Ok(PricedInvoice {
                patient_id: current.patient_id,
                appointment_id: current.appointment_id,
                bed_assignment_id: current.bed_assignment_id,
                services,
                subtotal: totals.subtotal,
                tax_rate,
                tax_amount: totals.tax_amount,
                discount,
                insurance_coverage,
                total: totals.total,
                payment_status: status_after_repricing(totals.total),
                due_date: req.due_date.or(current.due_date),
                notes: req.notes.clone().or_else(|| current.notes.clone()),
            })
        })
        .await?;

    server
        .audit
        .log_action(&auth, "update", "invoice", id, json!({ "total": record.total }))
        .await;

    Ok(Json(api_success(record.with_effective_status(Utc::now().date_naive()))))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::INVOICE_PAYMENTS,
    params(("id" = Uuid, Path, description = "Invoice ID")),
    request_body = PaymentRequest,
    responses(
        (status = 200, description = "Payment recorded", body = BillingRecord),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice closed or payment exceeds balance"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn record_payment(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<ApiResponse<BillingRecord>>, ApiError> {
    req.validate()?;

    let now = Utc::now();
    let record = server.invoices.record_payment(id, req.amount, req.method, now).await?;

    server
        .audit
        .log_action(
            &auth,
            "payment",
            "invoice",
            id,
            json!({ "amount": req.amount, "method": req.method, "status": record.payment_status }),
        )
        .await;

    Ok(Json(api_success(record.with_effective_status(now.date_naive()))))
}

#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::INVOICE_CANCEL,
    params(("id" = Uuid, Path, description = "Invoice ID")),
    responses(
        (status = 200, description = "Invoice cancelled", body = BillingRecord),
        (status = 404, description = "Invoice not found"),
        (status = 409, description = "Invoice already has payments"),
        (status = 403, description = "Administrator role required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn cancel_invoice(
    State(server): State<HmsServer>,
    Path(id): Path<Uuid>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<BillingRecord>>, ApiError> {
    auth.require_admin()?;

    let record = server.invoices.cancel(id, Utc::now()).await?;
    server
        .audit
        .log_action(&auth, "cancel", "invoice", id, json!({ "invoice_number": record.invoice_number }))
        .await;

    Ok(Json(api_success(record)))
}

/// Persist `overdue` on unpaid invoices past their due date
#[utoipa::path(
    post,
    path = crate::routes::paths::api_v1::INVOICES_MARK_OVERDUE,
    responses(
        (status = 200, description = "Number of invoices marked overdue", body = MarkOverdueResponse),
        (status = 403, description = "Administrator role required"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "billing",
    security(("bearer_auth" = []))
)]
pub async fn mark_overdue(
    State(server): State<HmsServer>,
    auth: AuthContext,
) -> Result<Json<ApiResponse<MarkOverdueResponse>>, ApiError> {
    auth.require_admin()?;

    let updated = server.invoices.mark_overdue(Utc::now().date_naive()).await?;
    server
        .audit
        .log_action(&auth, "mark_overdue", "invoice", Uuid::nil(), json!({ "updated": updated }))
        .await;

    Ok(Json(api_success(MarkOverdueResponse { updated })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use ward_service::RoomType;

    fn room() -> Room {
        Room {
            id: Uuid::new_v4(),
            room_number: "4B-12".into(),
            room_type: RoomType::SemiPrivate,
            floor: 4,
            capacity: 2,
            daily_rate: dec!(180.00),
            department: Some("Cardiology".into()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_stay_line_bills_days_at_daily_rate() {
        let charge = StayCharge {
            days: 3,
            daily_rate: dec!(180.00),
            amount: dec!(540.00),
        };
        let line = stay_line(&room(), &charge);
        assert_eq!(line.description, "Room 4B-12 stay (3 days)");
        assert_eq!(line.amount(), dec!(540.00));
        assert_eq!(line.category.as_deref(), Some("room"));
    }

    #[test]
    fn test_invoice_needs_items_or_stay() {
        let mut req = CreateInvoiceRequest {
            patient_id: Uuid::new_v4(),
            appointment_id: None,
            bed_assignment_id: None,
            services: vec![],
            tax_rate: None,
            discount: None,
            insurance_coverage: None,
            due_date: None,
            notes: None,
        };
        assert!(req.validate().is_err());

        req.bed_assignment_id = Some(Uuid::new_v4());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_payment_must_be_positive() {
        let req = PaymentRequest {
            amount: Decimal::ZERO,
            method: PaymentMethod::Cash,
        };
        assert!(req.validate().is_err());

        let sub_cent = PaymentRequest {
            amount: dec!(0.001),
            method: PaymentMethod::Card,
        };
        assert!(sub_cent.validate().is_err());

        let one_cent = PaymentRequest {
            amount: dec!(0.01),
            method: PaymentMethod::Card,
        };
        assert!(one_cent.validate().is_ok());
    }
}

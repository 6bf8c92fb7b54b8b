use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::paths::docs;
use crate::server::HmsServer;

/// Main OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Authentication endpoints
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        // Patient endpoints
        crate::handlers::patients::list_patients,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::get_patient,
        crate::handlers::patients::update_patient,
        crate::handlers::patients::delete_patient,
        crate::handlers::patients::patient_summary,

        // Staff endpoints
        crate::handlers::staff::list_staff,
        crate::handlers::staff::list_doctors,
        crate::handlers::staff::create_staff,
        crate::handlers::staff::get_staff,
        crate::handlers::staff::update_staff,
        crate::handlers::staff::deactivate_staff,

        // Room and bed endpoints
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::create_room,
        crate::handlers::rooms::get_room,
        crate::handlers::rooms::update_room,
        crate::handlers::rooms::delete_room,
        crate::handlers::rooms::list_assignments,
        crate::handlers::rooms::assign_bed,
        crate::handlers::rooms::get_assignment,
        crate::handlers::rooms::discharge,
        crate::handlers::rooms::transfer_bed,

        // Appointment endpoints
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::book_appointment,
        crate::handlers::appointments::get_appointment,
        crate::handlers::appointments::update_appointment,
        crate::handlers::appointments::update_status,
        crate::handlers::appointments::delete_appointment,

        // Billing endpoints
        crate::handlers::billing::list_invoices,
        crate::handlers::billing::create_invoice,
        crate::handlers::billing::get_invoice,
        crate::handlers::billing::update_invoice,
        crate::handlers::billing::record_payment,
        crate::handlers::billing::cancel_invoice,
        crate::handlers::billing::mark_overdue,

        // Report endpoints
        crate::handlers::reports::operational,
        crate::handlers::reports::financial,
        crate::handlers::reports::clinical,

        // Audit endpoints
        crate::handlers::audit::entity_history,
    ),
    components(
        schemas(
            // Health schemas
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,

            // Authentication schemas
            crate::handlers::auth::LoginRequest,
            crate::handlers::auth::LoginResponse,

            // Registry schemas
            database_layer::Patient,
            database_layer::CreatePatient,
            database_layer::UpdatePatient,
            database_layer::Gender,
            crate::handlers::patients::PatientSummary,
            database_layer::StaffMember,
            database_layer::CreateStaff,
            database_layer::UpdateStaff,
            database_layer::StaffRole,
            database_layer::Shift,

            // Ward schemas
            database_layer::Room,
            database_layer::CreateRoom,
            database_layer::UpdateRoom,
            database_layer::RoomView,
            database_layer::BedAssignment,
            database_layer::CreateBedAssignment,
            database_layer::BedTransfer,
            crate::handlers::rooms::DischargeRequest,
            crate::handlers::rooms::TransferRequest,
            ward_service::RoomType,
            ward_service::OccupancyStatus,
            ward_service::RoomOccupancy,
            ward_service::BedSlot,

            // Scheduling schemas
            database_layer::Appointment,
            database_layer::CreateAppointment,
            database_layer::UpdateAppointment,
            crate::handlers::appointments::UpdateStatusRequest,
            scheduling_service::AppointmentStatus,

            // Billing schemas
            database_layer::BillingRecord,
            crate::handlers::billing::CreateInvoiceRequest,
            crate::handlers::billing::UpdateInvoiceRequest,
            crate::handlers::billing::PaymentRequest,
            crate::handlers::billing::MarkOverdueResponse,
            billing_service::LineItem,
            billing_service::PaymentStatus,
            billing_service::PaymentMethod,

            // Report schemas
            crate::services::OperationalReport,
            crate::services::FinancialReport,
            crate::services::ClinicalReport,

            // Audit schemas
            database_layer::AuditLog,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Service health and version"),
        (name = "auth", description = "Staff login and token introspection"),
        (name = "patients", description = "Patient registry"),
        (name = "staff", description = "Staff directory"),
        (name = "rooms", description = "Rooms and live bed occupancy"),
        (name = "bed-assignments", description = "Admissions, discharges and transfers"),
        (name = "appointments", description = "Outpatient appointment scheduling"),
        (name = "billing", description = "Invoices and payments"),
        (name = "reports", description = "Operational, financial and clinical dashboards"),
        (name = "audit", description = "Audit trail of write operations"),
    ),
    info(
        title = "WardLine HMS API",
        version = "1.0.0",
        description = "Hospital management API covering patients, staff, wards, appointments, billing and reporting.",
    ),
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by the secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create OpenAPI documentation routes
pub fn create_docs_routes() -> Router<HmsServer> {
    Router::new().merge(SwaggerUi::new(docs::SWAGGER_UI).url(docs::OPENAPI_JSON, ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_every_api_path() {
        let spec = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/v1/auth/login",
            "/api/v1/patients/{id}/summary",
            "/api/v1/bed-assignments/{id}/transfer",
            "/api/v1/appointments/{id}/status",
            "/api/v1/billing/invoices/mark-overdue",
            "/api/v1/reports/clinical",
            "/api/v1/audit-logs/{entity_type}/{entity_id}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let spec = ApiDoc::openapi();
        let components = spec.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}

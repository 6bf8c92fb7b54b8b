pub mod paths;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::{
    handlers::{appointments, audit, auth, billing, health, patients, reports, rooms, staff},
    openapi,
    server::HmsServer,
};

/// Create health check routes
pub fn health_routes() -> Router<HmsServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

/// Create authentication routes
pub fn auth_routes() -> Router<HmsServer> {
    Router::new()
        .route(paths::auth::LOGIN, post(auth::login))
        .route(paths::auth::ME, get(auth::me))
}

/// Create patient registry routes
pub fn patient_routes() -> Router<HmsServer> {
    Router::new()
        .route(
            paths::patients::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(
            paths::patients::PATIENT_BY_ID,
            get(patients::get_patient)
                .put(patients::update_patient)
                .delete(patients::delete_patient),
        )
        .route(paths::patients::PATIENT_SUMMARY, get(patients::patient_summary))
}

/// Create staff directory routes
pub fn staff_routes() -> Router<HmsServer> {
    Router::new()
        .route(paths::staff::STAFF, get(staff::list_staff).post(staff::create_staff))
        .route(paths::staff::DOCTORS, get(staff::list_doctors))
        .route(paths::staff::STAFF_BY_ID, get(staff::get_staff).put(staff::update_staff))
        .route(paths::staff::DEACTIVATE, post(staff::deactivate_staff))
}

/// Create room and bed assignment routes
pub fn room_routes() -> Router<HmsServer> {
    Router::new()
        // Rooms
        .route(paths::rooms::ROOMS, get(rooms::list_rooms).post(rooms::create_room))
        .route(
            paths::rooms::ROOM_BY_ID,
            get(rooms::get_room).put(rooms::update_room).delete(rooms::delete_room),
        )
        // Admissions
        .route(
            paths::rooms::ASSIGNMENTS,
            get(rooms::list_assignments).post(rooms::assign_bed),
        )
        .route(paths::rooms::ASSIGNMENT_BY_ID, get(rooms::get_assignment))
        .route(paths::rooms::DISCHARGE, post(rooms::discharge))
        .route(paths::rooms::TRANSFER, post(rooms::transfer_bed))
}

/// Create appointment scheduling routes
pub fn appointment_routes() -> Router<HmsServer> {
    Router::new()
        .route(
            paths::appointments::APPOINTMENTS,
            get(appointments::list_appointments).post(appointments::book_appointment),
        )
        .route(
            paths::appointments::APPOINTMENT_BY_ID,
            get(appointments::get_appointment)
                .put(appointments::update_appointment)
                .delete(appointments::delete_appointment),
        )
        .route(paths::appointments::STATUS, patch(appointments::update_status))
}

/// Create billing routes
pub fn billing_routes() -> Router<HmsServer> {
    Router::new()
        .route(
            paths::billing::INVOICES,
            get(billing::list_invoices).post(billing::create_invoice),
        )
        .route(paths::billing::MARK_OVERDUE, post(billing::mark_overdue))
        .route(
            paths::billing::INVOICE_BY_ID,
            get(billing::get_invoice).put(billing::update_invoice),
        )
        .route(paths::billing::PAYMENTS, post(billing::record_payment))
        .route(paths::billing::CANCEL, post(billing::cancel_invoice))
}

/// Create dashboard report routes
pub fn report_routes() -> Router<HmsServer> {
    Router::new()
        .route(paths::reports::OPERATIONAL, get(reports::operational))
        .route(paths::reports::FINANCIAL, get(reports::financial))
        .route(paths::reports::CLINICAL, get(reports::clinical))
}

/// Create audit trail routes
pub fn audit_routes() -> Router<HmsServer> {
    Router::new().route(paths::audit::ENTITY_HISTORY, get(audit::entity_history))
}

/// Create API v1 routes
pub fn api_v1_routes() -> Router<HmsServer> {
    Router::new()
        .merge(auth_routes())
        .merge(patient_routes())
        .merge(staff_routes())
        .merge(room_routes())
        .merge(appointment_routes())
        .merge(billing_routes())
        .merge(report_routes())
        .merge(audit_routes())
}

/// Create all application routes
pub fn create_routes() -> Router<HmsServer> {
    Router::new()
        // Health check routes (no authentication required)
        .merge(health_routes())
        // API documentation routes
        .merge(openapi::create_docs_routes())
        // API v1 routes (bearer token required except login)
        .nest(paths::API_V1, api_v1_routes())
}

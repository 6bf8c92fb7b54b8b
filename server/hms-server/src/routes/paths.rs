//! Route path constants
//!
//! Router paths use axum's `:param` syntax and are relative to their nest
//! point. The `api_v1` module repeats them as absolute OpenAPI paths with
//! `{param}` placeholders for the `#[utoipa::path]` annotations.

pub const API_V1: &str = "/api/v1";

pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

pub mod docs {
    pub const SWAGGER_UI: &str = "/swagger-ui";
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
}

pub mod auth {
    pub const LOGIN: &str = "/auth/login";
    pub const ME: &str = "/auth/me";
}

pub mod patients {
    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_BY_ID: &str = "/patients/:id";
    pub const PATIENT_SUMMARY: &str = "/patients/:id/summary";
}

pub mod staff {
    pub const STAFF: &str = "/staff";
    pub const DOCTORS: &str = "/staff/doctors";
    pub const STAFF_BY_ID: &str = "/staff/:id";
    pub const DEACTIVATE: &str = "/staff/:id/deactivate";
}

pub mod rooms {
    pub const ROOMS: &str = "/rooms";
    pub const ROOM_BY_ID: &str = "/rooms/:id";
    pub const ASSIGNMENTS: &str = "/bed-assignments";
    pub const ASSIGNMENT_BY_ID: &str = "/bed-assignments/:id";
    pub const DISCHARGE: &str = "/bed-assignments/:id/discharge";
    pub const TRANSFER: &str = "/bed-assignments/:id/transfer";
}

pub mod appointments {
    pub const APPOINTMENTS: &str = "/appointments";
    pub const APPOINTMENT_BY_ID: &str = "/appointments/:id";
    pub const STATUS: &str = "/appointments/:id/status";
}

pub mod billing {
    pub const INVOICES: &str = "/billing/invoices";
    pub const INVOICE_BY_ID: &str = "/billing/invoices/:id";
    pub const PAYMENTS: &str = "/billing/invoices/:id/payments";
    pub const CANCEL: &str = "/billing/invoices/:id/cancel";
    pub const MARK_OVERDUE: &str = "/billing/invoices/mark-overdue";
}

pub mod reports {
    pub const OPERATIONAL: &str = "/reports/operational";
    pub const FINANCIAL: &str = "/reports/financial";
    pub const CLINICAL: &str = "/reports/clinical";
}

pub mod audit {
    pub const ENTITY_HISTORY: &str = "/audit-logs/:entity_type/:entity_id";
}

/// Absolute paths for OpenAPI documentation
pub mod api_v1 {
    pub const AUTH_LOGIN: &str = "/api/v1/auth/login";
    pub const AUTH_ME: &str = "/api/v1/auth/me";

    pub const PATIENTS: &str = "/api/v1/patients";
    pub const PATIENT_BY_ID: &str = "/api/v1/patients/{id}";
    pub const PATIENT_SUMMARY: &str = "/api/v1/patients/{id}/summary";

    pub const STAFF: &str = "/api/v1/staff";
    pub const STAFF_DOCTORS: &str = "/api/v1/staff/doctors";
    pub const STAFF_BY_ID: &str = "/api/v1/staff/{id}";
    pub const STAFF_DEACTIVATE: &str = "/api/v1/staff/{id}/deactivate";

    pub const ROOMS: &str = "/api/v1/rooms";
    pub const ROOM_BY_ID: &str = "/api/v1/rooms/{id}";
    pub const BED_ASSIGNMENTS: &str = "/api/v1/bed-assignments";
    pub const BED_ASSIGNMENT_BY_ID: &str = "/api/v1/bed-assignments/{id}";
    pub const BED_ASSIGNMENT_DISCHARGE: &str = "/api/v1/bed-assignments/{id}/discharge";
    pub const BED_ASSIGNMENT_TRANSFER: &str = "/api/v1/bed-assignments/{id}/transfer";

    pub const APPOINTMENTS: &str = "/api/v1/appointments";
    pub const APPOINTMENT_BY_ID: &str = "/api/v1/appointments/{id}";
    pub const APPOINTMENT_STATUS: &str = "/api/v1/appointments/{id}/status";

    pub const INVOICES: &str = "/api/v1/billing/invoices";
    pub const INVOICE_BY_ID: &str = "/api/v1/billing/invoices/{id}";
    pub const INVOICE_PAYMENTS: &str = "/api/v1/billing/invoices/{id}/payments";
    pub const INVOICE_CANCEL: &str = "/api/v1/billing/invoices/{id}/cancel";
    pub const INVOICES_MARK_OVERDUE: &str = "/api/v1/billing/invoices/mark-overdue";

    pub const REPORTS_OPERATIONAL: &str = "/api/v1/reports/operational";
    pub const REPORTS_FINANCIAL: &str = "/api/v1/reports/financial";
    pub const REPORTS_CLINICAL: &str = "/api/v1/reports/clinical";

    pub const AUDIT_ENTITY_HISTORY: &str = "/api/v1/audit-logs/{entity_type}/{entity_id}";
}

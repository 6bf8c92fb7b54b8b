use chrono::{DateTime, Utc};
use std::sync::Arc;

use billing_service::{BillingPolicy, BillingService};
use database_layer::{
    AppointmentRepository, AuditRepository, BillingRepository, DatabasePool, PatientRepository, ReportRepository,
    RoomRepository, StaffRepository,
};

use crate::auth::{PasswordService, RevokedStaff, TokenService};
use crate::config::Settings;
use crate::error::ApiError;
use crate::services::AuditService;

/// Shared application state handed to every handler
#[derive(Clone, Debug)]
pub struct HmsServer {
    /// Loaded configuration
    pub config: Arc<Settings>,
    /// Database connection pool
    pub db: DatabasePool,
    pub patients: PatientRepository,
    pub staff: StaffRepository,
    pub rooms: RoomRepository,
    pub appointments: AppointmentRepository,
    pub invoices: BillingRepository,
    pub reports: ReportRepository,
    /// Audit trail writer
    pub audit: AuditService,
    /// Invoice pricing rules
    pub billing: BillingService,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordService,
    /// Deactivated staff, refused even with an unexpired token
    pub revoked: RevokedStaff,
    pub started_at: DateTime<Utc>,
}

impl HmsServer {
    /// Build the state from loaded settings and an already created pool
    pub fn new(settings: Settings, db: DatabasePool) -> Result<Self, ApiError> {
        let pool = db.pool().clone();

        let billing = BillingService::new(BillingPolicy {
            default_tax_rate: settings.billing.default_tax_rate,
            payment_terms_days: settings.billing.invoice_due_days,
        });
        let tokens = TokenService::new(&settings.auth.jwt_secret, settings.auth.token_ttl_minutes);

        Ok(Self {
            patients: PatientRepository::new(pool.clone()),
            staff: StaffRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool.clone()),
            appointments: AppointmentRepository::new(pool.clone()),
            invoices: BillingRepository::new(pool.clone()),
            reports: ReportRepository::new(pool.clone()),
            audit: AuditService::new(AuditRepository::new(pool)),
            billing,
            tokens: Arc::new(tokens),
            passwords: PasswordService::new()?,
            revoked: RevokedStaff::new(),
            config: Arc::new(settings),
            db,
            started_at: Utc::now(),
        })
    }
}

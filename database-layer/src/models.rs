// Database models
use billing_service::{InvoiceBalance, InvoiceSnapshot, LineItem, PaymentMethod, PaymentStatus};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use scheduling_service::{AppointmentStatus, BookedSlot, TimeSlot};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use std::fmt;
use utoipa::ToSchema;
use uuid::Uuid;
use ward_service::{AssignmentWindow, RoomType};

// ---------------------------------------------------------------------------
// Enumerations stored as Postgres enum types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "gender", rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    Unknown,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "staff_role", rename_all = "lowercase")]
pub enum StaffRole {
    Doctor,
    Nurse,
    Technician,
    Pharmacist,
    Receptionist,
    Administrator,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Doctor => "doctor",
            StaffRole::Nurse => "nurse",
            StaffRole::Technician => "technician",
            StaffRole::Pharmacist => "pharmacist",
            StaffRole::Receptionist => "receptionist",
            StaffRole::Administrator => "administrator",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "shift_type", rename_all = "lowercase")]
pub enum Shift {
    Day,
    Evening,
    Night,
    Rotating,
}

impl Shift {
    /// Day 07-15, evening 15-23, night 23-07; rotating staff always count
    pub fn covers_hour(&self, hour: u32) -> bool {
        match self {
            Shift::Day => (7..15).contains(&hour),
            Shift::Evening => (15..23).contains(&hour),
            Shift::Night => hour >= 23 || hour < 7,
            Shift::Rotating => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Patients
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct Patient {
    pub id: Uuid,
    /// Medical record number, `MRN-<YYYYMMDD>-<6 hex>`
    pub mrn: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Vec<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub medical_history: Option<String>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Whole years between `date_of_birth` and `on`
pub fn age_on(date_of_birth: NaiveDate, on: NaiveDate) -> i32 {
    let mut age = on.year() - date_of_birth.year();
    if (on.month(), on.day()) < (date_of_birth.month(), date_of_birth.day()) {
        age -= 1;
    }
    age.max(0)
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreatePatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub medical_history: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdatePatient {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,
    pub allergies: Option<Vec<String>>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub insurance_provider: Option<String>,
    pub insurance_policy_number: Option<String>,
    pub medical_history: Option<String>,
}

// ---------------------------------------------------------------------------
// Staff
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct StaffMember {
    pub id: Uuid,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub shift: Shift,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StaffMember {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateStaff {
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    pub role: StaffRole,
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub shift: Option<Shift>,
    /// Initial login password, stored as an Argon2id hash
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateStaff {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<StaffRole>,
    pub department: Option<String>,
    pub specialization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub shift: Option<Shift>,
    pub password: Option<String>,
}

// ---------------------------------------------------------------------------
// Rooms and bed assignments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct Room {
    pub id: Uuid,
    pub room_number: String,
    pub room_type: RoomType,
    pub floor: i32,
    pub capacity: i32,
    pub daily_rate: Decimal,
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateRoom {
    pub room_number: String,
    pub room_type: RoomType,
    pub floor: i32,
    pub capacity: i32,
    pub daily_rate: Decimal,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateRoom {
    pub room_number: Option<String>,
    pub room_type: Option<RoomType>,
    pub floor: Option<i32>,
    pub capacity: Option<i32>,
    pub daily_rate: Option<Decimal>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct BedAssignment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub room_id: Uuid,
    pub bed_number: i32,
    pub admission_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub admitting_doctor_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BedAssignment {
    pub fn window(&self) -> AssignmentWindow {
        AssignmentWindow {
            assignment_id: self.id,
            patient_id: self.patient_id,
            bed_number: self.bed_number,
            admission_date: self.admission_date,
            discharge_date: self.discharge_date,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBedAssignment {
    pub patient_id: Uuid,
    pub room_id: Uuid,
    pub bed_number: i32,
    /// Defaults to now
    pub admission_date: Option<DateTime<Utc>>,
    pub admitting_doctor_id: Option<Uuid>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Appointments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct Appointment {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
    pub status: AppointmentStatus,
    pub cancellation_reason: Option<String>,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            start: self.scheduled_at,
            duration_minutes: self.duration_minutes,
        }
    }

    pub fn booked_slot(&self) -> BookedSlot {
        BookedSlot {
            appointment_id: self.id,
            slot: self.slot(),
            status: self.status,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAppointment {
    pub patient_id: Uuid,
    pub doctor_id: Uuid,
    pub department: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default = "default_duration")]
    pub duration_minutes: i32,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

fn default_duration() -> i32 {
    30
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateAppointment {
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_minutes: Option<i32>,
    pub department: Option<String>,
    pub reason: Option<String>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Billing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct BillingRecord {
    pub id: Uuid,
    pub invoice_number: String,
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub bed_assignment_id: Option<Uuid>,
    #[schema(value_type = Vec<LineItem>)]
    pub services: Json<Vec<LineItem>>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub insurance_coverage: Decimal,
    pub total: Decimal,
    pub amount_paid: Decimal,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub due_date: Option<NaiveDate>,
    pub paid_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BillingRecord {
    pub fn balance(&self) -> InvoiceBalance {
        InvoiceBalance {
            total: self.total,
            amount_paid: self.amount_paid,
            status: self.payment_status,
        }
    }

    /// Replace the stored status with the one callers should see
    pub fn with_effective_status(mut self, today: NaiveDate) -> Self {
        self.payment_status = billing_service::effective_status(self.payment_status, self.due_date, today);
        self
    }

    pub fn snapshot(&self) -> InvoiceSnapshot {
        InvoiceSnapshot {
            total: self.total,
            amount_paid: self.amount_paid,
            discount: self.discount,
            insurance_coverage: self.insurance_coverage,
            status: self.payment_status,
            created_at: self.created_at,
        }
    }
}

/// Fully priced invoice ready to insert or overwrite
#[derive(Debug, Clone)]
pub struct PricedInvoice {
    pub patient_id: Uuid,
    pub appointment_id: Option<Uuid>,
    pub bed_assignment_id: Option<Uuid>,
    pub services: Vec<LineItem>,
    pub subtotal: Decimal,
    pub tax_rate: Decimal,
    pub tax_amount: Decimal,
    pub discount: Decimal,
    pub insurance_coverage: Decimal,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, ToSchema, FromRow)]
pub struct AuditLog {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_on_birthday_boundary() {
        let dob = NaiveDate::from_ymd_opt(1990, 6, 15).unwrap();
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 6, 14).unwrap()), 35);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(2026, 6, 15).unwrap()), 36);
        assert_eq!(age_on(dob, NaiveDate::from_ymd_opt(1980, 1, 1).unwrap()), 0);
    }

    #[test]
    fn test_shift_coverage() {
        assert!(Shift::Day.covers_hour(7));
        assert!(!Shift::Day.covers_hour(15));
        assert!(Shift::Evening.covers_hour(22));
        assert!(Shift::Night.covers_hour(23));
        assert!(Shift::Night.covers_hour(3));
        assert!(!Shift::Night.covers_hour(7));
        assert!((0..24).all(|h| Shift::Rotating.covers_hour(h)));
    }

    #[test]
    fn test_create_appointment_default_duration() {
        let json = serde_json::json!({
            "patient_id": Uuid::new_v4(),
            "doctor_id": Uuid::new_v4(),
            "scheduled_at": "2026-08-01T09:00:00Z"
        });
        let req: CreateAppointment = serde_json::from_value(json).unwrap();
        assert_eq!(req.duration_minutes, 30);
    }

    #[test]
    fn test_staff_password_hash_not_serialized() {
        let member = StaffMember {
            id: Uuid::new_v4(),
            employee_code: "EMP-001".into(),
            first_name: "Ada".into(),
            last_name: "Okafor".into(),
            role: StaffRole::Doctor,
            department: Some("cardiology".into()),
            specialization: None,
            email: "ada@example.org".into(),
            phone: None,
            license_number: None,
            shift: Shift::Day,
            password_hash: Some("$argon2id$v=19$secret".into()),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&member).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "doctor");
        assert_eq!(member.full_name(), "Ada Okafor");
    }
}

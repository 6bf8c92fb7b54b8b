//! Round-trip tests against a live PostgreSQL
//!
//! Run with `DATABASE_URL=postgres://... cargo test -p database-layer -- --ignored`.
//! Each test creates its own rows with unique identifiers, so they can share
//! one database.

use billing_service::{LineItem, PaymentMethod, PaymentStatus};
use chrono::{Duration, NaiveDate, Utc};
use database_layer::{
    AppointmentRepository, BillingRepository, CreateAppointment, CreateBedAssignment, CreatePatient,
    CreateRoom, CreateStaff, DatabaseError, DatabasePool, PatientRepository, PoolSettings, PricedInvoice,
    RoomRepository, StaffRepository, StaffRole,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scheduling_service::{AppointmentStatus, SchedulingError};
use uuid::Uuid;
use ward_service::{stay_charge, OccupancyStatus, RoomType, WardError};

async fn connect() -> DatabasePool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for ignored tests");
    let db = DatabasePool::connect(&url, &PoolSettings::default()).await.unwrap();
    db.migrate().await.unwrap();
    db
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

async fn new_patient(repo: &PatientRepository) -> Uuid {
    let input = CreatePatient {
        first_name: "Grace".into(),
        last_name: "Mwangi".into(),
        date_of_birth: NaiveDate::from_ymd_opt(1984, 3, 9).unwrap(),
        gender: None,
        phone: None,
        email: None,
        address: None,
        blood_type: None,
        allergies: vec!["penicillin".into()],
        emergency_contact_name: None,
        emergency_contact_phone: None,
        insurance_provider: None,
        insurance_policy_number: None,
        medical_history: None,
    };
    repo.create(&unique("MRN"), &input).await.unwrap().id
}

async fn new_doctor(repo: &StaffRepository) -> Uuid {
    let input = CreateStaff {
        employee_code: unique("EMP"),
        first_name: "Tomas".into(),
        last_name: "Reyes".into(),
        role: StaffRole::Doctor,
        department: Some("cardiology".into()),
        specialization: None,
        email: format!("{}@wardline.test", unique("doc")),
        phone: None,
        license_number: None,
        shift: None,
        password: None,
    };
    repo.create(&input, None).await.unwrap().id
}

#[tokio::test]
#[ignore]
async fn test_bed_assignment_rules() {
    let db = connect().await;
    let patients = PatientRepository::new(db.pool().clone());
    let rooms = RoomRepository::new(db.pool().clone());
    let now = Utc::now();

    let room = rooms
        .create_room(&CreateRoom {
            room_number: unique("R"),
            room_type: RoomType::SemiPrivate,
            floor: 2,
            capacity: 2,
            daily_rate: dec!(150.00),
            department: None,
        })
        .await
        .unwrap();
    let first = new_patient(&patients).await;
    let second = new_patient(&patients).await;

    let assign = |patient_id, bed_number| CreateBedAssignment {
        patient_id,
        room_id: room.id,
        bed_number,
        admission_date: None,
        admitting_doctor_id: None,
        notes: None,
    };

    let assignment = rooms.assign_bed(&assign(first, 1), now).await.unwrap();

    let taken = rooms.assign_bed(&assign(second, 1), now).await.unwrap_err();
    assert!(matches!(taken, DatabaseError::Ward(WardError::BedOccupied(1))));

    let out_of_range = rooms.assign_bed(&assign(second, 3), now).await.unwrap_err();
    assert!(matches!(out_of_range, DatabaseError::Ward(WardError::BedOutOfRange { .. })));

    let twice = rooms.assign_bed(&assign(first, 2), now).await.unwrap_err();
    assert!(matches!(twice, DatabaseError::Ward(WardError::PatientAlreadyAdmitted)));

    // Backdating before the current occupant's admission still collides
    let mut backdated = assign(second, 1);
    backdated.admission_date = Some(now - Duration::days(2));
    let backdated = rooms.assign_bed(&backdated, now).await.unwrap_err();
    assert!(matches!(backdated, DatabaseError::Ward(WardError::BedOccupied(1))));

    let mut earlier_elsewhere = assign(first, 2);
    earlier_elsewhere.admission_date = Some(now - Duration::days(2));
    let earlier_elsewhere = rooms.assign_bed(&earlier_elsewhere, now).await.unwrap_err();
    assert!(matches!(earlier_elsewhere, DatabaseError::Ward(WardError::PatientAlreadyAdmitted)));

    let view = rooms.get_room_view(room.id, now).await.unwrap();
    assert_eq!(view.occupancy.status, OccupancyStatus::Partial);
    assert_eq!(view.occupancy.occupied_beds, 1);

    let later = now + Duration::seconds(1);
    rooms.discharge(assignment.id, None, later).await.unwrap();
    let again = rooms.discharge(assignment.id, None, later).await.unwrap_err();
    assert!(matches!(again, DatabaseError::Ward(WardError::AlreadyDischarged)));

    let view = rooms.get_room_view(room.id, later).await.unwrap();
    assert_eq!(view.occupancy.status, OccupancyStatus::Available);
}

#[tokio::test]
#[ignore]
async fn test_stay_in_retired_room_is_billable() {
    let db = connect().await;
    let patients = PatientRepository::new(db.pool().clone());
    let rooms = RoomRepository::new(db.pool().clone());
    let billing = BillingRepository::new(db.pool().clone());
    let now = Utc::now();

    let room = rooms
        .create_room(&CreateRoom {
            room_number: unique("R"),
            room_type: RoomType::Private,
            floor: 3,
            capacity: 1,
            daily_rate: dec!(200.00),
            department: None,
        })
        .await
        .unwrap();
    let patient_id = new_patient(&patients).await;

    let admitted = now - Duration::days(3);
    let stay = rooms
        .assign_bed(
            &CreateBedAssignment {
                patient_id,
                room_id: room.id,
                bed_number: 1,
                admission_date: Some(admitted),
                admitting_doctor_id: None,
                notes: None,
            },
            now,
        )
        .await
        .unwrap();
    let stay = rooms.discharge(stay.id, Some(now - Duration::days(1)), now).await.unwrap();
    rooms.delete_room(room.id, now).await.unwrap();

    assert!(matches!(rooms.get_room(room.id).await, Err(DatabaseError::NotFound(_))));
    let retired = rooms.get_room_including_retired(stay.room_id).await.unwrap();
    assert!(!retired.is_active);

    let charge = stay_charge(retired.daily_rate, stay.admission_date, stay.discharge_date, now);
    assert_eq!(charge.days, 2);
    assert_eq!(charge.amount, dec!(400.00));

    let invoice = billing
        .create(
            &unique("INV"),
            &PricedInvoice {
                patient_id,
                appointment_id: None,
                bed_assignment_id: Some(stay.id),
                services: vec![LineItem::new("Room stay", Decimal::from(charge.days), retired.daily_rate)],
                subtotal: charge.amount,
                tax_rate: dec!(0),
                tax_amount: dec!(0),
                discount: dec!(0),
                insurance_coverage: dec!(0),
                total: charge.amount,
                payment_status: PaymentStatus::Pending,
                due_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(invoice.bed_assignment_id, Some(stay.id));
    assert_eq!(invoice.total, dec!(400.00));
}

#[tokio::test]
#[ignore]
async fn test_booking_rejects_overlap() {
    let db = connect().await;
    let patients = PatientRepository::new(db.pool().clone());
    let staff = StaffRepository::new(db.pool().clone());
    let appointments = AppointmentRepository::new(db.pool().clone());
    let now = Utc::now();

    let patient_id = new_patient(&patients).await;
    let doctor_id = new_doctor(&staff).await;
    let start = now + Duration::days(3);

    let booking = |scheduled_at| CreateAppointment {
        patient_id,
        doctor_id,
        department: None,
        scheduled_at,
        duration_minutes: 30,
        reason: None,
        notes: None,
    };

    let first = appointments.book(&booking(start), now).await.unwrap();
    assert_eq!(first.department.as_deref(), Some("cardiology"));

    let clash = appointments.book(&booking(start + Duration::minutes(15)), now).await.unwrap_err();
    assert!(matches!(clash, DatabaseError::Scheduling(SchedulingError::SlotConflict)));

    // Back-to-back slots do not overlap
    appointments.book(&booking(start + Duration::minutes(30)), now).await.unwrap();

    let cancelled = appointments
        .update_status(first.id, AppointmentStatus::Cancelled, Some("patient request".into()), now)
        .await
        .unwrap();
    assert_eq!(cancelled.cancellation_reason.as_deref(), Some("patient request"));

    // The cancelled slot is free again
    appointments.book(&booking(start), now).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_invoice_payments() {
    let db = connect().await;
    let patients = PatientRepository::new(db.pool().clone());
    let billing = BillingRepository::new(db.pool().clone());
    let now = Utc::now();

    let patient_id = new_patient(&patients).await;
    let invoice = billing
        .create(
            &unique("INV"),
            &PricedInvoice {
                patient_id,
                appointment_id: None,
                bed_assignment_id: None,
                services: vec![LineItem::new("Consultation", dec!(1), dec!(100.00))],
                subtotal: dec!(100.00),
                tax_rate: dec!(0),
                tax_amount: dec!(0),
                discount: dec!(0),
                insurance_coverage: dec!(0),
                total: dec!(100.00),
                payment_status: PaymentStatus::Pending,
                due_date: None,
                notes: None,
            },
        )
        .await
        .unwrap();

    let partial = billing.record_payment(invoice.id, dec!(40.00), PaymentMethod::Cash, now).await.unwrap();
    assert_eq!(partial.payment_status, PaymentStatus::PartiallyPaid);
    assert_eq!(patients.outstanding_balance(patient_id).await.unwrap(), dec!(60.00));

    assert!(billing.cancel(invoice.id, now).await.is_err());

    let paid = billing.record_payment(invoice.id, dec!(60.00), PaymentMethod::Card, now).await.unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);
    assert!(paid.paid_at.is_some());

    let extra = billing.record_payment(invoice.id, dec!(1.00), PaymentMethod::Cash, now).await;
    assert!(matches!(extra, Err(DatabaseError::Billing(_))));
}

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DatabaseResult, OptionalExt};
use crate::models::{CreatePatient, Gender, Patient, UpdatePatient};
use crate::query::{Page, PaginatedQuery};

const SEARCH_COLUMNS: [&str; 4] = ["first_name", "last_name", "mrn", "phone"];

#[derive(Debug, Clone, Default)]
pub struct PatientFilter {
    pub search: Option<String>,
    pub gender: Option<Gender>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Repository for patient records
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: Pool<Postgres>,
}

impl PatientRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, mrn: &str, input: &CreatePatient) -> DatabaseResult<Patient> {
        let patient = sqlx::query_as::<_, Patient>(
            r#"
            INSERT INTO patients (
                id, mrn, first_name, last_name, date_of_birth, gender, phone, email,
                address, blood_type, allergies, emergency_contact_name,
                emergency_contact_phone, insurance_provider, insurance_policy_number,
                medical_history
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(mrn)
        .bind(input.first_name.trim())
        .bind(input.last_name.trim())
        .bind(input.date_of_birth)
        .bind(input.gender.unwrap_or(Gender::Unknown))
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.blood_type)
        .bind(&input.allergies)
        .bind(&input.emergency_contact_name)
        .bind(&input.emergency_contact_phone)
        .bind(&input.insurance_provider)
        .bind(&input.insurance_policy_number)
        .bind(&input.medical_history)
        .fetch_one(&self.pool)
        .await?;

        debug!(patient_id = %patient.id, "Patient created");
        Ok(patient)
    }

    pub async fn get(&self, id: Uuid) -> DatabaseResult<Patient> {
        sqlx::query_as::<_, Patient>("SELECT * FROM patients WHERE id = $1 AND is_deleted = false")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .or_not_found("Patient")
    }

    pub async fn update(&self, id: Uuid, input: &UpdatePatient) -> DatabaseResult<Patient> {
        sqlx::query_as::<_, Patient>(
            r#"
            UPDATE patients
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                date_of_birth = COALESCE($4, date_of_birth),
                gender = COALESCE($5, gender),
                phone = COALESCE($6, phone),
                email = COALESCE($7, email),
                address = COALESCE($8, address),
                blood_type = COALESCE($9, blood_type),
                allergies = COALESCE($10, allergies),
                emergency_contact_name = COALESCE($11, emergency_contact_name),
                emergency_contact_phone = COALESCE($12, emergency_contact_phone),
                insurance_provider = COALESCE($13, insurance_provider),
                insurance_policy_number = COALESCE($14, insurance_policy_number),
                medical_history = COALESCE($15, medical_history),
                updated_at = $16
            WHERE id = $1 AND is_deleted = false
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.first_name.as_deref().map(str::trim))
        .bind(input.last_name.as_deref().map(str::trim))
        .bind(input.date_of_birth)
        .bind(input.gender)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .bind(&input.blood_type)
        .bind(&input.allergies)
        .bind(&input.emergency_contact_name)
        .bind(&input.emergency_contact_phone)
        .bind(&input.insurance_provider)
        .bind(&input.insurance_policy_number)
        .bind(&input.medical_history)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?
        .or_not_found("Patient")
    }

    /// Soft delete
    pub async fn delete(&self, id: Uuid) -> DatabaseResult<()> {
        let result = sqlx::query(
            "UPDATE patients SET is_deleted = true, updated_at = $2 WHERE id = $1 AND is_deleted = false",
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(crate::error::DatabaseError::not_found("Patient"));
        }
        Ok(())
    }

    pub async fn list(&self, filter: &PatientFilter) -> DatabaseResult<Page<Patient>> {
        let mut count = PaginatedQuery::new("SELECT COUNT(*) FROM patients WHERE 1=1");
        apply_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut query = PaginatedQuery::new("SELECT * FROM patients WHERE 1=1");
        apply_filter(&mut query, filter);
        query
            .order_by("last_name, first_name", "ASC")
            .paginate(filter.page, filter.page_size);
        let items = query.build_query_as::<Patient>().fetch_all(&self.pool).await?;

        Ok(Page {
            items,
            total,
            page: query.page(),
            page_size: query.page_size(),
        })
    }

    /// Sum of unpaid balances across the patient's open invoices
    pub async fn outstanding_balance(&self, id: Uuid) -> DatabaseResult<Decimal> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            r#"
            SELECT SUM(GREATEST(total - amount_paid, 0))
            FROM billing_records
            WHERE patient_id = $1 AND payment_status NOT IN ('paid', 'cancelled')
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    pub async fn mrn_exists(&self, mrn: &str) -> DatabaseResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM patients WHERE mrn = $1)")
            .bind(mrn)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

fn apply_filter(query: &mut PaginatedQuery<'_>, filter: &PatientFilter) {
    query
        .filter_not_deleted()
        .filter_eq("gender", filter.gender)
        .filter_search(&SEARCH_COLUMNS, filter.search.as_deref());
}

use chrono::{DateTime, Utc};
use database_layer::PatientRepository;
use uuid::Uuid;

use crate::error::ApiError;

const MRN_ATTEMPTS: usize = 5;

/// `MRN-<YYYYMMDD>-<6 hex>`
pub fn generate_mrn(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "MRN-{}-{}",
        now.format("%Y%m%d"),
        suffix.get(..6).unwrap_or(&suffix).to_uppercase()
    )
}

/// Generate an MRN not yet present in the patients table
pub async fn unique_mrn(patients: &PatientRepository, now: DateTime<Utc>) -> Result<String, ApiError> {
    for _ in 0..MRN_ATTEMPTS {
        let mrn = generate_mrn(now);
        if !patients.mrn_exists(&mrn).await? {
            return Ok(mrn);
        }
        tracing::debug!(mrn = %mrn, "MRN collision, regenerating");
    }
    Err(ApiError::internal("Could not allocate a unique medical record number"))
}

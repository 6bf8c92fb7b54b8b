use billing_service::BillingError;
use scheduling_service::SchedulingError;
use thiserror::Error;
use ward_service::WardError;

/// Postgres `unique_violation`
const UNIQUE_VIOLATION: &str = "23505";
/// Postgres `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Migration error: {0}")]
    MigrationError(String),

    #[error(transparent)]
    Ward(#[from] WardError),

    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error(transparent)]
    Billing(#[from] BillingError),

    #[error("Database error: {0}")]
    SqlxError(sqlx::Error),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    let what = db_err.constraint().unwrap_or("unique constraint");
                    return DatabaseError::Conflict(format!("Duplicate value violates {what}"));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    let what = db_err.constraint().unwrap_or("foreign key");
                    return DatabaseError::Conflict(format!("Referenced record does not exist ({what})"));
                }
                _ => {}
            }
        }
        DatabaseError::SqlxError(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DatabaseError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DatabaseError::MigrationError(err.to_string())
    }
}

impl DatabaseError {
    pub fn not_found(what: impl Into<String>) -> Self {
        DatabaseError::NotFound(what.into())
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;

/// Turn an empty `fetch_optional` into `NotFound`
pub trait OptionalExt<T> {
    fn or_not_found(self, what: &str) -> DatabaseResult<T>;
}

impl<T> OptionalExt<T> for Option<T> {
    fn or_not_found(self, what: &str) -> DatabaseResult<T> {
        self.ok_or_else(|| DatabaseError::not_found(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_plain_sqlx_error() {
        let err: DatabaseError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DatabaseError::SqlxError(_)));
    }

    #[test]
    fn test_or_not_found() {
        let missing: Option<u8> = None;
        let err = missing.or_not_found("Patient").unwrap_err();
        assert_eq!(err.to_string(), "Patient not found");
        assert_eq!(Some(3u8).or_not_found("Patient").unwrap(), 3);
    }

    #[test]
    fn test_domain_errors_convert() {
        let err: DatabaseError = WardError::RoomOccupied.into();
        assert_eq!(err.to_string(), "Room still has occupied beds");
    }
}

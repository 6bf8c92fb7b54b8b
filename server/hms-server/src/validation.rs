//! Request validation utilities
//!
//! Create/update payloads implement [`RequestValidation`]; handlers call
//! `req.validate()?` before touching the database. The macros return early
//! with an [`ApiError::Validation`](crate::error::ApiError).

use crate::error::ApiError;

/// Trait for validating request payloads
pub trait RequestValidation {
    /// Returns `Err(ApiError::Validation)` describing the first failing rule
    fn validate(&self) -> Result<(), ApiError>;
}

/// Validate a field with a custom predicate
///
/// ```rust,ignore
/// validate_field!(self.capacity, self.capacity >= 1, "Capacity must be at least 1");
/// ```
#[macro_export]
macro_rules! validate_field {
    ($field:expr, $predicate:expr, $message:expr) => {
        if !$predicate {
            return Err($crate::error::ApiError::validation($message));
        }
    };
}

/// Required, non-blank string
#[macro_export]
macro_rules! validate_required {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.trim().is_empty(), $message);
    };
}

/// Non-nil UUID
#[macro_export]
macro_rules! validate_uuid {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, !$field.is_nil(), $message);
    };
}

/// String length in characters, after trimming
#[macro_export]
macro_rules! validate_length {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        let len = $field.trim().chars().count();
        $crate::validate_field!($field, len >= $min && len <= $max, $message);
    };
}

/// Basic email shape: `local@domain.tld`
#[macro_export]
macro_rules! validate_email {
    ($field:expr, $message:expr) => {
        $crate::validate_field!($field, $crate::validation::looks_like_email(&$field), $message);
    };
}

/// Numeric range, inclusive
#[macro_export]
macro_rules! validate_range {
    ($field:expr, $min:expr, $max:expr, $message:expr) => {
        $crate::validate_field!($field, $field >= $min && $field <= $max, $message);
    };
}

pub fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|part| !part.is_empty())
        && !value.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    struct TestRequest {
        name: String,
        email: String,
        capacity: i32,
        room_id: Uuid,
    }

    impl RequestValidation for TestRequest {
        fn validate(&self) -> Result<(), ApiError> {
            validate_required!(self.name, "Name is required");
            validate_length!(self.name, 1, 100, "Name must be between 1 and 100 characters");
            validate_email!(self.email, "Invalid email format");
            validate_range!(self.capacity, 1, 50, "Capacity must be between 1 and 50");
            validate_uuid!(self.room_id, "Room ID is required");
            Ok(())
        }
    }

    fn valid() -> TestRequest {
        TestRequest {
            name: "Ward 4B".into(),
            email: "ward4b@hospital.org".into(),
            capacity: 4,
            room_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_each_rule_rejects() {
        let mut req = valid();
        req.name = "   ".into();
        assert!(matches!(req.validate(), Err(ApiError::Validation { .. })));

        let mut req = valid();
        req.name = "x".repeat(101);
        assert!(req.validate().is_err());

        let mut req = valid();
        req.email = "not-an-email".into();
        assert!(req.validate().is_err());

        let mut req = valid();
        req.capacity = 0;
        assert!(req.validate().is_err());

        let mut req = valid();
        req.room_id = Uuid::nil();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_email_shape() {
        assert!(looks_like_email("a.b@c.org"));
        assert!(!looks_like_email("a@b"));
        assert!(!looks_like_email("@b.org"));
        assert!(!looks_like_email("a@@b.org"));
        assert!(!looks_like_email("a b@c.org"));
        assert!(!looks_like_email("a@b..org"));
    }
}

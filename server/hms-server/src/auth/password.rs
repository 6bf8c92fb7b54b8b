//! Argon2id password hashing
//!
//! Hashing is CPU-bound, so both operations run on the blocking pool.
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::error::ApiError;

pub const MIN_PASSWORD_LENGTH: usize = 10;

#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl PasswordService {
    /// Argon2id with 19 MiB memory, 2 iterations, 1 lane
    pub fn new() -> Result<Self, ApiError> {
        let params = Params::new(19_456, 2, 1, Some(32))
            .map_err(|e| ApiError::internal(format!("Failed to build Argon2 params: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    pub async fn hash(&self, password: &str) -> Result<String, ApiError> {
        validate_password_strength(password)?;

        let password = password.to_string();
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))
        })
        .await
        .map_err(|e| ApiError::internal(format!("Password hashing task failed: {e}")))?
    }

    pub async fn verify(&self, password: &str, hash: &str) -> Result<bool, ApiError> {
        let password = password.to_string();
        let hash = hash.to_string();
        let argon2 = self.argon2.clone();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&hash)
                .map_err(|e| ApiError::internal(format!("Failed to parse password hash: {e}")))?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(ApiError::internal(format!("Password verification error: {e}"))),
            }
        })
        .await
        .map_err(|e| ApiError::internal(format!("Password verification task failed: {e}")))?
    }
}

impl std::fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PasswordService(argon2id)")
    }
}

pub fn validate_password_strength(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }
    let has_letter = password.chars().any(char::is_alphabetic);
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !has_letter || !has_digit {
        return Err(ApiError::validation("Password must contain letters and digits"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_and_verify() {
        let service = PasswordService::new().unwrap();
        let hash = service.hash("ward-round-2026").await.unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(service.verify("ward-round-2026", &hash).await.unwrap());
        assert!(!service.verify("ward-round-2027", &hash).await.unwrap());
    }

    #[test]
    fn test_password_strength() {
        assert!(validate_password_strength("short1").is_err());
        assert!(validate_password_strength("onlyletterslong").is_err());
        assert!(validate_password_strength("letters4andnumbers").is_ok());
    }
}

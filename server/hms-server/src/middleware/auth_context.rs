//! Authentication context extraction
//!
//! Handlers take an [`AuthContext`] argument to require a valid bearer token.
//! The extractor rejects with 401 before the handler body runs.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use database_layer::StaffRole;
use uuid::Uuid;

use crate::auth::TokenClaims;
use crate::error::ApiError;
use crate::server::HmsServer;

/// Authenticated staff member, taken from the JWT claims
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: StaffRole,
    pub email: String,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: StaffRole, email: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            email: email.into(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == StaffRole::Administrator
    }

    /// Fail with 403 unless the caller holds one of `roles`
    pub fn require_role(&self, roles: &[StaffRole]) -> Result<(), ApiError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ApiError::authorization(format!(
                "Role '{}' is not permitted to perform this operation",
                self.role
            )))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require_role(&[StaffRole::Administrator])
    }
}

impl From<TokenClaims> for AuthContext {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.sub,
            role: claims.role,
            email: claims.email,
        }
    }
}

#[async_trait]
impl FromRequestParts<HmsServer> for AuthContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &HmsServer) -> Result<Self, Self::Rejection> {
        let token = extract_token(parts)?;
        let claims = state.tokens.verify(token)?;
        if state.revoked.is_revoked(claims.sub).await {
            return Err(ApiError::authentication("Account is deactivated"));
        }
        Ok(claims.into())
    }
}

fn extract_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts_with(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/patients");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_bearer_token() {
        let parts = parts_with(Some("Bearer abc.def.ghi"));
        assert_eq!(extract_token(&parts).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_missing_or_malformed_header() {
        assert!(matches!(extract_token(&parts_with(None)), Err(ApiError::Authentication { .. })));
        assert!(extract_token(&parts_with(Some("Basic dXNlcjpwYXNz"))).is_err());
        assert!(extract_token(&parts_with(Some("Bearer   "))).is_err());
    }

    #[test]
    fn test_role_checks() {
        let nurse = AuthContext::new(Uuid::new_v4(), StaffRole::Nurse, "n@wardline.test");
        assert!(nurse.require_admin().is_err());
        assert!(nurse.require_role(&[StaffRole::Doctor, StaffRole::Nurse]).is_ok());

        let admin = AuthContext::new(Uuid::new_v4(), StaffRole::Administrator, "a@wardline.test");
        assert!(admin.is_admin());
        assert!(admin.require_admin().is_ok());
    }
}

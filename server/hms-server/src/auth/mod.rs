//! Staff authentication: Argon2id password hashes and HS256 access tokens

pub mod password;
pub mod revocation;
pub mod tokens;

pub use password::PasswordService;
pub use revocation::RevokedStaff;
pub use tokens::{TokenClaims, TokenService};

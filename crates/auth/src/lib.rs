//! `taskhub-auth`: token issuance, verification and credential primitives.
//!
//! This crate is intentionally decoupled from HTTP and storage: resolving a
//! verified token to a live user record happens in `taskhub-infra`.

pub mod bearer;
pub mod claims;
pub mod config;
pub mod error;
pub mod issuer;
pub mod password;
pub mod principal;
pub mod validator;

pub use bearer::parse_bearer;
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use config::AuthConfig;
pub use error::TokenError;
pub use issuer::{IssuedToken, TokenIssuer, TokenSubject};
pub use password::{MIN_PASSWORD_COST, PasswordError, hash_password, verify_password};
pub use principal::Principal;
pub use validator::{Hs256JwtValidator, JwtValidator};

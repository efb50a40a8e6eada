use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JWT claims model.
///
/// Time claims are Unix seconds so the token stays interoperable with
/// standard JWT tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject: the user identifier.
    pub sub: String,

    pub email: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,

    pub is_active: bool,

    /// Token identifier. The user record stores the identifier of the single
    /// active token; anything else is revoked.
    pub jti: String,

    pub iss: String,

    /// Issued-at (seconds).
    pub iat: i64,

    /// Not-before (seconds).
    pub nbf: i64,

    /// Expiration (seconds).
    pub exp: i64,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the time window of decoded claims.
///
/// Signature and algorithm checks happen while decoding; this only looks at
/// `iat`/`nbf`/`exp` against `now`.
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    let now = now.timestamp();
    if now < claims.nbf {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

//! Access token issuance (HS256).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use uuid::Uuid;

use crate::claims::JwtClaims;
use crate::config::AuthConfig;
use crate::error::TokenError;

/// Identity and authorization attributes bound into a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenSubject {
    pub user_id: String,
    pub email: String,
    pub role_id: Option<String>,
    pub department_id: Option<String>,
    pub is_active: bool,
}

/// A freshly signed token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// `jti` claim; persisted on the user record as the active session.
    pub token_id: String,
    /// Lifetime in seconds.
    pub expires_in: i64,
    pub expires_at: DateTime<Utc>,
}

/// Mints signed, time-bounded access tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    key: EncodingKey,
    issuer: String,
    lifetime: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            key: EncodingKey::from_secret(config.secret()),
            issuer: config.issuer().to_string(),
            lifetime: config.token_lifetime(),
        }
    }

    /// Sign a token with `iat = nbf = now` and `exp = now + lifetime`.
    pub fn issue(&self, subject: &TokenSubject, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = now + self.lifetime;
        let token_id = Uuid::new_v4().to_string();

        let claims = JwtClaims {
            sub: subject.user_id.clone(),
            email: subject.email.clone(),
            role_id: subject.role_id.clone(),
            department_id: subject.department_id.clone(),
            is_active: subject.is_active,
            jti: token_id.clone(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.key)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(IssuedToken {
            token,
            token_id,
            expires_in: self.lifetime.num_seconds(),
            expires_at,
        })
    }
}

//! Structural token verification: signature, algorithm, issuer and time window.
//!
//! No storage round trip happens here; revocation is checked against the live
//! user record by the credential verifier in `taskhub-infra`.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use crate::claims::{JwtClaims, validate_claims};
use crate::config::AuthConfig;
use crate::error::TokenError;

pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// HMAC-SHA256 validator. Tokens signed with any other algorithm are rejected.
#[derive(Clone)]
pub struct Hs256JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks run through `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer()]);
        validation.set_required_spec_claims(&["exp", "nbf", "iat", "iss", "sub"]);

        Self {
            key: DecodingKey::from_secret(config.secret()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.key, &self.validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
                JwtErrorKind::InvalidAlgorithm => TokenError::WrongAlgorithm,
                JwtErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                _ => TokenError::Malformed(e.to_string()),
            })?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::TokenValidationError;
    use crate::issuer::{TokenIssuer, TokenSubject};
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    fn config() -> AuthConfig {
        AuthConfig::new("test-secret", "taskhub-test", 1)
    }

    fn subject() -> TokenSubject {
        TokenSubject {
            user_id: "0191e0b4-7b8e-7cc1-a5d4-2f6c0e1b9a10".into(),
            email: "admin@todo.app".into(),
            role_id: Some("role-admin".into()),
            department_id: None,
            is_active: true,
        }
    }

    #[test]
    fn issued_token_round_trips() {
        let cfg = config();
        let now = Utc::now();
        let issued = TokenIssuer::new(&cfg).issue(&subject(), now).unwrap();
        assert_eq!(issued.expires_in, 3600);

        let claims = Hs256JwtValidator::new(&cfg).validate(&issued.token, now).unwrap();
        assert_eq!(claims.sub, subject().user_id);
        assert_eq!(claims.role_id.as_deref(), Some("role-admin"));
        assert_eq!(claims.jti, issued.token_id);
        assert_eq!(claims.iss, "taskhub-test");
        assert_eq!(claims.nbf, claims.iat);
    }

    #[test]
    fn consecutive_tokens_are_distinct() {
        let issuer = TokenIssuer::new(&config());
        let now = Utc::now();
        let a = issuer.issue(&subject(), now).unwrap();
        let b = issuer.issue(&subject(), now).unwrap();
        assert_ne!(a.token, b.token);
        assert_ne!(a.token_id, b.token_id);
    }

    #[test]
    fn rejects_other_secret() {
        let now = Utc::now();
        let issued = TokenIssuer::new(&AuthConfig::new("other", "taskhub-test", 1))
            .issue(&subject(), now)
            .unwrap();
        let err = Hs256JwtValidator::new(&config()).validate(&issued.token, now).unwrap_err();
        assert_eq!(err, TokenError::InvalidSignature);
    }

    #[test]
    fn rejects_other_algorithm() {
        let cfg = config();
        let now = Utc::now();
        let issued = TokenIssuer::new(&cfg).issue(&subject(), now).unwrap();
        let claims = Hs256JwtValidator::new(&cfg).validate(&issued.token, now).unwrap();

        let hs512 = jsonwebtoken::encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(cfg.secret()),
        )
        .unwrap();
        let err = Hs256JwtValidator::new(&cfg).validate(&hs512, now).unwrap_err();
        assert_eq!(err, TokenError::WrongAlgorithm);
    }

    #[test]
    fn rejects_other_issuer() {
        let now = Utc::now();
        let issued = TokenIssuer::new(&AuthConfig::new("test-secret", "someone-else", 1))
            .issue(&subject(), now)
            .unwrap();
        let err = Hs256JwtValidator::new(&config()).validate(&issued.token, now).unwrap_err();
        assert_eq!(err, TokenError::InvalidIssuer);
    }

    #[test]
    fn rejects_expired_tokens() {
        let cfg = config();
        let issued_at = Utc::now() - Duration::hours(2);
        let issued = TokenIssuer::new(&cfg).issue(&subject(), issued_at).unwrap();
        let err = Hs256JwtValidator::new(&cfg).validate(&issued.token, Utc::now()).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn rejects_garbage() {
        let err = Hs256JwtValidator::new(&config()).validate("abc.def.ghi", Utc::now()).unwrap_err();
        assert!(matches!(err, TokenError::Malformed(_)));
    }
}

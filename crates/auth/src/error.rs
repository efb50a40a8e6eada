use thiserror::Error;

use crate::claims::TokenValidationError;

/// Failure while issuing or verifying a bearer token.
///
/// Every verification variant is an authentication failure; callers should
/// not leak the distinction to clients.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("authorization header must be `Bearer <token>`")]
    MalformedHeader,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token signature mismatch")]
    InvalidSignature,

    #[error("unexpected signing algorithm")]
    WrongAlgorithm,

    #[error("unexpected token issuer")]
    InvalidIssuer,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),

    #[error("failed to sign token: {0}")]
    Encode(String),
}

//! Password hashing (bcrypt).

use thiserror::Error;

#[derive(Debug, Error)]
#[error("failed to hash password: {0}")]
pub struct PasswordError(#[from] bcrypt::BcryptError);

/// Lowest cost bcrypt accepts. Only tests should hash this cheaply.
pub const MIN_PASSWORD_COST: u32 = 4;

pub fn hash_password(plain: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Compare a plain password with a stored hash. A malformed hash never matches.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    bcrypt::verify(plain, hash).unwrap_or(false)
}

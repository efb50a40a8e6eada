//! Structural validation rules shared by every use-case.
//!
//! Each rule names the offending field in its [`DomainError::Validation`]
//! message so transports can surface it unchanged.

use crate::error::{DomainError, DomainResult};

pub fn required(field: &str, value: &str) -> DomainResult<()> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(format!("{field} is required")));
    }
    Ok(())
}

/// Length bound in characters (not bytes).
pub fn max_len(field: &str, value: &str, max: usize) -> DomainResult<()> {
    if value.chars().count() > max {
        return Err(DomainError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

pub fn email(field: &str, value: &str) -> DomainResult<()> {
    if is_email(value) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "{field} must be a valid email address"
        )))
    }
}

/// `local@domain.tld` with no whitespace and no empty domain labels.
fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_rejects_blank() {
        assert!(required("name", "Admin").is_ok());
        assert_eq!(
            required("name", "   ").unwrap_err(),
            DomainError::validation("name is required")
        );
    }

    #[test]
    fn max_len_counts_characters() {
        assert!(max_len("name", "ééé", 3).is_ok());
        assert!(max_len("name", "éééé", 3).is_err());
    }

    #[test]
    fn email_shapes() {
        for ok in ["a@b.com", "first.last@mail.example.org"] {
            assert!(email("email", ok).is_ok(), "{ok} should be accepted");
        }
        for bad in ["", "a@b", "@b.com", "a@@b.com", "a b@c.com", "a@b..com", "a@.com"] {
            assert!(email("email", bad).is_err(), "{bad} should be rejected");
        }
    }
}

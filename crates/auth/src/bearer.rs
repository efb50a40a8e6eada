use crate::error::TokenError;

/// Extract the token from an `Authorization` header value.
///
/// The value must be exactly `<scheme> <token>` where the scheme is `Bearer`
/// in any letter case and the token contains no whitespace.
pub fn parse_bearer(header: Option<&str>) -> Result<&str, TokenError> {
    let header = header.ok_or(TokenError::MissingHeader)?;
    let (scheme, token) = header.split_once(' ').ok_or(TokenError::MalformedHeader)?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(TokenError::MalformedHeader);
    }
    if token.is_empty() || token.chars().any(char::is_whitespace) {
        return Err(TokenError::MalformedHeader);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_any_scheme_case() {
        assert_eq!(parse_bearer(Some("Bearer abc")), Ok("abc"));
        assert_eq!(parse_bearer(Some("bearer abc")), Ok("abc"));
        assert_eq!(parse_bearer(Some("BEARER abc")), Ok("abc"));
    }

    #[test]
    fn rejects_missing_or_malformed_headers() {
        assert_eq!(parse_bearer(None), Err(TokenError::MissingHeader));
        for bad in ["", "Bearer", "Bearer ", "Basic abc", "Bearer a b", "Bearer  abc", "abc"] {
            assert_eq!(
                parse_bearer(Some(bad)),
                Err(TokenError::MalformedHeader),
                "{bad:?} should be rejected"
            );
        }
    }
}

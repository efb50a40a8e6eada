use serde::{Deserialize, Serialize};

/// Authenticated identity attached to a request.
///
/// Built from the live user record after token verification, so the
/// attributes reflect current storage rather than what the token claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    pub role_id: Option<String>,
    pub department_id: Option<String>,
    pub is_active: bool,
}

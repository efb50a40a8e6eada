use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use taskhub_auth::IssuedToken;
use taskhub_core::{Page, PageMetadata};
use taskhub_infra::{Contact, Role, User};

// -------------------------
// Envelope
// -------------------------

/// `{"data": ..., "paging": ...}`; `paging` only appears on searches.
#[derive(Debug, Serialize)]
pub struct WebResponse<T> {
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paging: Option<PageMetadata>,
}

pub fn respond<T: Serialize>(status: StatusCode, data: T) -> axum::response::Response {
    (status, Json(WebResponse { data, paging: None })).into_response()
}

pub fn respond_page<T, U: Serialize>(page: Page<T>, f: impl Fn(T) -> U) -> axum::response::Response {
    let paging = page.metadata();
    let data: Vec<U> = page.items.into_iter().map(f).collect();
    (
        StatusCode::OK,
        Json(WebResponse {
            data,
            paging: Some(paging),
        }),
    )
        .into_response()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Role> for RoleResponse {
    fn from(role: Role) -> Self {
        Self {
            id: role.id,
            name: role.name,
            created_at: role.timestamps.created_at,
            updated_at: role.timestamps.updated_at,
            deleted_at: role.timestamps.deleted_at,
        }
    }
}

/// Never carries the password hash or the session id.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role_id: Option<String>,
    pub department_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role_id: user.role_id,
            department_id: user.department_id,
            is_active: user.is_active,
            created_at: user.timestamps.created_at,
            updated_at: user.timestamps.updated_at,
            deleted_at: user.timestamps.deleted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl From<Contact> for ContactResponse {
    fn from(contact: Contact) -> Self {
        Self {
            id: contact.id,
            first_name: contact.first_name,
            last_name: contact.last_name,
            email: contact.email,
            phone: contact.phone,
            created_at: contact.timestamps.created_at,
            updated_at: contact.timestamps.updated_at,
            deleted_at: contact.timestamps.deleted_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    /// Seconds until expiry.
    pub expires_in: i64,
}

impl From<IssuedToken> for TokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            token: token.token,
            expires_in: token.expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use taskhub_core::{PageRequest, Timestamps};

    use super::*;

    #[test]
    fn search_envelope_carries_paging() {
        let role = Role {
            id: "r1".into(),
            name: "Admin".into(),
            timestamps: Timestamps::new(Utc::now()),
        };
        let page = Page::new(vec![role], 11, PageRequest::new(2, 5));

        let body = serde_json::to_value(WebResponse {
            data: page.items.iter().cloned().map(RoleResponse::from).collect::<Vec<_>>(),
            paging: Some(page.metadata()),
        })
        .unwrap();

        assert_eq!(body["data"][0]["name"], "Admin");
        assert_eq!(body["paging"]["page"], 2);
        assert_eq!(body["paging"]["size"], 5);
        assert_eq!(body["paging"]["total_item"], 11);
        assert_eq!(body["paging"]["total_page"], 3);
    }

    #[test]
    fn single_envelope_omits_paging() {
        let body = serde_json::to_value(WebResponse {
            data: "ok",
            paging: None,
        })
        .unwrap();
        assert!(body.get("paging").is_none());
    }
}

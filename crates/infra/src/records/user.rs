use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use taskhub_auth::{Principal, TokenSubject};
use taskhub_core::{Entity, Timestamps};

use super::timestamps_from_row;
use crate::repository::{Record, Value};

/// Stored user.
///
/// `session_id` holds the `jti` of the single active access token; clearing
/// it logs the user out everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role_id: Option<String>,
    pub department_id: Option<String>,
    pub is_active: bool,
    pub session_id: Option<String>,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl User {
    pub fn token_subject(&self) -> TokenSubject {
        TokenSubject {
            user_id: self.id.clone(),
            email: self.email.clone(),
            role_id: self.role_id.clone(),
            department_id: self.department_id.clone(),
            is_active: self.is_active,
        }
    }

    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id.clone(),
            email: self.email.clone(),
            role_id: self.role_id.clone(),
            department_id: self.department_id.clone(),
            is_active: self.is_active,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }
}

impl Record for User {
    const ENTITY: &'static str = "user";
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "email",
        "password",
        "name",
        "role_id",
        "department_id",
        "is_active",
        "session_id",
    ];
    const UNIQUE: &'static [&'static str] = &["email"];

    fn value(&self, column: &str) -> Option<Value> {
        match column {
            "email" => Some(Value::Text(self.email.clone())),
            "password" => Some(Value::Text(self.password_hash.clone())),
            "name" => Some(Value::Text(self.name.clone())),
            "role_id" => Some(Value::OptText(self.role_id.clone())),
            "department_id" => Some(Value::OptText(self.department_id.clone())),
            "is_active" => Some(Value::Bool(self.is_active)),
            "session_id" => Some(Value::OptText(self.session_id.clone())),
            _ => None,
        }
    }

    fn event_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "email": self.email,
            "name": self.name,
            "role_id": self.role_id,
            "department_id": self.department_id,
            "is_active": self.is_active,
            "created_at": self.timestamps.created_at,
            "updated_at": self.timestamps.updated_at,
            "deleted_at": self.timestamps.deleted_at,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for User {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            name: row.try_get("name")?,
            role_id: row.try_get("role_id")?,
            department_id: row.try_get("department_id")?,
            is_active: row.try_get("is_active")?,
            session_id: row.try_get("session_id")?,
            timestamps: timestamps_from_row(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn event_payload_omits_secrets() {
        let user = User {
            id: "u-1".into(),
            email: "a@b.com".into(),
            password_hash: "$2b$04$hash".into(),
            name: "A".into(),
            role_id: None,
            department_id: None,
            is_active: true,
            session_id: Some("jti-1".into()),
            timestamps: Timestamps::new(Utc::now()),
        };
        let payload = user.event_payload();
        assert_eq!(payload["email"], "a@b.com");
        assert!(payload.get("password_hash").is_none());
        assert!(payload.get("password").is_none());
        assert!(payload.get("session_id").is_none());
    }
}

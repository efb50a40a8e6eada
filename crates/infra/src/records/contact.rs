use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use taskhub_core::{Entity, Timestamps};

use super::timestamps_from_row;
use crate::repository::{Record, Value};

/// Address-book entry owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Contact {
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

impl Record for Contact {
    const ENTITY: &'static str = "contact";
    const TABLE: &'static str = "contacts";
    const COLUMNS: &'static [&'static str] = &["user_id", "first_name", "last_name", "email", "phone"];
    const OWNER: Option<&'static str> = Some("user_id");

    fn value(&self, column: &str) -> Option<Value> {
        let text = match column {
            "user_id" => &self.user_id,
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "email" => &self.email,
            "phone" => &self.phone,
            _ => return None,
        };
        Some(Value::Text(text.clone()))
    }

    fn event_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "user_id": self.user_id,
            "first_name": self.first_name,
            "last_name": self.last_name,
            "email": self.email,
            "phone": self.phone,
            "created_at": self.timestamps.created_at,
            "updated_at": self.timestamps.updated_at,
            "deleted_at": self.timestamps.deleted_at,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Contact {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Contact {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            timestamps: timestamps_from_row(row)?,
        })
    }
}

use serde::{Deserialize, Serialize};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, Row};

use taskhub_core::{Entity, Timestamps};

use super::timestamps_from_row;
use crate::repository::{Record, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub timestamps: Timestamps,
}

impl Entity for Role {
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

impl Record for Role {
    const ENTITY: &'static str = "role";
    const TABLE: &'static str = "roles";
    const COLUMNS: &'static [&'static str] = &["name"];

    fn value(&self, column: &str) -> Option<Value> {
        match column {
            "name" => Some(Value::Text(self.name.clone())),
            _ => None,
        }
    }

    fn event_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "id": self.id,
            "name": self.name,
            "created_at": self.timestamps.created_at,
            "updated_at": self.timestamps.updated_at,
            "deleted_at": self.timestamps.deleted_at,
        })
    }
}

impl<'r> FromRow<'r, PgRow> for Role {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Role {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            timestamps: timestamps_from_row(row)?,
        })
    }
}

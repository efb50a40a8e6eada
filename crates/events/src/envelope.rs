use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to the record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    Restored,
    Purged,
    LoggedIn,
    LoggedOut,
    TokenRefreshed,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Created => "created",
            ChangeAction::Updated => "updated",
            ChangeAction::Deleted => "deleted",
            ChangeAction::Restored => "restored",
            ChangeAction::Purged => "purged",
            ChangeAction::LoggedIn => "logged_in",
            ChangeAction::LoggedOut => "logged_out",
            ChangeAction::TokenRefreshed => "token_refreshed",
        }
    }
}

/// Notification of a committed state change.
///
/// `payload` is a flat projection of the record as committed (identifier,
/// key business fields, timestamps). Secrets never appear in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    event_id: Uuid,
    entity: String,
    entity_id: String,
    action: ChangeAction,
    occurred_at: DateTime<Utc>,
    payload: serde_json::Value,
}

impl ChangeEvent {
    pub fn new(
        entity: impl Into<String>,
        entity_id: impl Into<String>,
        action: ChangeAction,
        occurred_at: DateTime<Utc>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            entity: entity.into(),
            entity_id: entity_id.into(),
            action,
            occurred_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn action(&self) -> ChangeAction {
        self.action
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Routing key in `<entity>.<action>` form, e.g. `user.logged_in`.
    pub fn topic(&self) -> String {
        format!("{}.{}", self.entity, self.action.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_flat_with_snake_case_action() {
        let event = ChangeEvent::new(
            "role",
            "r-1",
            ChangeAction::Restored,
            Utc::now(),
            serde_json::json!({ "id": "r-1", "name": "Admin" }),
        );
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "restored");
        assert_eq!(json["entity_id"], "r-1");
        assert_eq!(json["payload"]["name"], "Admin");
        assert_eq!(event.topic(), "role.restored");
    }
}

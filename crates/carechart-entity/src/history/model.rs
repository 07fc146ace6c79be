//! History entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::record::RecordKind;

/// The mutation a history entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "history_action", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An immutable snapshot pair recorded on every clinical record mutation.
///
/// `before` is `None` for creations. Entries are never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HistoryEntry {
    pub id: i64,
    /// Which record table the entry belongs to.
    pub record_kind: RecordKind,
    /// Storage id of the record.
    pub record_storage_id: i64,
    /// External id of the record at the time of the mutation.
    pub record_external_id: String,
    pub action: HistoryAction,
    /// State before the mutation.
    pub before: Option<serde_json::Value>,
    /// State after the mutation.
    pub after: Option<serde_json::Value>,
    /// Display identity of the acting account.
    pub actor: String,
    pub actor_id: Option<i64>,
    /// Free-form reason (e.g. supplied on delete).
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data required to append a history entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub record_kind: RecordKind,
    pub record_storage_id: i64,
    pub record_external_id: String,
    pub action: HistoryAction,
    pub before: Option<serde_json::Value>,
    pub after: Option<serde_json::Value>,
    pub actor: String,
    pub actor_id: Option<i64>,
    pub reason: Option<String>,
}

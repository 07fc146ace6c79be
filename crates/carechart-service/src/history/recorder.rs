//! Appends history entries for clinical record mutations.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use carechart_auth::SessionIdentity;
use carechart_core::error::AppError;
use carechart_database::HistoryStore;
use carechart_entity::history::{HistoryAction, HistoryEntry, NewHistoryEntry};
use carechart_entity::record::{ClinicalRecord, RecordKind};

use super::diff::{FieldChange, diff};
use super::snapshot::Snapshot;

/// Identifies the record a history entry belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRef {
    pub kind: RecordKind,
    pub storage_id: i64,
    pub external_id: String,
}

impl RecordRef {
    pub fn of<R: ClinicalRecord>(record: &R) -> Self {
        Self {
            kind: R::KIND,
            storage_id: record.storage_id(),
            external_id: record.external_id().to_string(),
        }
    }
}

/// A history entry with its field-level changes.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    #[serde(flatten)]
    pub entry: HistoryEntry,
    pub changes: Vec<FieldChange>,
}

impl From<HistoryEntry> for HistoryView {
    fn from(entry: HistoryEntry) -> Self {
        let before = entry.before.as_ref().and_then(Snapshot::from_value);
        let after = entry.after.as_ref().and_then(Snapshot::from_value);
        let changes = diff(before.as_ref(), after.as_ref());
        Self { entry, changes }
    }
}

/// Writes history entries. A failed write is logged and never surfaces to
/// the caller, so the primary mutation stands on its own.
#[derive(Clone)]
pub struct HistoryRecorder {
    store: Arc<dyn HistoryStore>,
}

impl std::fmt::Debug for HistoryRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryRecorder").finish_non_exhaustive()
    }
}

impl HistoryRecorder {
    pub fn new(store: Arc<dyn HistoryStore>) -> Self {
        Self { store }
    }

    /// Append one entry. `before` is `None` for creations.
    pub async fn record(
        &self,
        action: HistoryAction,
        record: &RecordRef,
        before: Option<Snapshot>,
        after: Option<Snapshot>,
        actor: &SessionIdentity,
        reason: Option<String>,
    ) {
        let entry = NewHistoryEntry {
            record_kind: record.kind,
            record_storage_id: record.storage_id,
            record_external_id: record.external_id.clone(),
            action,
            before: before.map(Snapshot::into_value),
            after: after.map(Snapshot::into_value),
            actor: actor.display_identity(),
            actor_id: Some(actor.account_id),
            reason,
        };

        match self.store.append(&entry).await {
            Ok(saved) => debug!(
                history_id = saved.id,
                kind = %record.kind,
                record_id = %record.external_id,
                action = %action,
                "History entry written"
            ),
            Err(e) => warn!(
                kind = %record.kind,
                storage_id = record.storage_id,
                action = %action,
                error = %e,
                "Failed to write history entry"
            ),
        }
    }

    /// Entries for a record, newest first, each with its computed diff.
    pub async fn list(&self, record: &RecordRef) -> Result<Vec<HistoryView>, AppError> {
        let entries = self
            .store
            .list_for_record(record.kind, record.storage_id)
            .await?;
        Ok(entries.into_iter().map(HistoryView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use carechart_core::result::AppResult;
    use carechart_database::Stores;
    use carechart_entity::account::AccountRole;
    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    struct FailingHistoryStore;

    #[async_trait]
    impl HistoryStore for FailingHistoryStore {
        async fn append(&self, _entry: &NewHistoryEntry) -> AppResult<HistoryEntry> {
            Err(AppError::database("connection reset"))
        }

        async fn list_for_record(
            &self,
            _kind: RecordKind,
            _storage_id: i64,
        ) -> AppResult<Vec<HistoryEntry>> {
            Err(AppError::database("connection reset"))
        }
    }

    fn identity(display_name: Option<&str>) -> SessionIdentity {
        SessionIdentity {
            account_id: 12,
            session_id: Uuid::new_v4(),
            username: "dr.chen".into(),
            display_name: display_name.map(str::to_string),
            role: AccountRole::Physician,
            is_admin: false,
            must_change_password: false,
            expires_at: Utc::now(),
        }
    }

    fn record_ref() -> RecordRef {
        RecordRef {
            kind: RecordKind::Medical,
            storage_id: 7,
            external_id: "MR-7".into(),
        }
    }

    fn snap(value: serde_json::Value) -> Snapshot {
        Snapshot::from_value(&value).unwrap()
    }

    #[tokio::test]
    async fn test_entries_listed_newest_first_with_diffs() {
        let recorder = HistoryRecorder::new(Stores::memory().history);
        let actor = identity(Some("Dr. Chen"));
        let v1 = snap(json!({ "id": 7, "notes": "a" }));
        let v2 = snap(json!({ "id": 7, "notes": "b" }));

        recorder
            .record(HistoryAction::Create, &record_ref(), None, Some(v1.clone()), &actor, None)
            .await;
        recorder
            .record(HistoryAction::Update, &record_ref(), Some(v1), Some(v2), &actor, None)
            .await;

        let views = recorder.list(&record_ref()).await.unwrap();
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].entry.action, HistoryAction::Update);
        assert_eq!(views[0].entry.actor, "Dr. Chen");
        assert_eq!(views[0].changes.len(), 1);
        assert_eq!(views[0].changes[0].field, "notes");
        assert_eq!(views[1].entry.action, HistoryAction::Create);
        assert!(views[1].entry.before.is_none());
    }

    #[tokio::test]
    async fn test_actor_falls_back_to_username() {
        let recorder = HistoryRecorder::new(Stores::memory().history);
        recorder
            .record(HistoryAction::Create, &record_ref(), None, None, &identity(None), None)
            .await;
        let views = recorder.list(&record_ref()).await.unwrap();
        assert_eq!(views[0].entry.actor, "dr.chen");
        assert_eq!(views[0].entry.actor_id, Some(12));
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let recorder = HistoryRecorder::new(Arc::new(FailingHistoryStore));
        recorder
            .record(HistoryAction::Delete, &record_ref(), None, None, &identity(None), None)
            .await;
        assert!(recorder.list(&record_ref()).await.is_err());
    }
}

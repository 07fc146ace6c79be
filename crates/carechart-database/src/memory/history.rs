//! In-memory record history store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use carechart_core::result::AppResult;
use carechart_entity::history::{HistoryEntry, NewHistoryEntry};
use carechart_entity::record::RecordKind;

use crate::traits::HistoryStore;

/// In-memory append-only history store.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistoryStore {
    entries: Arc<Mutex<Vec<HistoryEntry>>>,
}

impl MemoryHistoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry> {
        let mut entries = self.entries.lock().await;
        let stored = HistoryEntry {
            id: entries.len() as i64 + 1,
            record_kind: entry.record_kind,
            record_storage_id: entry.record_storage_id,
            record_external_id: entry.record_external_id.clone(),
            action: entry.action,
            before: entry.before.clone(),
            after: entry.after.clone(),
            actor: entry.actor.clone(),
            actor_id: entry.actor_id,
            reason: entry.reason.clone(),
            created_at: Utc::now(),
        };
        entries.push(stored.clone());
        Ok(stored)
    }

    async fn list_for_record(
        &self,
        kind: RecordKind,
        storage_id: i64,
    ) -> AppResult<Vec<HistoryEntry>> {
        let entries = self.entries.lock().await;
        let mut matched: Vec<HistoryEntry> = entries
            .iter()
            .filter(|e| e.record_kind == kind && e.record_storage_id == storage_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(matched)
    }
}

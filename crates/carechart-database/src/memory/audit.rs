//! In-memory audit log store.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};

use crate::traits::AuditStore;

/// In-memory append-only audit log.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditStore {
    entries: Arc<Mutex<Vec<AuditLogEntry>>>,
}

impl MemoryAuditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn create(&self, data: &CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let mut entries = self.entries.lock().await;
        let entry = AuditLogEntry {
            id: entries.len() as i64 + 1,
            action: data.action,
            actor_id: data.actor_id,
            actor_username: data.actor_username.clone(),
            target_account_id: data.target_account_id,
            success: data.success,
            error_message: data.error_message.clone(),
            ip_address: data.ip_address.clone(),
            user_agent: data.user_agent.clone(),
            details: data.details.clone(),
            created_at: Utc::now(),
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>> {
        let entries = self.entries.lock().await;
        let matched: Vec<AuditLogEntry> = entries
            .iter()
            .rev()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        Ok(page.paginate(matched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carechart_entity::audit::AuditAction;

    #[tokio::test]
    async fn test_search_filters_newest_first() {
        let store = MemoryAuditStore::new();
        store
            .create(&CreateAuditLogEntry::success(AuditAction::Login).actor(Some(1), None))
            .await
            .unwrap();
        store
            .create(&CreateAuditLogEntry::failure(AuditAction::Login, "bad password"))
            .await
            .unwrap();
        store
            .create(&CreateAuditLogEntry::success(AuditAction::Logout).actor(Some(1), None))
            .await
            .unwrap();

        let logins = store
            .search(
                &AuditFilter {
                    action: Some(AuditAction::Login),
                    ..Default::default()
                },
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(logins.total_items, 2);
        assert!(!logins.items[0].success);

        let by_actor = store
            .search(
                &AuditFilter {
                    actor_id: Some(1),
                    ..Default::default()
                },
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(by_actor.items[0].action, AuditAction::Logout);
    }
}

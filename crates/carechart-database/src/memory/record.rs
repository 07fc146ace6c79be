//! In-memory clinical record store, generic over the record kind.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use carechart_core::error::AppError;
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::record::{ClinicalRecord, RecordLookup};

use crate::traits::RecordStore;

#[derive(Debug)]
struct InnerState<R> {
    next_id: i64,
    records: BTreeMap<i64, R>,
}

impl<R> Default for InnerState<R> {
    fn default() -> Self {
        Self {
            next_id: 0,
            records: BTreeMap::new(),
        }
    }
}

impl<R: ClinicalRecord> InnerState<R> {
    fn active_mut(&mut self, id: i64) -> AppResult<&mut R> {
        self.records
            .get_mut(&id)
            .filter(|r| !r.is_deleted())
            .ok_or_else(|| AppError::not_found(format!("{} record {id} not found", R::KIND)))
    }
}

/// In-memory store for one clinical record kind.
#[derive(Debug, Clone)]
pub struct MemoryRecordStore<R> {
    state: Arc<Mutex<InnerState<R>>>,
}

impl<R> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(InnerState::default())),
        }
    }
}

impl<R: ClinicalRecord> MemoryRecordStore<R> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<R: ClinicalRecord> RecordStore<R> for MemoryRecordStore<R> {
    async fn create(
        &self,
        record_id: &str,
        draft: &R::Draft,
        created_by: Option<i64>,
    ) -> AppResult<R> {
        let mut state = self.state.lock().await;
        if state.records.values().any(|r| r.external_id() == record_id) {
            return Err(AppError::conflict(format!(
                "{} record '{record_id}' already exists",
                R::KIND
            )));
        }

        state.next_id += 1;
        let record = R::from_draft(
            state.next_id,
            record_id.to_string(),
            draft,
            created_by,
            Utc::now(),
        );
        state.records.insert(record.storage_id(), record.clone());
        Ok(record)
    }

    async fn find_by_reference(
        &self,
        reference: &str,
        lookup: RecordLookup,
    ) -> AppResult<Option<R>> {
        let reference = reference.trim();
        let state = self.state.lock().await;

        let by_storage_id = reference
            .parse::<i64>()
            .ok()
            .and_then(|id| state.records.get(&id))
            .filter(|r| lookup.admits(r.deleted_at()));

        Ok(by_storage_id
            .or_else(|| {
                state
                    .records
                    .values()
                    .find(|r| r.external_id() == reference && lookup.admits(r.deleted_at()))
            })
            .cloned())
    }

    async fn list_for_patient(
        &self,
        patient_id: i64,
        include_deleted: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<R>> {
        let state = self.state.lock().await;
        let matched: Vec<R> = state
            .records
            .values()
            .rev()
            .filter(|r| r.patient_id() == patient_id && (include_deleted || !r.is_deleted()))
            .cloned()
            .collect();
        Ok(page.paginate(matched))
    }

    async fn update(&self, id: i64, patch: &R::Patch) -> AppResult<R> {
        let mut state = self.state.lock().await;
        let record = state.active_mut(id)?;
        record.apply_patch(patch, Utc::now());
        Ok(record.clone())
    }

    async fn soft_delete(&self, id: i64) -> AppResult<R> {
        let mut state = self.state.lock().await;
        let record = state.active_mut(id)?;
        record.mark_deleted(Utc::now());
        Ok(record.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carechart_entity::record::{MedicalRecord, NewMedicalRecord};

    fn draft(patient_id: i64) -> NewMedicalRecord {
        NewMedicalRecord {
            patient_id,
            diagnosis: Some("Asthma".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_lookup_by_either_identifier() {
        let store = MemoryRecordStore::<MedicalRecord>::new();
        let created = store.create("MR-ABC123", &draft(1), Some(2)).await.unwrap();

        let by_id = store
            .find_by_reference(&created.id.to_string(), RecordLookup::ActiveOnly)
            .await
            .unwrap()
            .unwrap();
        let by_external = store
            .find_by_reference("MR-ABC123", RecordLookup::ActiveOnly)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_id, by_external);
    }

    #[tokio::test]
    async fn test_soft_deleted_hidden_from_active_lookup() {
        let store = MemoryRecordStore::<MedicalRecord>::new();
        let created = store.create("MR-DEL", &draft(1), None).await.unwrap();
        store.soft_delete(created.id).await.unwrap();

        assert!(
            store
                .find_by_reference("MR-DEL", RecordLookup::ActiveOnly)
                .await
                .unwrap()
                .is_none()
        );
        let archived = store
            .find_by_reference("MR-DEL", RecordLookup::IncludeDeleted)
            .await
            .unwrap()
            .unwrap();
        assert!(archived.deleted_at.is_some());

        let err = store.soft_delete(created.id).await.unwrap_err();
        assert_eq!(err.kind, carechart_core::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_duplicate_external_id_conflicts() {
        let store = MemoryRecordStore::<MedicalRecord>::new();
        store.create("MR-DUP", &draft(1), None).await.unwrap();
        let err = store.create("MR-DUP", &draft(2), None).await.unwrap_err();
        assert_eq!(err.kind, carechart_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_list_excludes_deleted_unless_requested() {
        let store = MemoryRecordStore::<MedicalRecord>::new();
        let a = store.create("MR-A", &draft(7), None).await.unwrap();
        store.create("MR-B", &draft(7), None).await.unwrap();
        store.create("MR-C", &draft(8), None).await.unwrap();
        store.soft_delete(a.id).await.unwrap();

        let page = PageRequest::default();
        let active = store.list_for_patient(7, false, &page).await.unwrap();
        assert_eq!(active.total_items, 1);
        assert_eq!(active.items[0].record_id, "MR-B");

        let all = store.list_for_patient(7, true, &page).await.unwrap();
        assert_eq!(all.total_items, 2);
        assert_eq!(all.items[0].record_id, "MR-B");
    }
}

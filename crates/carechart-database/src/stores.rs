//! Store bundle selected by the configured backend.

use std::sync::Arc;

use tracing::{info, warn};

use carechart_core::config::{DatabaseConfig, StoreBackend};
use carechart_core::result::AppResult;
use carechart_entity::record::{MedicalRecord, MonitoringRecord};

use crate::connection::DatabasePool;
use crate::memory::{
    MemoryAccountStore, MemoryAuditStore, MemoryHistoryStore, MemoryPatientStore,
    MemoryRecordStore, MemorySessionStore,
};
use crate::migration::run_migrations;
use crate::repositories::{
    AccountRepository, AuditLogRepository, HistoryRepository, MedicalRecordRepository,
    MonitoringRecordRepository, PatientRepository, SessionRepository,
};
use crate::traits::{AccountStore, AuditStore, HistoryStore, PatientStore, RecordStore, SessionStore};

/// One handle per store trait.
#[derive(Clone)]
pub struct Stores {
    pub accounts: Arc<dyn AccountStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub patients: Arc<dyn PatientStore>,
    pub medical_records: Arc<dyn RecordStore<MedicalRecord>>,
    pub monitoring_records: Arc<dyn RecordStore<MonitoringRecord>>,
    pub history: Arc<dyn HistoryStore>,
    pub audit: Arc<dyn AuditStore>,
    /// The PostgreSQL pool, when that backend is in use.
    pub pool: Option<DatabasePool>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores")
            .field("postgres", &self.pool.is_some())
            .finish()
    }
}

impl Stores {
    /// Stores backed by a PostgreSQL pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            accounts: Arc::new(AccountRepository::new(pool.clone())),
            sessions: Arc::new(SessionRepository::new(pool.clone())),
            patients: Arc::new(PatientRepository::new(pool.clone())),
            medical_records: Arc::new(MedicalRecordRepository::new(pool.clone())),
            monitoring_records: Arc::new(MonitoringRecordRepository::new(pool.clone())),
            history: Arc::new(HistoryRepository::new(pool.clone())),
            audit: Arc::new(AuditLogRepository::new(pool)),
            pool: Some(db),
        }
    }

    /// Empty in-process stores.
    pub fn memory() -> Self {
        Self {
            accounts: Arc::new(MemoryAccountStore::new()),
            sessions: Arc::new(MemorySessionStore::new()),
            patients: Arc::new(MemoryPatientStore::new()),
            medical_records: Arc::new(MemoryRecordStore::<MedicalRecord>::new()),
            monitoring_records: Arc::new(MemoryRecordStore::<MonitoringRecord>::new()),
            history: Arc::new(MemoryHistoryStore::new()),
            audit: Arc::new(MemoryAuditStore::new()),
            pool: None,
        }
    }

    /// Build the stores for the configured backend, connecting and
    /// migrating when PostgreSQL is selected.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.backend {
            StoreBackend::Postgres => {
                let db = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(db.pool()).await?;
                }
                info!("Using PostgreSQL stores");
                Ok(Self::postgres(db))
            }
            StoreBackend::Memory => {
                warn!("Using in-memory stores; data will not survive a restart");
                Ok(Self::memory())
            }
        }
    }

    /// Check backend connectivity. Always healthy for in-memory stores.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.pool {
            Some(db) => db.health_check().await,
            None => Ok(true),
        }
    }
}

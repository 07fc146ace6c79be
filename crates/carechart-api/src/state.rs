//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use carechart_auth::password::{PasswordHasher, PasswordValidator};
use carechart_auth::{RbacEnforcer, SecurityAudit, SessionManager};
use carechart_core::config::AppConfig;
use carechart_database::Stores;
use carechart_entity::record::{MedicalRecord, MonitoringRecord};
use carechart_service::{
    AccountService, AdminAccountService, ClinicalRecordService, HistoryRecorder, PatientService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    /// Store handles for the configured backend
    pub stores: Stores,

    // ── Auth ─────────────────────────────────────────────────
    /// Login, logout and per-request session validation
    pub session_manager: Arc<SessionManager>,

    // ── Services ─────────────────────────────────────────────
    pub account_service: Arc<AccountService>,
    pub admin_service: Arc<AdminAccountService>,
    pub patient_service: Arc<PatientService>,
    pub medical_records: Arc<ClinicalRecordService<MedicalRecord>>,
    pub monitoring_records: Arc<ClinicalRecordService<MonitoringRecord>>,
}

impl AppState {
    /// Wire every service over the given stores.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let rbac = RbacEnforcer::new();
        let audit = SecurityAudit::new(Arc::clone(&stores.audit));
        let history = HistoryRecorder::new(Arc::clone(&stores.history));

        let session_manager = Arc::new(SessionManager::new(
            Arc::clone(&stores.accounts),
            Arc::clone(&stores.sessions),
            audit.clone(),
            &config.auth,
        ));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&stores.accounts),
            Arc::clone(&stores.sessions),
            audit,
            Arc::clone(&hasher),
            Arc::clone(&validator),
        ));
        let admin_service = Arc::new(AdminAccountService::new(
            Arc::clone(&stores.accounts),
            Arc::clone(&stores.sessions),
            Arc::clone(&stores.audit),
            hasher,
            validator,
            rbac,
        ));
        let patient_service = Arc::new(PatientService::new(Arc::clone(&stores.patients)));
        let medical_records = Arc::new(ClinicalRecordService::new(
            Arc::clone(&stores.medical_records),
            Arc::clone(&stores.patients),
            history.clone(),
            rbac,
        ));
        let monitoring_records = Arc::new(ClinicalRecordService::new(
            Arc::clone(&stores.monitoring_records),
            Arc::clone(&stores.patients),
            history,
            rbac,
        ));

        Self {
            config: Arc::new(config),
            stores,
            session_manager,
            account_service,
            admin_service,
            patient_service,
            medical_records,
            monitoring_records,
        }
    }
}

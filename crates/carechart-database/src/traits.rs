//! Store traits implemented by the PostgreSQL repositories and the
//! in-memory backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::account::{Account, AccountFilter, CreateAccount, UpdateAccount};
use carechart_entity::audit::{AuditFilter, AuditLogEntry, CreateAuditLogEntry};
use carechart_entity::history::{HistoryEntry, NewHistoryEntry};
use carechart_entity::patient::{CreatePatient, Patient};
use carechart_entity::record::{ClinicalRecord, RecordKind, RecordLookup};
use carechart_entity::session::{CreateSession, Session};

/// Account persistence, including the lockout counter.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Find an account by primary key.
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>>;

    /// Find an account by exact username (case-insensitive).
    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    /// Find an **active** account whose username or email equals `identifier`.
    async fn find_active_by_login(
        &self,
        identifier: &str,
        case_insensitive: bool,
    ) -> AppResult<Option<Account>>;

    /// List accounts matching a filter, ordered by username.
    async fn list(
        &self,
        filter: &AccountFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Account>>;

    /// Insert a new account. Duplicate username or email is a conflict.
    async fn create(&self, data: &CreateAccount) -> AppResult<Account>;

    /// Apply a profile update.
    async fn update_profile(&self, id: i64, data: &UpdateAccount) -> AppResult<Account>;

    /// Increment the failed-attempt counter and lock the account once the
    /// counter reaches `threshold`, as one atomic operation.
    async fn record_failed_login(&self, id: i64, threshold: i32) -> AppResult<Account>;

    /// Reset the failed-attempt counter and stamp the last login, unless
    /// the account is locked. Returns `None` when no unlocked account with
    /// that id exists.
    async fn record_successful_login(
        &self,
        id: i64,
        ip_address: Option<&str>,
    ) -> AppResult<Option<Account>>;

    /// Clear the lock and reset the counter.
    async fn unlock(&self, id: i64) -> AppResult<Account>;

    /// Replace the password hash.
    async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        must_change_password: bool,
    ) -> AppResult<Account>;

    /// Activate or deactivate an account.
    async fn set_active(&self, id: i64, active: bool) -> AppResult<Account>;

    /// Count active accounts holding administrative privilege.
    async fn count_admins(&self) -> AppResult<u64>;
}

/// Server-side session rows.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, data: &CreateSession) -> AppResult<Session>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Session>>;

    /// Stamp `terminated_at`. Returns `false` if the session was unknown or
    /// already terminated.
    async fn terminate(&self, id: Uuid, at: DateTime<Utc>) -> AppResult<bool>;

    /// Terminate every open session of an account. Returns the count.
    async fn terminate_for_account(&self, account_id: i64, at: DateTime<Utc>) -> AppResult<u64>;

    /// Clear the pending password change on every open session of an
    /// account. Returns the count.
    async fn clear_password_change(&self, account_id: i64) -> AppResult<u64>;
}

/// Patient registry.
#[async_trait]
pub trait PatientStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Patient>>;

    /// Insert a patient. Duplicate MRN is a conflict.
    async fn create(&self, data: &CreatePatient, created_by: Option<i64>) -> AppResult<Patient>;

    /// List patients whose name or MRN contains `search`, ordered by name.
    async fn list(&self, search: Option<&str>, page: &PageRequest)
    -> AppResult<PageResponse<Patient>>;
}

/// Persistence for one clinical record kind.
#[async_trait]
pub trait RecordStore<R: ClinicalRecord>: Send + Sync {
    /// Insert a record under the given external id. Duplicate external id
    /// is a conflict.
    async fn create(
        &self,
        record_id: &str,
        draft: &R::Draft,
        created_by: Option<i64>,
    ) -> AppResult<R>;

    /// Resolve a record by storage id or external id.
    ///
    /// When `reference` parses as an integer and matches a storage id, that
    /// record wins over an external-id match.
    async fn find_by_reference(&self, reference: &str, lookup: RecordLookup)
    -> AppResult<Option<R>>;

    /// List a patient's records, newest first.
    async fn list_for_patient(
        &self,
        patient_id: i64,
        include_deleted: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<R>>;

    /// Apply a partial update to an active record.
    async fn update(&self, id: i64, patch: &R::Patch) -> AppResult<R>;

    /// Set `deleted_at` on an active record.
    async fn soft_delete(&self, id: i64) -> AppResult<R>;
}

/// Append-only record history.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: &NewHistoryEntry) -> AppResult<HistoryEntry>;

    /// Entries for one record, newest first with ties broken by id.
    async fn list_for_record(&self, kind: RecordKind, storage_id: i64)
    -> AppResult<Vec<HistoryEntry>>;
}

/// Append-only security audit log.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn create(&self, entry: &CreateAuditLogEntry) -> AppResult<AuditLogEntry>;

    /// Search entries, newest first.
    async fn search(
        &self,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<AuditLogEntry>>;
}

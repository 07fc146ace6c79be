//! In-memory account store.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use carechart_core::error::AppError;
use carechart_core::result::AppResult;
use carechart_core::types::pagination::{PageRequest, PageResponse};
use carechart_entity::account::{Account, AccountFilter, CreateAccount, UpdateAccount};

use crate::traits::AccountStore;

#[derive(Debug, Default)]
struct InnerState {
    next_id: i64,
    accounts: BTreeMap<i64, Account>,
}

impl InnerState {
    fn get_mut(&mut self, id: i64) -> AppResult<&mut Account> {
        self.accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Account {id} not found")))
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.accounts.values().any(|a| {
            Some(a.id) != except
                && a.email
                    .as_deref()
                    .map(|e| e.eq_ignore_ascii_case(email))
                    .unwrap_or(false)
        })
    }
}

/// In-memory account store.
#[derive(Debug, Clone, Default)]
pub struct MemoryAccountStore {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Account>> {
        Ok(self.state.lock().await.accounts.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn find_active_by_login(
        &self,
        identifier: &str,
        case_insensitive: bool,
    ) -> AppResult<Option<Account>> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .find(|a| a.is_active && a.matches_login(identifier, case_insensitive))
            .cloned())
    }

    async fn list(
        &self,
        filter: &AccountFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Account>> {
        let state = self.state.lock().await;
        let mut matched: Vec<Account> = state
            .accounts
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matched.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(page.paginate(matched))
    }

    async fn create(&self, data: &CreateAccount) -> AppResult<Account> {
        let mut state = self.state.lock().await;

        if state
            .accounts
            .values()
            .any(|a| a.username.eq_ignore_ascii_case(&data.username))
        {
            return Err(AppError::conflict(format!(
                "Username '{}' already exists",
                data.username
            )));
        }
        if let Some(email) = &data.email {
            if state.email_taken(email, None) {
                return Err(AppError::conflict("Email already in use"));
            }
        }

        state.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: state.next_id,
            username: data.username.clone(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            display_name: data.display_name.clone(),
            role: data.role,
            is_admin: data.is_admin,
            is_active: true,
            is_locked: false,
            failed_login_attempts: 0,
            last_login_at: None,
            last_login_ip: None,
            must_change_password: data.must_change_password,
            created_at: now,
            updated_at: now,
            created_by: data.created_by,
        };
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_profile(&self, id: i64, data: &UpdateAccount) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        if let Some(email) = &data.email {
            if state.email_taken(email, Some(id)) {
                return Err(AppError::conflict("Email already in use"));
            }
        }
        let account = state.get_mut(id)?;
        data.apply_to(account);
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn record_failed_login(&self, id: i64, threshold: i32) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let account = state.get_mut(id)?;
        account.failed_login_attempts += 1;
        account.is_locked = account.is_locked || account.failed_login_attempts >= threshold;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn record_successful_login(
        &self,
        id: i64,
        ip_address: Option<&str>,
    ) -> AppResult<Option<Account>> {
        let mut state = self.state.lock().await;
        let Some(account) = state.accounts.get_mut(&id).filter(|a| !a.is_locked) else {
            return Ok(None);
        };
        let now = Utc::now();
        account.failed_login_attempts = 0;
        account.last_login_at = Some(now);
        account.last_login_ip = ip_address.map(str::to_string);
        account.updated_at = now;
        Ok(Some(account.clone()))
    }

    async fn unlock(&self, id: i64) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let account = state.get_mut(id)?;
        account.is_locked = false;
        account.failed_login_attempts = 0;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_password(
        &self,
        id: i64,
        password_hash: &str,
        must_change_password: bool,
    ) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let account = state.get_mut(id)?;
        account.password_hash = password_hash.to_string();
        account.must_change_password = must_change_password;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn set_active(&self, id: i64, active: bool) -> AppResult<Account> {
        let mut state = self.state.lock().await;
        let account = state.get_mut(id)?;
        account.is_active = active;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    async fn count_admins(&self) -> AppResult<u64> {
        let state = self.state.lock().await;
        Ok(state
            .accounts
            .values()
            .filter(|a| a.is_active && a.has_admin_privilege())
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carechart_entity::account::AccountRole;

    fn new_account(username: &str) -> CreateAccount {
        CreateAccount {
            username: username.to_string(),
            email: Some(format!("{username}@clinic.test")),
            password_hash: "hash".into(),
            display_name: None,
            role: AccountRole::Nurse,
            is_admin: false,
            must_change_password: false,
            created_by: None,
        }
    }

    #[tokio::test]
    async fn test_failed_logins_lock_at_threshold() {
        let store = MemoryAccountStore::new();
        let acc = store.create(&new_account("nurse1")).await.unwrap();

        for expected in 1..5 {
            let updated = store.record_failed_login(acc.id, 5).await.unwrap();
            assert_eq!(updated.failed_login_attempts, expected);
            assert!(!updated.is_locked);
        }
        let locked = store.record_failed_login(acc.id, 5).await.unwrap();
        assert_eq!(locked.failed_login_attempts, 5);
        assert!(locked.is_locked);

        let refused = store.record_successful_login(acc.id, Some("10.0.0.1")).await.unwrap();
        assert!(refused.is_none(), "only an explicit unlock clears the lock");
        let stored = store.find_by_id(acc.id).await.unwrap().unwrap();
        assert_eq!(stored.failed_login_attempts, 5);
        assert!(stored.last_login_at.is_none());

        let unlocked = store.unlock(acc.id).await.unwrap();
        assert!(!unlocked.is_locked);

        let ok = store
            .record_successful_login(acc.id, Some("10.0.0.1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ok.failed_login_attempts, 0);
        assert_eq!(ok.last_login_ip.as_deref(), Some("10.0.0.1"));
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryAccountStore::new();
        store.create(&new_account("dr_who")).await.unwrap();
        let err = store.create(&new_account("DR_WHO")).await.unwrap_err();
        assert_eq!(err.kind, carechart_core::ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_login_lookup_skips_inactive() {
        let store = MemoryAccountStore::new();
        let acc = store.create(&new_account("staff9")).await.unwrap();
        assert!(
            store
                .find_active_by_login("STAFF9@clinic.test", true)
                .await
                .unwrap()
                .is_some()
        );
        store.set_active(acc.id, false).await.unwrap();
        assert!(
            store
                .find_active_by_login("staff9", true)
                .await
                .unwrap()
                .is_none()
        );
    }
}

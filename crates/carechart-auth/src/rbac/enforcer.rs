//! RBAC enforcement for clinical and administrative operations.

use carechart_core::error::AppError;
use carechart_entity::account::AccountRole;

use crate::session::SessionIdentity;

/// Checks roles and account ownership. Administrative privilege satisfies
/// every check.
#[derive(Debug, Clone, Copy, Default)]
pub struct RbacEnforcer;

impl RbacEnforcer {
    pub fn new() -> Self {
        Self
    }

    /// Require one of `allowed`.
    pub fn require_role(
        &self,
        identity: &SessionIdentity,
        allowed: &[AccountRole],
    ) -> Result<(), AppError> {
        if identity.has_admin_privilege() || allowed.contains(&identity.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(format!(
                "Role '{}' is not permitted to perform this action",
                identity.role
            )))
        }
    }

    /// Require a role that may author clinical records.
    pub fn require_clinical(&self, identity: &SessionIdentity) -> Result<(), AppError> {
        self.require_role(identity, AccountRole::clinical())
    }

    /// Require administrative privilege.
    pub fn require_admin(&self, identity: &SessionIdentity) -> Result<(), AppError> {
        if identity.has_admin_privilege() {
            Ok(())
        } else {
            Err(AppError::forbidden("Administrator privilege required"))
        }
    }

    /// True iff `identity` is the target account or an administrator.
    pub fn can_act_on_account(&self, identity: &SessionIdentity, target_account_id: i64) -> bool {
        identity.account_id == target_account_id || identity.has_admin_privilege()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn identity(id: i64, role: AccountRole, is_admin: bool) -> SessionIdentity {
        SessionIdentity {
            account_id: id,
            session_id: Uuid::new_v4(),
            username: format!("user{id}"),
            display_name: None,
            role,
            is_admin,
            must_change_password: false,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn test_staff_cannot_author_records() {
        let rbac = RbacEnforcer::new();
        assert!(rbac.require_clinical(&identity(1, AccountRole::Staff, false)).is_err());
        assert!(rbac.require_clinical(&identity(2, AccountRole::Nurse, false)).is_ok());
    }

    #[test]
    fn test_admin_flag_passes_every_role_check() {
        let rbac = RbacEnforcer::new();
        let flagged = identity(3, AccountRole::Staff, true);
        assert!(rbac.require_clinical(&flagged).is_ok());
        assert!(rbac.require_admin(&flagged).is_ok());
        assert!(rbac.require_admin(&identity(4, AccountRole::Physician, false)).is_err());
    }

    #[test]
    fn test_can_act_on_account() {
        let rbac = RbacEnforcer::new();
        let nurse = identity(5, AccountRole::Nurse, false);
        assert!(rbac.can_act_on_account(&nurse, 5));
        assert!(!rbac.can_act_on_account(&nurse, 6));
        assert!(rbac.can_act_on_account(&identity(1, AccountRole::Admin, false), 6));
    }
}

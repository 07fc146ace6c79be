//! Best-effort security audit writer.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use carechart_database::AuditStore;
use carechart_entity::audit::CreateAuditLogEntry;

/// Where a request came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOrigin {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Appends audit entries without ever failing the calling operation.
#[derive(Clone)]
pub struct SecurityAudit {
    store: Arc<dyn AuditStore>,
}

impl std::fmt::Debug for SecurityAudit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityAudit").finish_non_exhaustive()
    }
}

impl SecurityAudit {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Write an entry stamped with the request origin. Store failures are
    /// logged and swallowed.
    pub async fn record(&self, entry: CreateAuditLogEntry, origin: &ClientOrigin) {
        let entry = entry.origin(origin.ip_address.clone(), origin.user_agent.clone());
        if let Err(e) = self.store.create(&entry).await {
            warn!(
                action = %entry.action,
                actor_id = ?entry.actor_id,
                error = %e,
                "Failed to write audit entry"
            );
        }
    }
}

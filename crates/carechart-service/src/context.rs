//! Request context carrying the authenticated identity and request origin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carechart_auth::{ClientOrigin, SessionIdentity};

/// Context for the current authenticated request.
///
/// Built by the API layer and passed into service methods so that every
/// operation knows who is acting and from where.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The validated session identity.
    pub identity: SessionIdentity,
    /// Client address and User-Agent.
    pub origin: ClientOrigin,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(identity: SessionIdentity, origin: ClientOrigin) -> Self {
        Self {
            identity,
            origin,
            request_time: Utc::now(),
        }
    }

    /// The acting account id.
    pub fn account_id(&self) -> i64 {
        self.identity.account_id
    }

    /// The acting username.
    pub fn username(&self) -> &str {
        &self.identity.username
    }

    /// Returns whether the caller holds administrative privilege.
    pub fn is_admin(&self) -> bool {
        self.identity.has_admin_privilege()
    }
}

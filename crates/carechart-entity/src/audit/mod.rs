//! Security audit log entities.

pub mod model;

pub use model::{AuditAction, AuditFilter, AuditLogEntry, CreateAuditLogEntry};

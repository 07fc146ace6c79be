//! In-process store implementations backed by Tokio mutexes.
//!
//! Suitable for tests and single-node development only; nothing survives
//! a restart.

pub mod account;
pub mod audit;
pub mod history;
pub mod patient;
pub mod record;
pub mod session;

pub use account::MemoryAccountStore;
pub use audit::MemoryAuditStore;
pub use history::MemoryHistoryStore;
pub use patient::MemoryPatientStore;
pub use record::MemoryRecordStore;
pub use session::MemorySessionStore;

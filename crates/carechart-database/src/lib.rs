//! # carechart-database
//!
//! Persistence for CareChart. Every entity is reached through a store
//! trait defined in [`traits`]; [`repositories`] implements them over
//! PostgreSQL and [`memory`] keeps everything in process for tests and
//! local development. [`Stores`] bundles one of each.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod stores;
pub mod traits;

pub use connection::DatabasePool;
pub use stores::Stores;
pub use traits::{AccountStore, AuditStore, HistoryStore, PatientStore, RecordStore, SessionStore};

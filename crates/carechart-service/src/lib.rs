//! # carechart-service
//!
//! Business logic service layer for CareChart. Each service orchestrates
//! the store traits, the auth crate's policies, and the history recorder
//! to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time as `Arc` handles.

pub mod context;
pub mod history;
pub mod patient;
pub mod record;
pub mod user;

mod validation;

pub use context::RequestContext;
pub use history::{FieldChange, HistoryRecorder, HistoryView, Snapshot};
pub use patient::PatientService;
pub use record::ClinicalRecordService;
pub use user::{AccountService, AdminAccountService};

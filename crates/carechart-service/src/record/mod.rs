//! Clinical record use cases, shared by both record kinds.

pub mod service;

pub use service::ClinicalRecordService;

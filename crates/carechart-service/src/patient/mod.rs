//! Patient registry use cases.

pub mod service;

pub use service::PatientService;

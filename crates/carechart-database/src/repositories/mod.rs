//! PostgreSQL implementations of the store traits.

pub mod account;
pub mod audit;
pub mod history;
pub mod medical;
pub mod monitoring;
pub mod patient;
pub mod session;

pub use account::AccountRepository;
pub use audit::AuditLogRepository;
pub use history::HistoryRepository;
pub use medical::MedicalRecordRepository;
pub use monitoring::MonitoringRecordRepository;
pub use patient::PatientRepository;
pub use session::SessionRepository;

/// Name of the unique constraint violated by `err`, if any.
pub(crate) fn violated_constraint(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_owned),
        _ => None,
    }
}

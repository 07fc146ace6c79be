//! Clinical record history entities.

pub mod model;

pub use model::{HistoryAction, HistoryEntry, NewHistoryEntry};

//! Record history: snapshots, field diffs, and the best-effort recorder.

pub mod diff;
pub mod recorder;
pub mod snapshot;

pub use diff::{FieldChange, diff};
pub use recorder::{HistoryRecorder, HistoryView, RecordRef};
pub use snapshot::Snapshot;

//! Convenience result type alias for CareChart.

use crate::error::AppError;

/// A specialized `Result` type for CareChart operations.
pub type AppResult<T> = Result<T, AppError>;

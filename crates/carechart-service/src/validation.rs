//! Input validation bridge from `validator` to `AppError`.

use validator::Validate;

use carechart_core::error::AppError;

/// Run derive-based validation, reporting every field error in `details`.
pub(crate) fn validate_input<T: Validate>(input: &T) -> Result<(), AppError> {
    input.validate().map_err(|errors| {
        let err = AppError::validation(format!("Invalid input: {errors}"));
        match serde_json::to_value(&errors) {
            Ok(details) => err.with_details(details),
            Err(_) => err,
        }
    })
}

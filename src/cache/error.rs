//! Cache error types.

use thiserror::Error;

/// Errors that can occur during cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cancellation of in-flight refetch for '{key}' failed: {message}")]
    Cancellation { key: String, message: String },
}

impl From<CacheError> for crate::error::AppError {
    fn from(error: CacheError) -> Self {
        match error {
            CacheError::Cancellation { key, message } => {
                crate::error::AppError::Cancellation { key, message }
            }
        }
    }
}

use thiserror::Error;

/// Application-wide error type that represents all possible errors in the system.
///
/// This enum provides structured error handling for the catalog client,
/// supporting automatic conversion from anyhow and validator errors and
/// detailed context for debugging and user feedback.
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation error with field-specific details
    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Remote catalog API error with endpoint context
    #[error("External API error ({endpoint}): {message}")]
    ExternalApi {
        endpoint: String,
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Failure while cancelling an in-flight background refetch
    #[error("Cancellation failed for cache key '{key}': {message}")]
    Cancellation { key: String, message: String },

    /// Configuration error with key information
    #[error("Configuration error: {key}")]
    Configuration {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// Internal error for unexpected failures
    #[error("Internal error")]
    Internal {
        #[source]
        source: anyhow::Error,
    },
}

impl AppError {
    /// Build an ExternalApi error without an underlying source.
    pub fn external_api(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::ExternalApi {
            endpoint: endpoint.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Build a Validation error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        AppError::Internal { source: error }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first field failure; the controller rejects on any.
        let (field, field_errors) = match errors.field_errors().into_iter().next() {
            Some(entry) => entry,
            None => {
                return AppError::Validation {
                    field: "unknown".to_string(),
                    reason: "validation failed".to_string(),
                };
            }
        };

        let reason = field_errors
            .first()
            .and_then(|e| e.message.as_ref())
            .map(|m| m.to_string())
            .unwrap_or_else(|| "invalid value".to_string());

        AppError::Validation {
            field: field.to_string(),
            reason,
        }
    }
}

/// Type alias for Result with AppError to simplify function signatures
pub type AppResult<T> = Result<T, AppError>;

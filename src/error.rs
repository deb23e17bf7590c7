use thiserror::Error;

/// Failures surfaced to callers of the session controller and the read-side
/// reports. Window-probe failures never show up here; the sampler absorbs
/// them.
#[derive(Debug, Error)]
pub enum StudyError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("session {0} not found")]
    SessionNotFound(i64),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl StudyError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StudyError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        StudyError::Conflict(message.into())
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            StudyError::Validation { .. } => "validation_error",
            StudyError::SessionNotFound(_) => "not_found",
            StudyError::Conflict(_) => "conflict",
            StudyError::Storage(_) => "storage_error",
        }
    }
}

pub type StudyResult<T> = Result<T, StudyError>;

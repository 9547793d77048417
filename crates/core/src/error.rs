#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("invalid {field}: {constraint}")]
    Validation {
        field: &'static str,
        constraint: String,
    },
    #[error("patient not found: {0}")]
    NotFound(String),
    #[error("patient already exists: {0}")]
    Conflict(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to read patient file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to write patient file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to serialize patients: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize patients: {0}")]
    Deserialization(String),
    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),
}

impl PatientError {
    pub(crate) fn validation(field: &'static str, constraint: impl Into<String>) -> Self {
        PatientError::Validation {
            field,
            constraint: constraint.into(),
        }
    }

    /// Returns `true` when the failure came from the backing document rather than the caller.
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            PatientError::StorageDirCreation(_)
                | PatientError::FileRead(_)
                | PatientError::FileWrite(_)
                | PatientError::Serialization(_)
                | PatientError::Deserialization(_)
                | PatientError::StoreUnavailable(_)
        )
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;

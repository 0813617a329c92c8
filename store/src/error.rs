use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid range: row {row}, column {col}")]
    InvalidRange { row: usize, col: usize },

    #[error("Query execution error: {0}")]
    Query(String),

    #[error("Corrupt cell at row {row}, column {col}: {reason}")]
    Corrupt {
        row: usize,
        col: usize,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Player not found: {0}")]
    KeyNotFound(i64),

    #[error("Player already provisioned: {0}")]
    DuplicateKey(i64),

    #[error("{field} value {value} cannot be stored exactly")]
    ValueOutOfRange { field: &'static str, value: i64 },

    #[error("Backend error: {0}")]
    Backend(BackendError),
}

impl From<BackendError> for StoreError {
    fn from(value: BackendError) -> Self {
        match value {
            BackendError::Unavailable(reason) => StoreError::BackendUnavailable(reason),
            other => StoreError::Backend(other),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

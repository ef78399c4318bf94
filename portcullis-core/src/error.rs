use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Counter error: {0}")]
    Counter(#[from] CounterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Record not found")]
    NotFound,
}

/// Failures of the fast counter store.
///
/// These are deliberately coarse: the guard treats any counter failure on its
/// read path as "no counter available" and proceeds, so callers rarely need
/// more detail than the underlying message.
#[derive(Debug, Error)]
pub enum CounterError {
    #[error("Counter store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value}")]
    Invalid { name: String, value: String },
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid login: {0}")]
    InvalidLogin(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    pub fn is_counter_error(&self) -> bool {
        matches!(self, Error::Counter(_))
    }
}

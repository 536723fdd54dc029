use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON input: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid scheduler configuration: {0}")]
    ConfigError(String),

    #[error("Invalid slot definition: {0}")]
    InvalidSlot(String),

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The storage collaborator failed. Never interpreted as "slot unavailable".
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

pub type Result<T> = std::result::Result<T, Error>;

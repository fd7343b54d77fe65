use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Service query error: {0}")]
    Service(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

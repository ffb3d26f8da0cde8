use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Tag errors
    #[error("Invalid tag format: {0}")]
    InvalidTagFormat(String),

    // Event errors
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),

    #[error("Unknown sync status: {0}")]
    UnknownSyncStatus(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;

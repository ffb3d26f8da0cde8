use thiserror::Error;

/// Storage-specific error types for the offline event cache.
///
/// Durability failures here are the one error class the read loop treats as
/// fatal: the delivery guarantee cannot be honored without durable appends.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Database connection or query execution failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Migration execution failed
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Event not found in the cache
    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: uuid::Uuid },

    /// Stored row could not be decoded into an event
    #[error("Corrupt cache row: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Specialized result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

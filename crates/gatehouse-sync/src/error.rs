use thiserror::Error;

/// Errors that can occur during synchronization with the central server.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Server unreachable (network error, timeout, or 5xx). Transient:
    /// retried with backoff, never surfaced beyond a log line.
    #[error("Server unreachable: {message}")]
    Unreachable { message: String },

    /// Response payload could not be decoded.
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Client construction or configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Offline cache operation failed.
    #[error("Storage error: {0}")]
    Storage(#[from] gatehouse_storage::StorageError),
}

impl SyncError {
    /// Create a new unreachable-server error.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Create a new invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` if this error is transient and worth retrying.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, SyncError::Unreachable { .. })
    }
}

/// Specialized result type for sync operations
pub type SyncResult<T> = Result<T, SyncError>;

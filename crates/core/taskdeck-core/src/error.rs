//! Error types for Taskdeck core

use thiserror::Error;

/// Main error type for Taskdeck operations
#[derive(Debug, Error)]
pub enum TaskdeckError {
    /// Stream read/decode error (fatal to the decode loop)
    #[error("Stream error: {0}")]
    Stream(String),

    /// Persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Agent backend error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Event handling error
    #[error("Event error: {0}")]
    Event(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network/HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Convenient Result type using TaskdeckError
pub type Result<T> = std::result::Result<T, TaskdeckError>;

impl TaskdeckError {
    /// Create a stream error
    pub fn stream(msg: impl Into<String>) -> Self {
        TaskdeckError::Stream(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        TaskdeckError::Storage(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        TaskdeckError::Config(msg.into())
    }

    /// Create a provider error
    pub fn provider(msg: impl Into<String>) -> Self {
        TaskdeckError::Provider(msg.into())
    }

    /// Create an event error
    pub fn event(msg: impl Into<String>) -> Self {
        TaskdeckError::Event(msg.into())
    }

    /// Create a generic error
    pub fn other(msg: impl Into<String>) -> Self {
        TaskdeckError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = TaskdeckError::stream("test stream error");
        assert_eq!(err.to_string(), "Stream error: test stream error");

        let err = TaskdeckError::storage("test storage error");
        assert_eq!(err.to_string(), "Storage error: test storage error");
    }

    #[test]
    fn test_result_type() {
        fn returns_result() -> Result<i32> {
            Ok(42)
        }

        assert_eq!(returns_result().unwrap(), 42);
    }
}

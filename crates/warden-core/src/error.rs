use std::io;

use thiserror::Error;

use crate::record::ServiceStatus;

/// Custom result type for Warden operations
pub type WardenResult<T> = Result<T, WardenError>;

/// Custom error type for Warden operations
#[derive(Debug, Error)]
pub enum WardenError {
    /// Dependency graph validation failed; carries every message produced
    /// by the validator, not just the first one.
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Cannot {operation} while service is {current}")]
    StateConflict {
        operation: String,
        current: ServiceStatus,
    },

    #[error("Gateway failure: {message}")]
    Gateway { message: String, elapsed_ms: u64 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Security rejection: {0}")]
    Security(String),

    #[error("Service not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Monitor error: {0}")]
    Monitor(String),

    #[error("Other error: {0}")]
    Other(String),
}

impl WardenError {
    /// Create a new validation error from collected issue messages
    pub fn validation(messages: Vec<String>) -> Self {
        WardenError::Validation(messages)
    }

    /// Create a new state-conflict error
    pub fn state_conflict<S: Into<String>>(operation: S, current: ServiceStatus) -> Self {
        WardenError::StateConflict {
            operation: operation.into(),
            current,
        }
    }

    /// Create a new gateway error
    pub fn gateway<S: Into<String>>(message: S, elapsed_ms: u64) -> Self {
        WardenError::Gateway {
            message: message.into(),
            elapsed_ms,
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        WardenError::Storage(msg.into())
    }

    /// Create a new security rejection
    pub fn security<S: Into<String>>(msg: S) -> Self {
        WardenError::Security(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        WardenError::NotFound(msg.into())
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        WardenError::Config(msg.into())
    }

    /// Create a new monitor error
    pub fn monitor<S: Into<String>>(msg: S) -> Self {
        WardenError::Monitor(msg.into())
    }

    /// Create a new other error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        WardenError::Other(msg.into())
    }
}

impl From<io::Error> for WardenError {
    fn from(err: io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for WardenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for WardenError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::ser::Error> for WardenError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

//! Error types for jaat-chat.

use thiserror::Error;

/// Primary error type for all jaat-chat operations.
///
/// Unknown conversation ids are not errors: lookups return `Option` and
/// deletions return `bool`. Only failures the caller has to see end up here.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ChatError {
    /// Create a storage error for a specific key.
    pub fn storage(key: &str, message: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{key}: {message}"))
    }

    /// Whether retrying the same operation could succeed.
    ///
    /// Backing-store and filesystem failures are usually transient
    /// (a locked file, a full disk that gets cleaned up). Bad input and bad
    /// configuration stay bad.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::Io(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ChatError>;

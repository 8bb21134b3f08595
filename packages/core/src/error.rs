//! Error types for configuration and the key-store boundary.

use thiserror::Error;

use crate::key_path::KeyPathError;

/// Errors raised while validating configuration.
///
/// These are reported once, when a fetcher is built, never per document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The key-store host is empty.
    #[error("host must not be empty")]
    EmptyHost,

    /// The port is outside 1-65535.
    #[error("invalid port: {port}")]
    InvalidPort { port: u16 },

    /// The attribute receiving scalar values is empty.
    #[error("value attribute name must not be empty")]
    EmptyValueAttribute,

    /// The key path is not a usable JSON pointer.
    #[error("invalid key path: {0}")]
    KeyPath(#[from] KeyPathError),
}

/// Errors surfaced by a key-store client.
///
/// Clients classify their native errors into these kinds so the fetcher
/// can route on them without inspecting driver-specific types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The store could not be reached, or the connection broke.
    #[error("connection error: {message}")]
    Connection { message: String },

    /// The stored representation does not fit the requested operation.
    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    /// The key holds no value.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Any other store failure.
    #[error("store error: {message}")]
    Other { message: String },
}

impl StoreError {
    pub fn connection(message: impl Into<String>) -> Self {
        StoreError::Connection {
            message: message.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        StoreError::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn not_found(key: impl Into<String>) -> Self {
        StoreError::NotFound { key: key.into() }
    }

    pub fn other(message: impl Into<String>) -> Self {
        StoreError::Other {
            message: message.into(),
        }
    }
}

//! Error types for MovieVerse
//!
//! This module defines all error types used throughout the library.
//! MovieError implements Serialize for Tauri compatibility.

use serde::{Serialize, Serializer};
use thiserror::Error;

/// Error type for MovieVerse operations
#[derive(Error, Debug)]
pub enum MovieError {
    /// Bad user input, rejected before any request is issued
    #[error("{0}")]
    ValidationError(String),

    /// HTTP request could not be completed
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The metadata service answered with a non-success status
    #[error("HTTP error! status: {0}")]
    TransportError(u16),

    /// The metadata service reported a failure in its payload
    #[error("{0}")]
    ApiError(String),

    /// Response body was not the expected JSON shape
    #[error("Failed to parse response: {0}")]
    ParseError(#[from] serde_json::Error),

    /// Backing key-value store could not be opened
    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),
}

/// Serialize MovieError as a string for Tauri compatibility
impl Serialize for MovieError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Failures of the local key-value store.
///
/// These never leave the favorites store or the theme manager; both log
/// them and fall back to an empty or best-effort state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Reading or writing the backing file failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data is not valid JSON
    #[error("Corrupt storage data: {0}")]
    Corrupt(#[from] serde_json::Error),

    /// Store refused the operation (disabled, full, ...)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for MovieVerse operations
pub type Result<T> = std::result::Result<T, MovieError>;

/// Result type alias for key-value store operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// --- File: crates/trackify_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type for all Trackify errors.
///
/// This enum provides a common set of error variants shared across crates.
/// Feature crates can extend it by implementing From<SpecificError> for TrackifyError.
#[derive(Error, Debug)]
pub enum TrackifyError {
    /// Error occurred during validation of an inbound payload
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred while reading or writing persisted tracker state
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
///
/// This trait can be implemented by error types to provide a consistent way
/// to convert errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for TrackifyError {
    fn status_code(&self) -> u16 {
        match self {
            TrackifyError::ValidationError(_) => 422,
            TrackifyError::ConfigError(_) => 500,
            TrackifyError::StorageError(_) => 500,
            TrackifyError::NotFoundError(_) => 404,
            TrackifyError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<std::io::Error> for TrackifyError {
    fn from(err: std::io::Error) -> Self {
        TrackifyError::StorageError(err.to_string())
    }
}

impl From<serde_json::Error> for TrackifyError {
    fn from(err: serde_json::Error) -> Self {
        TrackifyError::StorageError(err.to_string())
    }
}

// Utility functions for error handling
pub fn validation_error<T: fmt::Display>(message: T) -> TrackifyError {
    TrackifyError::ValidationError(message.to_string())
}

pub fn storage_error<T: fmt::Display>(message: T) -> TrackifyError {
    TrackifyError::StorageError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> TrackifyError {
    TrackifyError::NotFoundError(message.to_string())
}

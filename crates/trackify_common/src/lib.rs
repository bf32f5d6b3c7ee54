// --- File: crates/trackify_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod logging; // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{not_found, storage_error, validation_error, HttpStatusCode, TrackifyError};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level};

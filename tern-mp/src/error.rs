//! Error types for tern-mp
//!
//! Defines module-specific error types using thiserror for clear error
//! propagation. Resolution misses, invalid transitions, and stale callbacks
//! are absorbed inside the playback core and never become errors; this type
//! covers the ambient surfaces (config, HTTP, request validation).

use thiserror::Error;

/// Main error type for the tern-mp module
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),

    /// Playback engine errors
    #[error("Playback error: {0}")]
    Playback(String),

    /// Queue management errors
    #[error("Queue error: {0}")]
    Queue(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Other errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using the tern-mp Error
pub type Result<T> = std::result::Result<T, Error>;

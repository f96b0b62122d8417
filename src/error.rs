//! Error types for filekit.

use std::path::PathBuf;

use thiserror::Error;

use crate::upload::UploadError;

/// Common error type for filekit.
#[derive(Error, Debug)]
pub enum FileKitError {
    /// The directory does not exist.
    #[error("directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// The directory exists but cannot be written to.
    #[error("directory not writable: {}", .0.display())]
    DirectoryNotWritable(PathBuf),

    /// An upload was rejected.
    #[error("upload rejected: {0}")]
    Upload(#[from] UploadError),

    /// The requested operation does not make sense for the given arguments.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for filekit operations.
pub type Result<T> = std::result::Result<T, FileKitError>;

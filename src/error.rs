//! Global error handling for ctxpack
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project.

use std::io;
use thiserror::Error;

use crate::clipboard::ClipboardError;

/// Global error type for ctxpack operations
#[derive(Error, Debug)]
pub enum PackError {
    /// File system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Clipboard placement errors
    #[error("Clipboard error: {0}")]
    Clipboard(#[from] ClipboardError),

    /// Manifest parsing errors
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// None of the supplied input paths could be resolved
    #[error("no files found: {0}")]
    NoInputs(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for ctxpack operations
pub type Result<T> = std::result::Result<T, PackError>;

// Allow converting PackError to io::Error for callers that only speak io
impl From<PackError> for io::Error {
    fn from(err: PackError) -> Self {
        match err {
            PackError::Io(e) => e,
            other => io::Error::new(io::ErrorKind::Other, other.to_string()),
        }
    }
}

//! Error types for startup and data loading.

use thiserror::Error;

/// Errors that can occur when loading RON data files.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// File could not be found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// File could not be read.
    #[error("Failed to read file '{path}': {details}")]
    ReadError { path: String, details: String },

    /// RON parsing failed.
    #[error("Parse error in '{path}': {details}")]
    ParseError { path: String, details: String },
}

/// Errors that stop the game from being assembled.
#[derive(Debug, Error)]
pub enum InitError {
    /// A collaborator the game cannot run without was never provided.
    #[error("Required service '{0}' was not provided")]
    MissingService(&'static str),

    #[error(transparent)]
    Config(#[from] DataLoadError),
}

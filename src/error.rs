//! Error types for premaster
//!
//! One crate-wide error enum using thiserror. Pipeline stages (decode,
//! render, encode) propagate these unchanged to the caller; the content
//! screen never returns an error (it falls back to fixed features instead).

use thiserror::Error;

/// Main error type for the premaster pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Input bytes could not be decoded as audio
    #[error("Audio decode error: {0}")]
    Decode(String),

    /// Offline render / window parameters rejected
    #[error("Audio render error: {0}")]
    Render(String),

    /// Reference catalog loading or validation errors
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type using premaster Error
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for the evaluation harness

use thiserror::Error;

/// Result type alias for harness operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the evaluation harness
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decode/encode error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Snapshot or inference failure
    #[error("Model error: {0}")]
    Model(String),

    /// Sample manifest failure
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Tensor shape mismatch
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a model error
    pub fn model<S: Into<String>>(msg: S) -> Self {
        Error::Model(msg.into())
    }

    /// Create a manifest error
    pub fn manifest<S: Into<String>>(msg: S) -> Self {
        Error::Manifest(msg.into())
    }

    /// Create a shape error
    pub fn shape<S: Into<String>>(msg: S) -> Self {
        Error::Shape(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

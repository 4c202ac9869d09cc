use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Shape mismatch: expected {expected} samples, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Unreadable file {}: {reason}", .path.display())]
    UnreadableFile { path: PathBuf, reason: String },

    #[error("Channel '{channel}' not found in {}", .path.display())]
    MissingChannel { path: PathBuf, channel: String },

    #[error("Model folder does not exist: {}", .0.display())]
    MissingModelFolder(PathBuf),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to encode EXR image: {0}")]
    EncodeError(String),

    #[error("Graph freeze failed: {0}")]
    FreezeError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConversionError {
    /// Errors that only abort the current file; a folder walk logs them and moves on.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            ConversionError::ShapeMismatch { .. }
                | ConversionError::UnreadableFile { .. }
                | ConversionError::MissingChannel { .. }
                | ConversionError::InvalidDimensions(..)
                | ConversionError::OutputWriteError(_)
                | ConversionError::EncodeError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ConversionError>;

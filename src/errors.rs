// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the photo studio
//!
//! Each concern has its own error enum so callers can decide locally how to
//! recover (skip a record, drop a frame, abort one capture). [`AppError`]
//! unifies them for code paths that only need to report.

use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// File write/read failures
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// Malformed persisted filter record
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    /// Object detection failed for a frame
    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),
    /// Metadata store unavailable or write rejected
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    /// Programmer error, the operation was rejected without side effects
    #[error("Precondition violated: {0}")]
    Precondition(#[from] PreconditionViolation),
    /// No catalog entry with this id
    #[error("Image {0} not found")]
    ImageNotFound(i64),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Storage (file I/O) errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Frame data does not describe a valid image
    #[error("Invalid frame: {0}")]
    InvalidFrame(String),
    /// Encoding to the output format failed
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
    /// Writing the file failed
    #[error("Save failed: {0}")]
    SaveFailed(String),
    /// Reading or decoding a stored image failed
    #[error("Load failed: {0}")]
    LoadFailed(String),
    /// Background worker died before finishing
    #[error("Worker failed: {0}")]
    WorkerFailed(String),
}

/// Filter record decoding errors
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The parameter blob is not valid for the record's variant
    #[error("malformed parameters for '{tag}': {reason}")]
    MalformedBlob { tag: String, reason: String },
}

/// Detection errors
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    /// The detector reported a failure
    #[error("Detection failed: {0}")]
    DetectionFailed(String),
    /// The detection worker panicked or was cancelled
    #[error("Detection worker failed: {0}")]
    WorkerFailed(String),
}

/// Metadata store errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Could not open or initialize the store
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    /// The underlying database rejected an operation
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    /// Worker running the store call failed
    #[error("Store worker failed: {0}")]
    WorkerFailed(String),
    /// Filter parameters could not be serialized
    #[error("Could not serialize filter parameters: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Contract violations by the caller
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionViolation {
    /// The filter id is not part of the stack
    #[error("filter {0} is not in the stack")]
    FilterNotFound(u64),
    /// Position past the end of the stack
    #[error("index {index} out of range for stack of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    /// The variant has no control with this key
    #[error("filter '{filter}' has no control '{key}'")]
    UnknownControl { filter: String, key: String },
    /// A value outside every valid range (e.g. NaN)
    #[error("invalid value {value} for control '{key}'")]
    InvalidValue { key: String, value: f32 },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::SaveFailed(err.to_string())
    }
}

impl From<image::ImageError> for StorageError {
    fn from(err: image::ImageError) -> Self {
        StorageError::EncodingFailed(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.into())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Persistence(err.into())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

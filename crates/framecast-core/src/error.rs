//! Error types for Framecast.
//!
//! Configuration errors are deterministic logic errors detected eagerly at
//! construction time; none of them are retryable. End-of-stream is never an
//! error (schedules simply stop yielding frames).

use thiserror::Error;

/// Main error type for Framecast operations.
#[derive(Error, Debug)]
pub enum FramecastError {
    #[error("invalid sequence configuration: {0}")]
    InvalidSequenceConfiguration(String),

    #[error("invalid speed curve: {0}")]
    InvalidSpeedCurve(String),

    #[error("unsupported sequence mismatch: {0}")]
    UnsupportedMismatch(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Framecast operations.
pub type Result<T> = std::result::Result<T, FramecastError>;

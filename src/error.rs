use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Central error type for the audio worker.
#[derive(Debug, Error)]
pub enum WorkerError {
    // Generic fallback (wraps anyhow)
    #[error("{0}")]
    Internal(#[from] anyhow::Error),

    // Domain-specific variants
    #[error("Source file not found: {path}")]
    NotFound { path: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid trim range: start={start}s, end={end}s")]
    InvalidRange { start: f64, end: f64 },

    #[error("Failed to decode {path}: {reason}")]
    Decode { path: String, reason: String },

    #[error("Separation backend unavailable: {0}")]
    SeparationUnavailable(String),

    #[error("Separation failed: {0}")]
    Separation(String),

    #[error("Config error: {0}")]
    Config(String),
}

/// Stable error identity reported across the job boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    InvalidRequest,
    InvalidRange,
    DecodeError,
    SeparationUnavailable,
    InternalError,
}

impl WorkerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::NotFound { .. } => ErrorKind::NotFound,
            WorkerError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            WorkerError::InvalidRange { .. } => ErrorKind::InvalidRange,
            WorkerError::Decode { .. } => ErrorKind::DecodeError,
            WorkerError::SeparationUnavailable(_) => ErrorKind::SeparationUnavailable,
            WorkerError::Separation(_) | WorkerError::Config(_) | WorkerError::Internal(_) => {
                ErrorKind::InternalError
            }
        }
    }

    /// Errors caused by the caller's input rather than by the worker.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::NotFound | ErrorKind::InvalidRequest | ErrorKind::InvalidRange
        )
    }

    pub(crate) fn decode(path: &std::path::Path, reason: impl ToString) -> Self {
        WorkerError::Decode {
            path: path.display().to_string(),
            reason: reason.to_string(),
        }
    }
}

// --- Implement From conversions for common errors ---
impl From<std::io::Error> for WorkerError {
    fn from(e: std::io::Error) -> Self {
        WorkerError::Internal(e.into())
    }
}

impl From<serde_json::Error> for WorkerError {
    fn from(e: serde_json::Error) -> Self {
        WorkerError::Internal(e.into())
    }
}

impl From<hound::Error> for WorkerError {
    fn from(e: hound::Error) -> Self {
        WorkerError::Internal(e.into())
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;

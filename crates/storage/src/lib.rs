//! Storage Layer
//!
//! Append-only JSON Lines log of served predictions, read back by the
//! drift job.

mod inference_log;

pub use inference_log::{read_log, InferenceLogger, InferenceRecord};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Malformed log entry at line {line}: {message}")]
    MalformedEntry { line: usize, message: String },
    #[error("Log writer lock poisoned")]
    LockPoisoned,
}

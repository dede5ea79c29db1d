//! Worker-specific error types
//!
//! Per-URL fetch failures are not errors here: they travel back to the
//! orchestrator as data inside the invocation response.

use thiserror::Error;
use shared::SharedError;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("HTTP client construction failed: {message}")]
    ClientBuild { message: String },

    #[error("Failed to bind worker listener on {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("Unsupported fetch method: {method}")]
    UnsupportedMethod { method: String },

    #[error("Shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type WorkerResult<T> = Result<T, WorkerError>;

//! Orchestrator-specific error types

use thiserror::Error;
use shared::{SharedError, WorkerIndex};

#[derive(Error, Debug)]
pub enum OrchestratorError {
    #[error("Configuration error: {field}")]
    ConfigurationError { field: String },

    #[error("Invalid object path: {path}")]
    InvalidObjectPath { path: String },

    #[error("Object store operation failed: {operation} on {path}: {message}")]
    ObjectStoreError {
        operation: String,
        path: String,
        message: String,
    },

    #[error("Dedup filter persistence failed for {path}: {message}")]
    FilterPersistenceError { path: String, message: String },

    /// A worker reported the same URL as both responded and errored
    #[error("Worker {worker} broke the outcome partition: {overlapping:?} reported as both live and errored")]
    InvariantViolation {
        worker: WorkerIndex,
        overlapping: Vec<String>,
    },

    #[error("Worker invocation failed: {0}")]
    Invocation(#[from] InvocationError),

    #[error("Shared component error")]
    SharedError(#[from] SharedError),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl OrchestratorError {
    pub fn config(field: impl Into<String>) -> Self {
        Self::ConfigurationError { field: field.into() }
    }

    pub fn store(operation: &str, path: impl Into<String>, message: impl ToString) -> Self {
        Self::ObjectStoreError {
            operation: operation.to_string(),
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the error must abort the whole run instead of one target
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InvariantViolation { .. })
    }
}

/// Transport-level failure of one batch invocation
///
/// The batch is abandoned for this run; its URLs stay eligible for the next one.
#[derive(Error, Debug)]
pub enum InvocationError {
    #[error("Invalid endpoint for worker {worker}: {endpoint}")]
    InvalidEndpoint { worker: WorkerIndex, endpoint: String },

    #[error("Transport error talking to worker {worker}: {message}")]
    Transport { worker: WorkerIndex, message: String },

    #[error("Worker {worker} answered HTTP {status}: {body}")]
    HttpStatus {
        worker: WorkerIndex,
        status: u16,
        body: String,
    },

    #[error("Malformed response from worker {worker}: {message}")]
    MalformedResponse { worker: WorkerIndex, message: String },

    #[error("Worker {worker} response does not cover its batch: {missing} missing, {unexpected} unexpected")]
    IncompleteOutcome {
        worker: WorkerIndex,
        missing: usize,
        unexpected: usize,
    },
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

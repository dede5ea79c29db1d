//! Trait definitions with mockall annotations for testing
//!
//! The orchestrator reaches the outside world through two seams: the object
//! store that holds confirmed-live URLs, and the client that invokes remote
//! fetch workers. Both are injected so runs can be tested without network
//! access.

use shared::WorkerIndex;
use crate::core::InvocationResult;
use crate::error::{InvocationError, OrchestratorResult};

/// Durable object store abstraction
///
/// Objects are only ever created under fresh keys; nothing is overwritten.
#[mockall::automock]
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create `bucket` if it does not exist yet
    async fn ensure_bucket(&self, bucket: &str) -> OrchestratorResult<()>;

    /// Write one object
    async fn put_object(&self, bucket: &str, key: &str, body: String) -> OrchestratorResult<()>;

    /// List every key that starts with `prefix`
    async fn list_keys(&self, bucket: &str, prefix: &str) -> OrchestratorResult<Vec<String>>;

    /// Read one object
    async fn get_object(&self, bucket: &str, key: &str) -> OrchestratorResult<Vec<u8>>;
}

/// Remote fetch worker invocation abstraction
#[mockall::automock]
#[async_trait::async_trait]
pub trait WorkerInvoker: Send + Sync {
    /// Send one batch to the worker at `worker` and decode its answer
    ///
    /// # Returns
    /// The typed per-URL result. Per-URL fetch errors are part of the result;
    /// only transport and protocol failures are returned as `Err`.
    async fn invoke(&self, urls: &[String], worker: WorkerIndex) -> Result<InvocationResult, InvocationError>;
}

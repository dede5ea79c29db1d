//! Orchestrator library for distributed URL discovery
//!
//! Expands URL templates into candidates, skips everything already seen,
//! fans the rest out across a pool of stateless fetch workers and commits
//! confirmed-live URLs to an object store.

pub mod config;
pub mod core;
pub mod error;
pub mod orchestrator;
pub mod services;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::DiscoveryConfig;
pub use core::{DedupFilter, InvocationResult, RunSummary, TargetStats};
pub use error::{InvocationError, OrchestratorError, OrchestratorResult};
pub use orchestrator::DiscoveryOrchestrator;
pub use services::{BufferedWriter, HttpWorkerInvoker, LocalObjectStore, S3ObjectStore};
pub use traits::{ObjectStore, WorkerInvoker};
pub use types::{DiscoveryTarget, ObjectPath, WorkerPool};

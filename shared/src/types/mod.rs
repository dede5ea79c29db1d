//! Core types used throughout the discovery system

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use crate::errors::SharedError;

/// Global process ID singleton - set once at startup
static PROCESS_ID: OnceLock<ProcessId> = OnceLock::new();

/// Identity reported before any `init_*` call (library use, tests)
static UNINITIALIZED: ProcessId = ProcessId::Orchestrator;

/// Process identifier for any component in the system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessId {
    /// Discovery orchestrator (singleton)
    Orchestrator,
    /// Fetch worker serving one pool slot
    Worker(u32),
}

impl ProcessId {
    /// Initialize the global process ID for the orchestrator
    pub fn init_orchestrator() -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Orchestrator)
    }

    /// Initialize the global process ID for a worker with its pool index
    pub fn init_worker(index: WorkerIndex) -> &'static ProcessId {
        PROCESS_ID.get_or_init(|| ProcessId::Worker(index.value()))
    }

    /// Get the global process ID, falling back to the orchestrator identity
    pub fn current() -> &'static ProcessId {
        PROCESS_ID.get().unwrap_or(&UNINITIALIZED)
    }
}

impl fmt::Display for ProcessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessId::Orchestrator => write!(f, "orchestrator"),
            ProcessId::Worker(index) => write!(f, "worker_{index}"),
        }
    }
}

/// Index of one interchangeable worker inside the pool `[min, max)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkerIndex(u32);

impl WorkerIndex {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for WorkerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for WorkerIndex {
    fn from(index: u32) -> Self {
        Self(index)
    }
}

impl FromStr for WorkerIndex {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self)
            .map_err(|_| SharedError::InvalidConfig {
                field: "worker_index".to_string(),
                value: s.to_string(),
            })
    }
}

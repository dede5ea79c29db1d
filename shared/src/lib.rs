//! Shared types for the distributed URL discovery system
//!
//! Contains only what crosses the orchestrator ↔ worker boundary: the
//! invocation wire protocol, worker identities, shared errors and the
//! logging setup both binaries use.

pub mod types;
pub mod errors;
pub mod logging;
pub mod messages;

pub use types::*;
pub use errors::*;

// Re-export the worker invocation protocol
pub use messages::{
    FetchOutcome, InvokeRequest, InvokeResponse, UrlOutcome,
    default_fetch_headers,
};

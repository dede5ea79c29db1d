//! Message types for the URL discovery system
//!
//! - `invoke`: Orchestrator ↔ Worker batch invocation protocol

pub mod invoke;

pub use invoke::{
    FetchOutcome, InvokeRequest, InvokeResponse, UrlOutcome,
    default_fetch_headers,
};

//! Service implementations
//!
//! Production implementations of the orchestrator's I/O seams: object
//! stores, the buffered writer on top of them, and the worker HTTP client.

pub mod buffered_writer;
pub mod invoker;
pub mod object_store;

#[cfg(test)]
mod tests;

pub use buffered_writer::BufferedWriter;
pub use invoker::{HttpWorkerInvoker, DEFAULT_CONNECT_TIMEOUT, DEFAULT_INVOKE_TIMEOUT};
pub use object_store::{read_lines, LocalObjectStore, S3ObjectStore};

//! Fetch worker library
//!
//! A worker receives one batch of URLs per invocation, fetches every URL
//! concurrently and answers with the batch partitioned into responded and
//! errored URLs. It keeps no state between invocations.

pub mod batch;
pub mod error;
pub mod fetcher;
pub mod server;
pub mod traits;

pub use batch::run_batch;
pub use error::{WorkerError, WorkerResult};
pub use fetcher::{FetchSettings, ReqwestFetcher};
pub use server::{WorkerState, build_router, serve};
pub use traits::{MockUrlFetcher, UrlFetcher};

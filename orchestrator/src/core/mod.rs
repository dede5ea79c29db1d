//! Core business logic modules
//!
//! Candidate generation, outcome validation, deduplication and run
//! statistics. Apart from the dedup filter's own file, nothing here performs
//! I/O; object-store and network access live in `services`.

pub mod candidates;
pub mod dedup;
pub mod outcome;
pub mod stats;

pub use candidates::{build_candidates, chunk_batches, load_fuzz_terms};
pub use dedup::DedupFilter;
pub use outcome::InvocationResult;
pub use stats::{RunSummary, TargetStats};

//! Run configuration for the discovery orchestrator

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{OrchestratorError, OrchestratorResult};
use crate::types::WorkerPool;

/// Tunables for one discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// URLs per worker invocation
    pub batch_size: usize,
    pub pool: WorkerPool,
    /// Upper bound of the random delay before each dispatch
    pub max_jitter: Duration,
    /// Buffered live URLs per path that trigger an automatic flush
    pub buffer_threshold: usize,
    /// Filter file; `None` keeps the filter in memory for this run only
    pub bloom_filter_path: Option<PathBuf>,
    pub filter_capacity: usize,
    pub filter_fp_rate: f64,
    /// Leave errored URLs out of the filter so a later run retries them
    pub retry_errored: bool,
    /// Example candidates logged per target
    pub example_count: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            pool: WorkerPool { min: 0, max: 10 },
            max_jitter: Duration::from_secs(10),
            buffer_threshold: 1000,
            bloom_filter_path: None,
            filter_capacity: 1_000_000,
            filter_fp_rate: 0.001,
            retry_errored: false,
            example_count: 10,
        }
    }
}

impl DiscoveryConfig {
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn with_buffer_threshold(mut self, threshold: usize) -> Self {
        self.buffer_threshold = threshold;
        self
    }

    pub fn with_bloom_filter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.bloom_filter_path = Some(path.into());
        self
    }

    pub fn with_filter(mut self, capacity: usize, fp_rate: f64) -> Self {
        self.filter_capacity = capacity;
        self.filter_fp_rate = fp_rate;
        self
    }

    pub fn with_retry_errored(mut self, retry_errored: bool) -> Self {
        self.retry_errored = retry_errored;
        self
    }

    /// Reject configurations the run loop cannot honor
    pub fn validate(&self) -> OrchestratorResult<()> {
        if self.batch_size == 0 {
            return Err(OrchestratorError::config("batch_size must be at least 1"));
        }
        if self.buffer_threshold == 0 {
            return Err(OrchestratorError::config("buffer_threshold must be at least 1"));
        }
        if self.pool.max <= self.pool.min {
            return Err(OrchestratorError::config(format!(
                "worker pool [{}, {}) is empty",
                self.pool.min, self.pool.max
            )));
        }
        if self.filter_capacity == 0 {
            return Err(OrchestratorError::config("filter_capacity must be at least 1"));
        }
        if !(self.filter_fp_rate > 0.0 && self.filter_fp_rate < 1.0) {
            return Err(OrchestratorError::config(format!(
                "filter_fp_rate must be in (0, 1), got {}",
                self.filter_fp_rate
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DiscoveryConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.batch_size, 100);
        assert_eq!(config.buffer_threshold, 1000);
        assert_eq!(config.pool.width(), 10);
        assert!(!config.retry_errored);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(DiscoveryConfig::default().with_batch_size(0).validate().is_err());
        assert!(DiscoveryConfig::default().with_buffer_threshold(0).validate().is_err());
        assert!(DiscoveryConfig::default().with_filter(10, 0.0).validate().is_err());
        assert!(DiscoveryConfig::default().with_filter(10, 1.5).validate().is_err());
        assert!(DiscoveryConfig::default().with_filter(0, 0.01).validate().is_err());

        let mut config = DiscoveryConfig::default();
        config.pool = WorkerPool { min: 4, max: 4 };
        assert!(config.validate().is_err());
    }
}

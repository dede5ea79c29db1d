//! Deduplication of candidate URLs across runs
//!
//! Two membership sources decide whether a URL is worth dispatching:
//! a growable bloom filter of every URL already attempted (persisted to a
//! local file between runs) and, per output path, the exact set of live URLs
//! already committed to the object store.

use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use growable_bloom_filter::GrowableBloom;
use shared::{ProcessId, process_debug, process_info};

use crate::config::DiscoveryConfig;
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::read_lines;
use crate::traits::ObjectStore;
use crate::types::ObjectPath;

/// Combined probabilistic and exact "already seen" test
pub struct DedupFilter {
    /// Every attempted URL; insert-only, no false negatives
    bloom: GrowableBloom,

    /// Where the bloom filter is persisted, if anywhere
    path: Option<PathBuf>,

    /// Live URLs already stored, keyed by output path, read once per run
    exact: HashMap<ObjectPath, HashSet<String>>,

    /// URLs recorded during this run
    recorded: u64,

    /// Bloom filter changed since the last persist
    dirty: bool,
}

impl DedupFilter {
    /// Fresh filter that is never written to disk
    pub fn in_memory(capacity: usize, fp_rate: f64) -> Self {
        Self {
            bloom: GrowableBloom::new(fp_rate, capacity),
            path: None,
            exact: HashMap::new(),
            recorded: 0,
            dirty: false,
        }
    }

    /// Load the filter stored at `path`, or create one that will be saved there
    pub async fn open(path: Option<&Path>, capacity: usize, fp_rate: f64) -> OrchestratorResult<Self> {
        let mut filter = Self::in_memory(capacity, fp_rate);
        let Some(path) = path else {
            process_info!(ProcessId::current(), "🧮 Using in-memory dedup filter");
            return Ok(filter);
        };

        if tokio::fs::try_exists(path).await? {
            let bytes = tokio::fs::read(path).await?;
            filter.bloom = bincode::deserialize(&bytes).map_err(|e| OrchestratorError::FilterPersistenceError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            process_info!(ProcessId::current(), "🧮 Loaded dedup filter from {}", path.display());
        } else {
            process_info!(
                ProcessId::current(),
                "🧮 Creating dedup filter at {} (capacity {}, fp rate {})",
                path.display(),
                capacity,
                fp_rate
            );
            // Written right away so a crash before the first group still leaves a valid file
            filter.dirty = true;
        }

        filter.path = Some(path.to_path_buf());
        Ok(filter)
    }

    pub async fn from_config(config: &DiscoveryConfig) -> OrchestratorResult<Self> {
        let mut filter = Self::open(
            config.bloom_filter_path.as_deref(),
            config.filter_capacity,
            config.filter_fp_rate,
        )
        .await?;
        filter.persist().await?;
        Ok(filter)
    }

    /// Install the exact set of stored live URLs for `path`
    ///
    /// Only the first set per path is kept; the exact sets are not refreshed
    /// within a run.
    pub fn reconcile(&mut self, path: &ObjectPath, stored: HashSet<String>) -> usize {
        let set = self.exact.entry(path.clone()).or_insert(stored);
        set.len()
    }

    /// Read the stored live URLs for `path` unless they were already loaded
    pub async fn load_exact<S>(&mut self, store: &S, path: &ObjectPath) -> OrchestratorResult<usize>
    where
        S: ObjectStore + ?Sized,
    {
        if let Some(set) = self.exact.get(path) {
            return Ok(set.len());
        }
        let stored = read_lines(store, path).await?;
        process_debug!(ProcessId::current(), "📚 {} stored live urls under {}", stored.len(), path);
        Ok(self.reconcile(path, stored))
    }

    pub fn has_exact(&self, path: &ObjectPath) -> bool {
        self.exact.contains_key(path)
    }

    /// Whether `url` should be dispatched for a target writing to `path`
    pub fn should_attempt(&self, path: &ObjectPath, url: &str) -> bool {
        if self.bloom.contains(url) {
            return false;
        }
        !self.exact.get(path).is_some_and(|set| set.contains(url))
    }

    /// Mark URLs as attempted, whatever their outcome
    pub fn record_attempted<I, S>(&mut self, urls: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for url in urls {
            self.bloom.insert(url.as_ref());
            self.recorded += 1;
            self.dirty = true;
        }
    }

    /// Bloom-filter membership only
    pub fn contains(&self, url: &str) -> bool {
        self.bloom.contains(url)
    }

    pub fn recorded(&self) -> u64 {
        self.recorded
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the bloom filter to its file if it changed
    ///
    /// The new contents go to a sibling temporary file that is renamed over
    /// the old one, so readers never see a half-written filter.
    pub async fn persist(&mut self) -> OrchestratorResult<()> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }

        let persistence_error = |message: String| OrchestratorError::FilterPersistenceError {
            path: path.display().to_string(),
            message,
        };

        let bytes = bincode::serialize(&self.bloom).map_err(|e| persistence_error(e.to_string()))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut tmp: OsString = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;

        process_debug!(
            ProcessId::current(),
            "💾 Persisted dedup filter ({} bytes) to {}",
            bytes.len(),
            path.display()
        );
        self.dirty = false;
        Ok(())
    }
}

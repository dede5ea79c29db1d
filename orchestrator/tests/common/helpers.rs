//! Test helpers and builder patterns for orchestrator tests

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use orchestrator::services::read_lines;
use orchestrator::traits::MockWorkerInvoker;
use orchestrator::{DiscoveryConfig, DiscoveryOrchestrator, LocalObjectStore, ObjectPath, WorkerPool};
use shared::WorkerIndex;
use tempfile::TempDir;

use super::fixtures::TestFixtures;

/// Every invocation a scripted worker pool received
pub type Dispatches = Arc<Mutex<Vec<(WorkerIndex, Vec<String>)>>>;

/// Builder for orchestrators backed by a temporary local object store
pub struct OrchestratorBuilder {
    config: DiscoveryConfig,
    invoker: MockWorkerInvoker,
}

impl OrchestratorBuilder {
    /// Batch size 2, two workers, no jitter
    pub fn new() -> Self {
        Self {
            config: DiscoveryConfig::default()
                .with_batch_size(2)
                .with_pool(WorkerPool { min: 0, max: 2 })
                .with_max_jitter(Duration::ZERO),
            invoker: MockWorkerInvoker::new(),
        }
    }

    pub fn with_config(mut self, update: impl FnOnce(DiscoveryConfig) -> DiscoveryConfig) -> Self {
        self.config = update(self.config);
        self
    }

    pub fn with_invoker(mut self, invoker: MockWorkerInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    pub async fn build(self, store: Arc<LocalObjectStore>) -> DiscoveryOrchestrator<MockWorkerInvoker, LocalObjectStore> {
        DiscoveryOrchestrator::from_config(self.config, self.invoker, store)
            .await
            .expect("orchestrator builds")
    }
}

/// Common helper functions for tests
pub struct TestHelpers;

impl TestHelpers {
    pub fn local_store() -> (TempDir, Arc<LocalObjectStore>) {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = Arc::new(LocalObjectStore::new(dir.path().join("store")));
        (dir, store)
    }

    pub fn filter_file(dir: &TempDir) -> PathBuf {
        dir.path().join("state").join("seen.bloom")
    }

    /// Worker pool mock answering with the scripted outcomes and logging each call
    pub fn scripted_invoker() -> (MockWorkerInvoker, Dispatches) {
        let dispatches: Dispatches = Arc::default();
        let log = dispatches.clone();

        let mut invoker = MockWorkerInvoker::new();
        invoker.expect_invoke().returning(move |urls, worker| {
            log.lock().unwrap().push((worker, urls.to_vec()));
            Ok(TestFixtures::scripted_result(urls))
        });
        (invoker, dispatches)
    }

    /// Invoker that must never be called
    pub fn idle_invoker() -> MockWorkerInvoker {
        let mut invoker = MockWorkerInvoker::new();
        invoker.expect_invoke().times(0);
        invoker
    }

    pub async fn stored_urls(store: &LocalObjectStore, path: &ObjectPath) -> HashSet<String> {
        read_lines(store, path).await.expect("stored urls readable")
    }

    pub fn dispatched_urls(dispatches: &Dispatches) -> Vec<String> {
        let mut urls: Vec<String> = dispatches
            .lock()
            .unwrap()
            .iter()
            .flat_map(|(_, batch)| batch.clone())
            .collect();
        urls.sort();
        urls
    }
}

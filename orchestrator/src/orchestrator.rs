//! Discovery run loop
//!
//! For every target the orchestrator builds candidates, drops the ones the
//! dedup filter has already seen, and dispatches the rest in rotation groups
//! spanning the whole worker pool. Outcomes are folded into the filter and
//! the buffered writer as each dispatch completes.

use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use rand::Rng;

use shared::{logging, process_debug, process_error, process_info, process_warn, ProcessId, WorkerIndex};

use crate::config::DiscoveryConfig;
use crate::core::{build_candidates, chunk_batches, DedupFilter, InvocationResult, RunSummary, TargetStats};
use crate::error::{OrchestratorError, OrchestratorResult};
use crate::services::BufferedWriter;
use crate::traits::{ObjectStore, WorkerInvoker};
use crate::types::{DiscoveryTarget, ObjectPath};

pub struct DiscoveryOrchestrator<I, S>
where
    I: WorkerInvoker,
    S: ObjectStore + ?Sized,
{
    config: DiscoveryConfig,
    invoker: I,
    dedup: DedupFilter,
    writer: BufferedWriter<S>,
}

impl<I, S> DiscoveryOrchestrator<I, S>
where
    I: WorkerInvoker,
    S: ObjectStore + ?Sized,
{
    pub fn new(config: DiscoveryConfig, invoker: I, store: Arc<S>, dedup: DedupFilter) -> OrchestratorResult<Self> {
        config.validate()?;
        let writer = BufferedWriter::new(store, config.buffer_threshold);
        Ok(Self {
            config,
            invoker,
            dedup,
            writer,
        })
    }

    /// Open (or create) the configured dedup filter and build the orchestrator
    pub async fn from_config(config: DiscoveryConfig, invoker: I, store: Arc<S>) -> OrchestratorResult<Self> {
        config.validate()?;
        let dedup = DedupFilter::from_config(&config).await?;
        Self::new(config, invoker, store, dedup)
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    pub fn dedup(&self) -> &DedupFilter {
        &self.dedup
    }

    pub fn writer(&self) -> &BufferedWriter<S> {
        &self.writer
    }

    /// Run every target in order
    ///
    /// A failing target is logged and recorded in the summary; the run moves
    /// on to the next one. Only an invariant violation aborts the run, after
    /// a best-effort flush of what was already confirmed.
    pub async fn run(&mut self, targets: &[DiscoveryTarget], terms: &[String]) -> OrchestratorResult<RunSummary> {
        let mut summary = RunSummary::default();

        for (index, target) in targets.iter().enumerate() {
            process_info!(
                ProcessId::current(),
                "🎯 Target {}/{}: {} -> {}",
                index + 1,
                targets.len(),
                target.url_template,
                target.output
            );

            match self.run_target(target, terms).await {
                Ok(stats) => {
                    logging::log_success(ProcessId::current(), &format!("{}: {}", target.output, stats));
                    summary.completed.push((target.output.clone(), stats));
                }
                Err(e) if e.is_fatal() => {
                    process_error!(ProcessId::current(), "🛑 Aborting run: {}", e);
                    if let Err(finish_error) = self.finish().await {
                        logging::log_error(ProcessId::current(), "Final flush after abort failed", &finish_error);
                    }
                    return Err(e);
                }
                Err(e) => {
                    logging::log_error(ProcessId::current(), &format!("Target {} failed", target.output), &e);
                    summary.failed.push((target.output.clone(), e.to_string()));
                }
            }
        }

        self.finish().await?;
        Ok(summary)
    }

    /// Discover live URLs for one target
    pub async fn run_target(&mut self, target: &DiscoveryTarget, terms: &[String]) -> OrchestratorResult<TargetStats> {
        let path = &target.output;
        let candidates = build_candidates(&target.url_template, terms)?;
        let mut stats = TargetStats {
            candidates: candidates.len(),
            ..TargetStats::default()
        };

        self.dedup.load_exact(self.writer.store().as_ref(), path).await?;
        let to_dispatch: Vec<String> = candidates
            .into_iter()
            .filter(|url| self.dedup.should_attempt(path, url))
            .collect();
        stats.filtered_out = stats.candidates - to_dispatch.len();

        process_info!(
            ProcessId::current(),
            "🔎 {} of {} candidates left after filtering ({} already seen)",
            to_dispatch.len(),
            stats.candidates,
            stats.filtered_out
        );
        for example in to_dispatch.iter().take(self.config.example_count) {
            process_info!(ProcessId::current(), "   e.g. {}", example);
        }

        let batches = chunk_batches(to_dispatch, self.config.batch_size);
        let width = self.config.pool.width();
        let group_count = batches.len().div_ceil(width);
        let mut batches_done = 0;

        for (group_index, group) in batches.chunks(width).enumerate() {
            self.dispatch_group(path, group_index, group, &mut stats).await?;
            batches_done += group.len();
            logging::log_progress(
                ProcessId::current(),
                &format!("Group {}/{} for {}", group_index + 1, group_count, path),
                &progress_details(batches_done, batches.len(), &stats),
            );

            if let Err(e) = self.writer.flush(path).await {
                logging::log_error(ProcessId::current(), "Flush after group failed, urls stay buffered", &e);
            }
            self.dedup.persist().await?;
        }

        self.writer.flush_all().await?;
        self.dedup.persist().await?;
        Ok(stats)
    }

    /// Dispatch one rotation group concurrently and fold in each result
    async fn dispatch_group(
        &mut self,
        path: &ObjectPath,
        group_index: usize,
        group: &[Vec<String>],
        stats: &mut TargetStats,
    ) -> OrchestratorResult<()> {
        let pool = self.config.pool;
        let max_jitter = self.config.max_jitter;
        let invoker = &self.invoker;

        let mut in_flight: FuturesUnordered<_> = group
            .iter()
            .enumerate()
            .map(|(slot, batch)| {
                let worker = pool.assign(group_index, slot);
                let delay = jitter(max_jitter);
                async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let result = invoker.invoke(batch, worker).await;
                    (worker, batch, result)
                }
            })
            .collect();
        stats.batches_dispatched += group.len();

        while let Some((worker, batch, result)) = in_flight.next().await {
            let checked = result
                .map_err(OrchestratorError::from)
                .and_then(|outcome| outcome.check_partition(worker, batch).map(|()| outcome));

            match checked {
                Ok(outcome) => {
                    let live = outcome.live_urls();
                    let responded = outcome.responded_urls().len();
                    let errored = outcome.errored_urls().len();
                    stats.live_urls += live.len();
                    stats.dead_urls += responded - live.len();
                    stats.errored_urls += errored;

                    process_debug!(
                        ProcessId::current(),
                        "📥 Worker {}: {} live, {} dead, {} errored",
                        worker,
                        live.len(),
                        responded - live.len(),
                        errored
                    );

                    record_outcome(&mut self.dedup, self.config.retry_errored, batch, &outcome);
                    if let Err(e) = self.writer.append(path, live).await {
                        logging::log_error(ProcessId::current(), "Automatic flush failed, urls stay buffered", &e);
                    }
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    stats.batches_failed += 1;
                    log_failed_batch(worker, batch, &e);
                }
            }
        }
        Ok(())
    }

    /// Flush every buffer and persist the filter
    async fn finish(&mut self) -> OrchestratorResult<()> {
        let written = self.writer.flush_all().await?;
        self.dedup.persist().await?;
        process_debug!(
            ProcessId::current(),
            "🏁 Final flush wrote {} objects, {} urls recorded this run",
            written.len(),
            self.dedup.recorded()
        );
        Ok(())
    }
}

/// Record a batch as attempted
///
/// Errored URLs are left out when they should be retried by a later run.
fn record_outcome(dedup: &mut DedupFilter, retry_errored: bool, batch: &[String], outcome: &InvocationResult) {
    if retry_errored {
        dedup.record_attempted(outcome.responded_urls());
    } else {
        dedup.record_attempted(batch);
    }
}

fn progress_details(batches_done: usize, batches_total: usize, stats: &TargetStats) -> String {
    format!(
        "{}/{} batches done, {} live, {} failed batches",
        batches_done, batches_total, stats.live_urls, stats.batches_failed
    )
}

/// Everything needed to re-run a failed batch by hand
fn failed_batch_report(worker: WorkerIndex, batch: &[String], error: &OrchestratorError) -> String {
    format!(
        "Batch of {} urls on worker {} failed, left for a later run: {} urls={}",
        batch.len(),
        worker,
        error,
        batch.join(",")
    )
}

fn log_failed_batch(worker: WorkerIndex, batch: &[String], error: &OrchestratorError) {
    process_warn!(ProcessId::current(), "⚠️ {}", failed_batch_report(worker, batch, error));
}

/// Uniform random delay in `[0, max]`
fn jitter(max: Duration) -> Duration {
    if max.is_zero() {
        return Duration::ZERO;
    }
    max.mul_f64(rand::thread_rng().gen_range(0.0..=1.0))
}

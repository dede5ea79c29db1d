//! Per-target and per-run counters

use std::fmt;

use crate::types::ObjectPath;

/// Progress counters for one discovery target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetStats {
    pub candidates: usize,
    /// Candidates dropped by the dedup pre-filter
    pub filtered_out: usize,
    pub batches_dispatched: usize,
    /// Batches lost to transport failures
    pub batches_failed: usize,
    pub live_urls: usize,
    /// Responded with a non success-class status
    pub dead_urls: usize,
    pub errored_urls: usize,
}

impl TargetStats {
    pub fn to_dispatch(&self) -> usize {
        self.candidates - self.filtered_out
    }

    pub fn merge(&mut self, other: &TargetStats) {
        self.candidates += other.candidates;
        self.filtered_out += other.filtered_out;
        self.batches_dispatched += other.batches_dispatched;
        self.batches_failed += other.batches_failed;
        self.live_urls += other.live_urls;
        self.dead_urls += other.dead_urls;
        self.errored_urls += other.errored_urls;
    }
}

impl fmt::Display for TargetStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} candidates ({} filtered), {}/{} batches ok, {} live, {} dead, {} errored",
            self.candidates,
            self.filtered_out,
            self.batches_dispatched - self.batches_failed,
            self.batches_dispatched,
            self.live_urls,
            self.dead_urls,
            self.errored_urls
        )
    }
}

/// Outcome of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub completed: Vec<(ObjectPath, TargetStats)>,
    /// Targets abandoned on a non-fatal error, with the error text
    pub failed: Vec<(ObjectPath, String)>,
}

impl RunSummary {
    pub fn totals(&self) -> TargetStats {
        self.completed.iter().fold(TargetStats::default(), |mut acc, (_, stats)| {
            acc.merge(stats);
            acc
        })
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Discovery run summary")?;
        for (path, stats) in &self.completed {
            writeln!(f, "  ✅ {path}: {stats}")?;
        }
        for (path, error) in &self.failed {
            writeln!(f, "  ❌ {path}: {error}")?;
        }
        write!(f, "  Total: {}", self.totals())
    }
}

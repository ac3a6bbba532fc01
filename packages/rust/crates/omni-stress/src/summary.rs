//! Ready-made aggregation sink: per-job counters and latency bounds.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::job::JobResult;

/// Outcomes that can report failure.
pub trait Outcome {
    /// Whether this outcome counts as a failure.
    fn is_failure(&self) -> bool;
}

impl<T, E> Outcome for Result<T, E> {
    fn is_failure(&self) -> bool {
        self.is_err()
    }
}

/// Aggregated counters for one job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobStats {
    /// Number of delivered results.
    pub completed: u64,
    /// Number of delivered failures, crashes included.
    pub failed: u64,
    /// Highest sequence number seen.
    pub max_seq: u64,
    /// Sum of execution durations.
    pub total_took: Duration,
    /// Fastest execution.
    pub min_took: Option<Duration>,
    /// Slowest execution.
    pub max_took: Option<Duration>,
}

impl JobStats {
    /// Mean execution duration, if anything completed.
    pub fn mean_took(&self) -> Option<Duration> {
        let completed = u32::try_from(self.completed).ok()?;
        (completed > 0).then(|| self.total_took / completed)
    }
}

/// Per-job summary keyed by job name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    jobs: BTreeMap<String, JobStats>,
}

impl RunSummary {
    /// Empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one delivered result; only crashed executions count as failed.
    pub fn record<T>(&mut self, result: &JobResult<T>) {
        self.record_with(result, result.is_crash());
    }

    /// Record one delivered result, counting it as failed when it crashed or
    /// its data says so.
    pub fn record_outcome<T: Outcome>(&mut self, result: &JobResult<T>) {
        let failed = match &result.data {
            Ok(data) => data.is_failure(),
            Err(_) => true,
        };
        self.record_with(result, failed);
    }

    fn record_with<T>(&mut self, result: &JobResult<T>, failed: bool) {
        let stats = self.jobs.entry(result.job_name.clone()).or_default();
        stats.completed += 1;
        if failed {
            stats.failed += 1;
        }
        stats.max_seq = stats.max_seq.max(result.seq);
        stats.total_took += result.took;
        stats.min_took = Some(stats.min_took.map_or(result.took, |v| v.min(result.took)));
        stats.max_took = Some(stats.max_took.map_or(result.took, |v| v.max(result.took)));
    }

    /// Counters for one job.
    pub fn job(&self, name: &str) -> Option<&JobStats> {
        self.jobs.get(name)
    }

    /// All jobs in name order.
    pub fn jobs(&self) -> impl Iterator<Item = (&str, &JobStats)> {
        self.jobs.iter().map(|(name, stats)| (name.as_str(), stats))
    }

    /// Results delivered across all jobs.
    pub fn total_completed(&self) -> u64 {
        self.jobs.values().map(|stats| stats.completed).sum()
    }

    /// Failures delivered across all jobs.
    pub fn total_failed(&self) -> u64 {
        self.jobs.values().map(|stats| stats.failed).sum()
    }
}

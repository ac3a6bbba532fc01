//! Job descriptors and execution results.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;

use crate::error::JobCrash;

/// Async unit of work so jobs can be closures or dedicated request types.
#[async_trait]
pub trait JobFn<T>: Send + Sync {
    /// Run the work once and return its outcome.
    async fn call(&self) -> T;
}

#[async_trait]
impl<F, Fut, T> JobFn<T> for F
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    async fn call(&self) -> T {
        (self)().await
    }
}

pub(crate) enum Work<T> {
    Async(Arc<dyn JobFn<T>>),
    Blocking(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T> Clone for Work<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Async(work) => Self::Async(Arc::clone(work)),
            Self::Blocking(work) => Self::Blocking(Arc::clone(work)),
        }
    }
}

impl<T: Send + 'static> Work<T> {
    /// Run once in a task of its own so a panic stays inside that task.
    pub(crate) fn spawn(&self) -> JoinHandle<T> {
        match self {
            Self::Async(work) => {
                let work = Arc::clone(work);
                tokio::spawn(async move { work.call().await })
            }
            Self::Blocking(work) => {
                let work = Arc::clone(work);
                tokio::task::spawn_blocking(move || work())
            }
        }
    }
}

/// Immutable description of one repeatable unit of work.
pub struct Job<T> {
    name: String,
    work: Work<T>,
    runs: Option<u64>,
    concurrency: Option<usize>,
}

impl<T> Clone for Job<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            work: self.work.clone(),
            runs: self.runs,
            concurrency: self.concurrency,
        }
    }
}

impl<T> std::fmt::Debug for Job<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("name", &self.name)
            .field("runs", &self.runs)
            .field("concurrency", &self.concurrency)
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Job<T> {
    /// Job driven by async work. Runs forever and inherits the runner cap until configured.
    pub fn new(name: impl Into<String>, work: impl JobFn<T> + 'static) -> Self {
        Self {
            name: name.into(),
            work: Work::Async(Arc::new(work)),
            runs: None,
            concurrency: None,
        }
    }

    /// Job driven by a blocking function, executed on the blocking pool.
    ///
    /// Tokio's blocking pool has its own thread limit (512 by default), shared by
    /// every blocking job in the process. A cap above that limit does not raise
    /// real parallelism; admitted executions queue for a pool thread and their
    /// `took` includes that wait.
    pub fn blocking<F>(name: impl Into<String>, work: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            work: Work::Blocking(Arc::new(work)),
            runs: None,
            concurrency: None,
        }
    }
}

impl<T> Job<T> {
    /// Total executions; 0 means unlimited.
    pub fn with_runs(mut self, runs: u64) -> Self {
        self.runs = (runs > 0).then_some(runs);
        self
    }

    /// Own concurrency cap; 0 means inherit the runner default.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = (concurrency > 0).then_some(concurrency);
        self
    }

    /// Job name used in results and notices.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run limit; `None` runs until stopped.
    pub fn runs(&self) -> Option<u64> {
        self.runs
    }

    /// Own cap, if any.
    pub fn concurrency(&self) -> Option<usize> {
        self.concurrency
    }

    /// Own cap if set, otherwise `default_concurrency`.
    pub fn effective_concurrency(&self, default_concurrency: usize) -> usize {
        self.concurrency.unwrap_or(default_concurrency)
    }

    pub(crate) fn work(&self) -> &Work<T> {
        &self.work
    }
}

/// Outcome of one completed execution.
#[derive(Debug, Clone)]
pub struct JobResult<T> {
    /// Value returned by the work, carried verbatim, or the crash that
    /// prevented the work from returning one.
    pub data: Result<T, JobCrash>,
    /// Name of the job that produced it.
    pub job_name: String,
    /// 1-based admission order within the job.
    pub seq: u64,
    /// Wall-clock start.
    pub started_at: DateTime<Utc>,
    /// Wall-clock end.
    pub finished_at: DateTime<Utc>,
    /// Monotonic duration of the work.
    pub took: Duration,
}

impl<T> JobResult<T> {
    /// Whether the work panicked or was cancelled instead of returning.
    pub fn is_crash(&self) -> bool {
        self.data.is_err()
    }
}

/// Job whose work reports failure through an error value.
pub type FallibleJob = Job<anyhow::Result<()>>;

/// Result of a [`FallibleJob`] execution.
pub type FallibleJobResult = JobResult<anyhow::Result<()>>;

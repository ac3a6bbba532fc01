//! Runner lifecycle: one scheduler loop per job, a completion watcher that
//! closes the result funnel, and a single aggregation consumer.
//!
//! ```text
//! start()
//!   ├─ spawn JobScheduler::run  (one per job) ──┐ results
//!   ├─ spawn completion watcher ─ joins loops   ├──────────► mpsc funnel
//!   │     └─ drops the last sender (closes)     ┘                │
//!   └─ consume funnel on the calling task ◄──────────────────────┘
//!         └─ on_result(JobResult)
//! ```
//!
//! A work callable that never returns blocks its job's drain, and therefore
//! `start`, forever. Wrap such work in `tokio::time::timeout` if needed.

mod scheduler;

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::RunnerConfig;
use crate::error::{Result, RunnerError};
use crate::job::{Job, JobResult};
use crate::log::{RunLog, TracingLog, WriterLog};

use self::scheduler::JobScheduler;

type Aggregator<T> = Box<dyn FnMut(JobResult<T>) + Send>;

/// Drives a set of jobs under bounded concurrency and funnels their results
/// into one aggregation callback.
pub struct Runner<T> {
    config: RunnerConfig,
    jobs: Vec<Job<T>>,
    cancel: CancellationToken,
    log: Arc<dyn RunLog>,
    on_result: Mutex<Option<Aggregator<T>>>,
}

impl<T> std::fmt::Debug for Runner<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("jobs", &self.jobs)
            .field("stopped", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// Cloneable handle that stops a runner from another task.
#[derive(Debug, Clone)]
pub struct StopHandle {
    cancel: CancellationToken,
}

impl StopHandle {
    /// Stop admitting new executions. Idempotent.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Whether stop has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl<T: Send + 'static> Runner<T> {
    /// Build a runner with `default_concurrency` as the cap for jobs without their own.
    pub fn new<F>(default_concurrency: usize, jobs: Vec<Job<T>>, on_result: F) -> Result<Self>
    where
        F: FnMut(JobResult<T>) + Send + 'static,
    {
        Self::with_config(RunnerConfig::new(default_concurrency), jobs, on_result)
    }

    /// Build a runner from an explicit config.
    pub fn with_config<F>(config: RunnerConfig, jobs: Vec<Job<T>>, on_result: F) -> Result<Self>
    where
        F: FnMut(JobResult<T>) + Send + 'static,
    {
        config.validate()?;
        Ok(Self {
            config,
            jobs,
            cancel: CancellationToken::new(),
            log: Arc::new(TracingLog),
            on_result: Mutex::new(Some(Box::new(on_result))),
        })
    }

    /// Replace the notice sink.
    ///
    /// Shares one slot with [`Runner::set_log_writer`]; whichever is called
    /// last decides where notices go.
    pub fn with_log(mut self, log: Arc<dyn RunLog>) -> Self {
        self.log = log;
        self
    }

    /// Send notices to `writer` instead of `tracing`.
    ///
    /// Shares one slot with [`Runner::with_log`]; whichever is called last
    /// decides where notices go.
    pub fn set_log_writer<W>(&mut self, writer: W)
    where
        W: Write + Send + 'static,
    {
        self.log = Arc::new(WriterLog::new(writer));
    }

    /// Run every job and deliver every result to the aggregation callback.
    ///
    /// Resolves once all jobs finished (run limit reached, or stopped and
    /// drained) and the funnel is empty. A runner can be started once.
    pub async fn start(&self) -> Result<()> {
        let mut on_result = self.take_aggregator()?;
        let (results_tx, mut results_rx) = mpsc::channel(self.config.funnel_capacity());

        let mut loops = JoinSet::new();
        for job in &self.jobs {
            let scheduler = JobScheduler {
                concurrency: job.effective_concurrency(self.config.default_concurrency),
                job: job.clone(),
                cancel: self.cancel.clone(),
                results_tx: results_tx.clone(),
                log: Arc::clone(&self.log),
            };
            loops.spawn(scheduler.run());
        }
        tracing::debug!(
            jobs = self.jobs.len(),
            default_concurrency = self.config.default_concurrency,
            "runner started"
        );

        let log = Arc::clone(&self.log);
        let watcher = tokio::spawn(async move {
            while let Some(joined) = loops.join_next().await {
                if let Err(error) = joined {
                    tracing::error!("job scheduler loop crashed: {error}");
                }
            }
            log.info("all jobs finished");
            drop(results_tx);
        });

        let mut delivered: u64 = 0;
        while let Some(result) = results_rx.recv().await {
            on_result(result);
            delivered += 1;
        }

        watcher
            .await
            .map_err(|error| RunnerError::Join(error.to_string()))?;
        tracing::debug!(delivered, "result funnel drained");
        Ok(())
    }

    fn take_aggregator(&self) -> Result<Aggregator<T>> {
        self.on_result
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(RunnerError::AlreadyStarted)
    }
}

impl<T> Runner<T> {
    /// Stop admitting new executions; in-flight ones finish and are delivered.
    ///
    /// Non-blocking and idempotent. Await `start` to observe the drain.
    pub fn stop(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("runner stop requested");
        }
        self.cancel.cancel();
    }

    /// Handle for stopping this runner from elsewhere.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            cancel: self.cancel.clone(),
        }
    }

    /// Whether stop has been signalled.
    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Jobs owned by this runner.
    pub fn jobs(&self) -> &[Job<T>] {
        &self.jobs
    }

    /// Limits this runner was built with.
    pub fn config(&self) -> RunnerConfig {
        self.config
    }
}

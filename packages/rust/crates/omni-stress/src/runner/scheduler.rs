use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::error::JobCrash;
use crate::job::{Job, JobResult, Work};
use crate::log::RunLog;

/// Admission loop for one job.
pub(super) struct JobScheduler<T> {
    pub(super) job: Job<T>,
    pub(super) concurrency: usize,
    pub(super) cancel: CancellationToken,
    pub(super) results_tx: mpsc::Sender<JobResult<T>>,
    pub(super) log: Arc<dyn RunLog>,
}

impl<T: Send + 'static> JobScheduler<T> {
    /// Admit executions until the run limit is reached or stop is signalled,
    /// then wait for every admitted execution to finish.
    pub(super) async fn run(self) {
        let gate = Arc::new(Semaphore::new(self.concurrency));
        let mut executions = JoinSet::new();
        let mut issued: u64 = 0;

        tracing::debug!(
            job = %self.job.name(),
            concurrency = self.concurrency,
            runs = ?self.job.runs(),
            "job scheduler started"
        );

        loop {
            if self.job.runs().is_some_and(|runs| issued >= runs) {
                break;
            }

            let permit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    self.log.info(&format!(
                        "received stop in '{}' job, waiting to finish",
                        self.job.name()
                    ));
                    break;
                }
                permit = Arc::clone(&gate).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            issued += 1;
            executions.spawn(execute(
                self.job.work().clone(),
                self.job.name().to_string(),
                issued,
                permit,
                self.results_tx.clone(),
            ));

            while let Some(joined) = executions.try_join_next() {
                report_crashed_execution(self.job.name(), joined);
            }
        }

        while let Some(joined) = executions.join_next().await {
            report_crashed_execution(self.job.name(), joined);
        }

        tracing::debug!(job = %self.job.name(), issued, "job scheduler drained");
        self.log.info(&format!("'{}' job is done", self.job.name()));
    }
}

fn report_crashed_execution(job_name: &str, joined: Result<(), JoinError>) {
    if let Err(error) = joined {
        tracing::error!(job = %job_name, "job execution task crashed: {error}");
    }
}

/// One admitted execution: the permit is held only while the work runs and is
/// released on every path before the result is published. A crashed work
/// task is published as `JobCrash` under its own sequence number.
async fn execute<T: Send + 'static>(
    work: Work<T>,
    job_name: String,
    seq: u64,
    permit: OwnedSemaphorePermit,
    results_tx: mpsc::Sender<JobResult<T>>,
) {
    let started_at = Utc::now();
    let clock = Instant::now();
    let outcome = work.spawn().await;
    let took = clock.elapsed();
    let finished_at = Utc::now();
    drop(permit);

    let data = outcome.map_err(|error| {
        tracing::error!(job = %job_name, seq, "job execution crashed: {error}");
        JobCrash::from_join_error(error)
    });

    let result = JobResult {
        data,
        job_name,
        seq,
        started_at,
        finished_at,
        took,
    };
    if let Err(error) = results_tx.send(result).await {
        tracing::debug!(
            job = %error.0.job_name,
            seq = error.0.seq,
            "result funnel closed; dropping result"
        );
    }
}

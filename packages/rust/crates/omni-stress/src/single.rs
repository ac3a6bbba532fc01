//! One unnamed, unlimited job running in the background.

use tokio::task::JoinHandle;

use crate::error::{JobCrash, Result, RunnerError};
use crate::job::{Job, JobFn};
use crate::runner::{Runner, StopHandle};

/// Background run started by [`start_single`] or [`start_single_blocking`].
#[derive(Debug)]
pub struct SingleRun {
    stop: StopHandle,
    handle: JoinHandle<Result<()>>,
}

impl SingleRun {
    /// Signal stop and wait until every in-flight execution has been delivered.
    pub async fn stop_and_wait(self) -> Result<()> {
        self.stop.stop();
        self.handle
            .await
            .map_err(|error| RunnerError::Join(error.to_string()))?
    }

    /// Handle for stopping the run without waiting.
    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }
}

/// Run async `work` forever under `default_concurrency`, passing each value to `on_data`.
///
/// An execution whose work panicked reaches `on_data` as `Err(JobCrash)`.
///
/// Must be called inside a tokio runtime.
pub fn start_single<T, W, A>(default_concurrency: usize, work: W, on_data: A) -> Result<SingleRun>
where
    T: Send + 'static,
    W: JobFn<T> + 'static,
    A: FnMut(std::result::Result<T, JobCrash>) + Send + 'static,
{
    spawn_single(default_concurrency, Job::new("", work), on_data)
}

/// Blocking counterpart of [`start_single`]; `work` runs on the blocking pool.
pub fn start_single_blocking<T, W, A>(
    default_concurrency: usize,
    work: W,
    on_data: A,
) -> Result<SingleRun>
where
    T: Send + 'static,
    W: Fn() -> T + Send + Sync + 'static,
    A: FnMut(std::result::Result<T, JobCrash>) + Send + 'static,
{
    spawn_single(default_concurrency, Job::blocking("", work), on_data)
}

fn spawn_single<T, A>(default_concurrency: usize, job: Job<T>, mut on_data: A) -> Result<SingleRun>
where
    T: Send + 'static,
    A: FnMut(std::result::Result<T, JobCrash>) + Send + 'static,
{
    let runner = Runner::new(default_concurrency, vec![job], move |result| {
        on_data(result.data);
    })?;
    let stop = runner.stop_handle();
    let handle = tokio::spawn(async move { runner.start().await });
    Ok(SingleRun { stop, handle })
}

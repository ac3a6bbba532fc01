//! omni-stress - concurrent job driver for load and stress testing.
//!
//! - Each [`Job`] repeats a unit of work a fixed number of times or until stopped,
//!   with at most its concurrency cap in flight.
//! - Every completed execution becomes a [`JobResult`] pushed into one result
//!   funnel and handed to the caller's aggregation callback, one at a time.
//!   A panicking execution is delivered too, as `Err(JobCrash)` in `data`.
//! - [`Runner::stop`] stops new admissions; in-flight executions still finish
//!   and are delivered before [`Runner::start`] resolves.
//!
//! ```no_run
//! use omni_stress::{Job, Runner};
//!
//! # async fn demo() -> omni_stress::Result<()> {
//! let job = Job::new("ping", || async { 1_u32 }).with_runs(100);
//! let runner = Runner::new(4, vec![job], |result| {
//!     println!("{} #{} took {:?}", result.job_name, result.seq, result.took);
//! })?;
//! runner.start().await
//! # }
//! ```

mod config;
mod error;
mod job;
mod log;
mod runner;
mod single;
mod summary;

pub use config::{RunnerConfig, RunnerSettings, load_runner_settings_from_paths};
pub use error::{JobCrash, Result, RunnerError};
pub use job::{FallibleJob, FallibleJobResult, Job, JobFn, JobResult};
pub use log::{RunLog, TracingLog, WriterLog};
pub use runner::{Runner, StopHandle};
pub use single::{SingleRun, start_single, start_single_blocking};
pub use summary::{JobStats, Outcome, RunSummary};

//! Job descriptors, work callables and per-execution results.

mod types;

pub(crate) use types::Work;
pub use types::{FallibleJob, FallibleJobResult, Job, JobFn, JobResult};

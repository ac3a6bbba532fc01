//! Error types for the stress runner.
//!
//! Work callables never produce a `RunnerError`; their failures travel inside
//! `JobResult::data`. These variants only cover construction and lifecycle.

use std::any::Any;

use thiserror::Error;
use tokio::task::JoinError;

/// Runner-level errors.
#[derive(Error, Debug)]
pub enum RunnerError {
    /// A concurrency cap or funnel capacity of zero would admit nothing.
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// `start` was called on a runner that already ran.
    #[error("Runner already started")]
    AlreadyStarted,

    /// Settings file could not be read or parsed.
    #[error("Settings error: {0}")]
    Settings(String),

    /// A background run task failed to join.
    #[error("Join error: {0}")]
    Join(String),
}

/// An execution whose work panicked or was cancelled before returning.
///
/// Published in place of the work's value so the execution keeps its
/// sequence number in the result stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("job execution crashed: {message}")]
pub struct JobCrash {
    /// Panic message, or the join failure text when there is none.
    pub message: String,
    /// Whether the work panicked (as opposed to being cancelled).
    pub panicked: bool,
}

impl JobCrash {
    pub(crate) fn from_join_error(error: JoinError) -> Self {
        if error.is_panic() {
            Self {
                message: panic_message(error.into_panic()),
                panicked: true,
            }
        } else {
            Self {
                message: error.to_string(),
                panicked: false,
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map_or_else(|| "non-string panic payload".to_string(), |m| (*m).to_string()),
    }
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;

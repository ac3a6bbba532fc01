//! Sinks for the runner's informational notices.
//!
//! Notices are free text ("all jobs finished", "'name' job is done", ...) and
//! carry no contract. Structured diagnostics go through `tracing` directly.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;

/// Destination for runner notices.
pub trait RunLog: Send + Sync {
    /// Record one informational notice.
    fn info(&self, message: &str);
}

/// Forwards notices to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl RunLog for TracingLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "omni_stress", "{message}");
    }
}

/// Writes timestamped notice lines to any `std::io::Write`.
pub struct WriterLog<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterLog<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> RunLog for WriterLog<W> {
    fn info(&self, message: &str) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let line = format!("{}, {message}\n", Utc::now().to_rfc3339());
        if let Err(error) = writer.write_all(line.as_bytes()).and_then(|()| writer.flush()) {
            tracing::warn!(error = %error, "failed to write runner notice");
        }
    }
}

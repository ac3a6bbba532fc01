//! Shared test helpers for omni-stress.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use omni_stress::{JobResult, RunLog};

/// Notice sink that keeps every message for later assertions.
#[derive(Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<String>>,
}

impl RecordingLog {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().expect("log lock").clone()
    }
}

impl RunLog for RecordingLog {
    fn info(&self, message: &str) {
        self.messages
            .lock()
            .expect("log lock")
            .push(message.to_string());
    }
}

/// Aggregation sink that stores results and flags overlapping callbacks.
pub struct Collector<T> {
    results: Mutex<Vec<JobResult<T>>>,
    inside: AtomicBool,
    overlapped: AtomicBool,
}

impl<T: Send + 'static> Collector<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            results: Mutex::new(Vec::new()),
            inside: AtomicBool::new(false),
            overlapped: AtomicBool::new(false),
        })
    }

    pub fn sink(self: &Arc<Self>) -> impl FnMut(JobResult<T>) + Send + 'static {
        let collector = Arc::clone(self);
        move |result| collector.push(result)
    }

    fn push(&self, result: JobResult<T>) {
        if self.inside.swap(true, Ordering::SeqCst) {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.results.lock().expect("results lock").push(result);
        self.inside.store(false, Ordering::SeqCst);
    }

    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.results.lock().expect("results lock").len()
    }

    /// Sorted sequence numbers per job name.
    pub fn seqs_by_job(&self) -> HashMap<String, Vec<u64>> {
        let mut by_job: HashMap<String, Vec<u64>> = HashMap::new();
        for result in self.results.lock().expect("results lock").iter() {
            by_job
                .entry(result.job_name.clone())
                .or_default()
                .push(result.seq);
        }
        for seqs in by_job.values_mut() {
            seqs.sort_unstable();
        }
        by_job
    }

    pub fn take(&self) -> Vec<JobResult<T>> {
        std::mem::take(&mut *self.results.lock().expect("results lock"))
    }
}

/// Tracks how many executions are in flight and the highest level reached.
#[derive(Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Simulate one execution holding a slot for `hold`.
    pub async fn occupy(&self, hold: Duration) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(hold).await;
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

/// `1..=n` as a vector, for dense-sequence assertions.
pub fn dense(n: u64) -> Vec<u64> {
    (1..=n).collect()
}

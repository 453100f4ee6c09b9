//! Single-consumer job queue.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::Notify;

use crate::job::{Job, JobError, JobOutcome};
use crate::scope::{ScopeError, ScopeProvider};

/// State of the consumer-loop state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerState {
    /// No drain loop is running.
    #[default]
    Idle,
    /// Exactly one drain loop is running.
    Draining,
}

impl std::fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConsumerState::Idle => write!(f, "idle"),
            ConsumerState::Draining => write!(f, "draining"),
        }
    }
}

/// Counters for a queue's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    /// Jobs waiting to run.
    pub pending: u64,
    /// Jobs ever submitted.
    pub submitted: u64,
    /// Jobs that returned `Ok`.
    pub succeeded: u64,
    /// Jobs that failed, including scope failures and panics.
    pub failed: u64,
}

impl QueueStats {
    /// Jobs that have finished, successfully or not.
    pub fn processed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// What happened to one executed job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Position in submission order, starting at 1.
    pub seq: u64,
    pub label: String,
    pub outcome: JobOutcome,
    pub elapsed: Duration,
}

impl JobReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Errors building a queue.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("job queue must be created inside a tokio runtime")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

struct PendingJob<S> {
    seq: u64,
    job: Box<dyn Job<S>>,
}

/// Everything guarded by the queue's single mutex.
struct Shared<S> {
    pending: VecDeque<PendingJob<S>>,
    consumer: ConsumerState,
    next_seq: u64,
}

#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

struct Inner<P: ScopeProvider> {
    name: String,
    shared: Mutex<Shared<P::Scope>>,
    provider: P,
    counters: Counters,
    idle: Notify,
    runtime: Handle,
}

impl<P: ScopeProvider> Inner<P> {
    fn lock(&self) -> MutexGuard<'_, Shared<P::Scope>> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create a scope, run the job in it, record the outcome. The scope is
    /// dropped before this returns.
    async fn execute(&self, pending: PendingJob<P::Scope>) -> JobReport {
        let PendingJob { seq, job } = pending;
        let label = job.label().to_string();
        let started = Instant::now();

        let outcome = match guard_panics(self.provider.create_scope()).await {
            Ok(Ok(scope)) => guard_panics(job.run(scope)).await.unwrap_or_else(Err),
            Ok(Err(e)) => Err(JobError::Scope(e)),
            Err(JobError::Panicked(message)) => Err(JobError::Scope(ScopeError::new(format!(
                "scope provider panicked: {}",
                message
            )))),
            Err(e) => Err(e),
        };
        let elapsed = started.elapsed();

        match &outcome {
            Ok(detail) => {
                self.counters.succeeded.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(
                    "[{}] job #{} ({}) completed in {:?}: {}",
                    self.name,
                    seq,
                    label,
                    elapsed,
                    detail
                );
            }
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!("[{}] job #{} ({}) failed: {}", self.name, seq, label, e);
            }
        }

        JobReport {
            seq,
            label,
            outcome,
            elapsed,
        }
    }

    /// [`Inner::execute`], with a panic anywhere in the per-job step recorded
    /// as that job's failure.
    async fn execute_guarded(&self, pending: PendingJob<P::Scope>) -> JobReport {
        let seq = pending.seq;
        let started = Instant::now();
        match guard_panics(self.execute(pending)).await {
            Ok(report) => report,
            Err(e) => {
                self.counters.failed.fetch_add(1, Ordering::Relaxed);
                tracing::error!("[{}] job #{} failed: {}", self.name, seq, e);
                JobReport {
                    seq,
                    label: UNKNOWN_LABEL.to_string(),
                    outcome: Err(e),
                    elapsed: started.elapsed(),
                }
            }
        }
    }
}

/// Label reported for a job whose own `label()` could not be read.
const UNKNOWN_LABEL: &str = "<unknown>";

/// Run a future, converting a panic into `JobError::Panicked`.
async fn guard_panics<T>(future: impl std::future::Future<Output = T>) -> Result<T, JobError> {
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            let message = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            JobError::Panicked(message)
        })
}

/// Hands the consumer role back if a drain loop stops without reaching the
/// idle transition, e.g. because its task was cancelled.
struct DrainGuard<P: ScopeProvider> {
    inner: Arc<Inner<P>>,
    finished: bool,
}

impl<P: ScopeProvider> Drop for DrainGuard<P> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let restart = {
            let mut shared = self.inner.lock();
            if shared.pending.is_empty() {
                shared.consumer = ConsumerState::Idle;
                false
            } else {
                true
            }
        };

        if restart {
            tracing::warn!("[{}] drain loop stopped early, restarting it", self.inner.name);
            self.inner.runtime.spawn(drain(Arc::clone(&self.inner)));
        } else {
            tracing::warn!("[{}] drain loop stopped early", self.inner.name);
            self.inner.idle.notify_waiters();
        }
    }
}

/// The drain loop. Only ever started by the `submit` call that moved the
/// state from idle to draining, or by a [`DrainGuard`] taking over from a
/// loop that died while still draining.
async fn drain<P: ScopeProvider>(inner: Arc<Inner<P>>) {
    tracing::debug!("[{}] drain loop started", inner.name);
    let mut guard = DrainGuard {
        inner: Arc::clone(&inner),
        finished: false,
    };
    loop {
        let next = {
            let mut shared = inner.lock();
            match shared.pending.pop_front() {
                Some(job) => job,
                None => {
                    shared.consumer = ConsumerState::Idle;
                    break;
                }
            }
        };
        inner.execute_guarded(next).await;
    }
    guard.finished = true;
    tracing::debug!("[{}] drain loop idle", inner.name);
    inner.idle.notify_waiters();
}

/// In-memory FIFO job queue with at most one consumer loop.
///
/// Any number of producers may call [`JobQueue::submit`] concurrently. Jobs run
/// one at a time in submission order, each against a fresh scope from the
/// queue's [`ScopeProvider`]. A failing job is logged and counted; the loop moves
/// on to the next one.
pub struct JobQueue<P: ScopeProvider> {
    inner: Arc<Inner<P>>,
}

impl<P: ScopeProvider> Clone for JobQueue<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: ScopeProvider> JobQueue<P> {
    /// Create a queue whose drain loop runs on the current tokio runtime.
    pub fn new(name: impl Into<String>, provider: P) -> Result<Self, QueueError> {
        Ok(Self::with_runtime(name, provider, Handle::try_current()?))
    }

    /// Create a queue whose drain loop runs on `runtime`.
    pub fn with_runtime(name: impl Into<String>, provider: P, runtime: Handle) -> Self {
        let name = name.into();
        tracing::info!("Creating job queue: {}", name);
        Self {
            inner: Arc::new(Inner {
                name,
                shared: Mutex::new(Shared {
                    pending: VecDeque::new(),
                    consumer: ConsumerState::Idle,
                    next_seq: 1,
                }),
                provider,
                counters: Counters::default(),
                idle: Notify::new(),
                runtime,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Append a job and return its sequence number. Never waits.
    ///
    /// If no drain loop is active, this call starts one.
    pub fn submit<J: Job<P::Scope>>(&self, job: J) -> u64 {
        self.submit_boxed(Box::new(job))
    }

    /// Same as [`JobQueue::submit`] for an already boxed job.
    pub fn submit_boxed(&self, job: Box<dyn Job<P::Scope>>) -> u64 {
        let label = job.label().to_string();
        let (seq, start_loop) = {
            let mut shared = self.inner.lock();
            let seq = shared.next_seq;
            shared.next_seq += 1;
            shared.pending.push_back(PendingJob { seq, job });

            self.inner.counters.submitted.fetch_add(1, Ordering::Relaxed);

            let start_loop = shared.consumer == ConsumerState::Idle;
            if start_loop {
                shared.consumer = ConsumerState::Draining;
            }
            (seq, start_loop)
        };
        tracing::debug!("[{}] job #{} ({}) submitted", self.inner.name, seq, label);

        if start_loop {
            self.inner.runtime.spawn(drain(Arc::clone(&self.inner)));
        }
        seq
    }

    /// Run the job at the front of the queue, if any, on the caller's task.
    ///
    /// Returns `None` without side effects when nothing is pending.
    pub async fn process_one(&self) -> Option<JobReport> {
        let next = self.inner.lock().pending.pop_front()?;
        Some(self.inner.execute_guarded(next).await)
    }

    pub fn state(&self) -> ConsumerState {
        self.inner.lock().consumer
    }

    pub fn pending_len(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// No drain loop is running and nothing is pending.
    pub fn is_idle(&self) -> bool {
        let shared = self.inner.lock();
        shared.consumer == ConsumerState::Idle && shared.pending.is_empty()
    }

    pub fn stats(&self) -> QueueStats {
        let pending = self.pending_len() as u64;
        let counters = &self.inner.counters;
        QueueStats {
            pending,
            submitted: counters.submitted.load(Ordering::Relaxed),
            succeeded: counters.succeeded.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Wait until the drain loop has gone idle with nothing pending.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

#![allow(dead_code)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use job_queue::{FnJob, FnScopeProvider, Job, JobError, ScopeError};

/// Scope handed to test jobs: an identity plus private mutable state.
pub struct TestScope {
    pub id: u64,
    pub writes: Vec<String>,
}

impl TestScope {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            writes: Vec::new(),
        }
    }
}

/// Provider that numbers every scope it creates.
pub fn counting_provider()
-> FnScopeProvider<TestScope, impl Fn() -> Result<TestScope, ScopeError> + Send + Sync + 'static> {
    let next = AtomicU64::new(0);
    FnScopeProvider::new(move || Ok(TestScope::new(next.fetch_add(1, Ordering::SeqCst))))
}

/// Execution log shared between a test and its jobs.
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(String, u64)>>>,
}

impl Journal {
    pub fn push(&self, name: &str, scope_id: u64) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((name.to_string(), scope_id));
    }

    pub fn entries(&self) -> Vec<(String, u64)> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries().into_iter().map(|(name, _)| name).collect()
    }
}

/// A job that records its name and scope id, then succeeds.
pub fn record(name: &str, journal: &Journal) -> impl Job<TestScope> {
    let journal = journal.clone();
    let label = name.to_string();
    FnJob::new(name, move |scope: TestScope| async move {
        journal.push(&label, scope.id);
        Ok::<_, JobError>(format!("{label} recorded"))
    })
}

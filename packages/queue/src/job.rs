//! Job trait and closure adapter.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::scope::ScopeError;

/// Result of running a job. `Ok` carries a human-readable detail.
pub type JobOutcome = Result<String, JobError>;

/// Future type for async job bodies.
pub type JobFuture = Pin<Box<dyn Future<Output = JobOutcome> + Send>>;

/// Why a job did not complete.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobError {
    #[error("scope creation failed: {0}")]
    Scope(#[from] ScopeError),

    #[error("{0}")]
    Failed(String),

    #[error("job panicked: {0}")]
    Panicked(String),
}

impl JobError {
    /// Explicit failure signal from a job body.
    pub fn failed(message: impl Into<String>) -> Self {
        JobError::Failed(message.into())
    }
}

/// A deferred unit of work executed against a scope of type `S`.
///
/// Jobs are consumed when they run, so each one executes at most once.
pub trait Job<S>: Send + 'static {
    /// Short name used in log lines.
    fn label(&self) -> &str;

    /// Execute the job with a scope it owns for the duration of the run.
    fn run(self: Box<Self>, scope: S) -> JobFuture;
}

/// A job built from an async closure.
pub struct FnJob<S, F, Fut> {
    label: String,
    body: F,
    _scope: PhantomData<fn(S) -> Fut>,
}

impl<S, F, Fut> FnJob<S, F, Fut>
where
    F: FnOnce(S) -> Fut + Send + 'static,
    Fut: Future<Output = JobOutcome> + Send + 'static,
{
    /// Create a new closure-based job.
    pub fn new(label: impl Into<String>, body: F) -> Self {
        Self {
            label: label.into(),
            body,
            _scope: PhantomData,
        }
    }
}

impl<S, F, Fut> Job<S> for FnJob<S, F, Fut>
where
    S: Send + 'static,
    F: FnOnce(S) -> Fut + Send + 'static,
    Fut: Future<Output = JobOutcome> + Send + 'static,
{
    fn label(&self) -> &str {
        &self.label
    }

    fn run(self: Box<Self>, scope: S) -> JobFuture {
        let this = *self;
        Box::pin((this.body)(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fn_job_passes_scope_to_body() {
        let job = FnJob::new("double", |n: u32| async move { Ok::<_, JobError>((n * 2).to_string()) });
        assert_eq!(job.label(), "double");

        let outcome = Box::new(job).run(21).await;
        assert_eq!(outcome, Ok("42".to_string()));
    }

    #[test]
    fn failure_messages_are_readable() {
        assert_eq!(JobError::failed("duplicate task").to_string(), "duplicate task");
        assert_eq!(
            JobError::Scope(ScopeError::new("pool exhausted")).to_string(),
            "scope creation failed: pool exhausted"
        );
    }
}

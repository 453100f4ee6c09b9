//! Background job queue for deferred writes.
//!
//! Producers hand jobs to a [`JobQueue`] and return immediately. A single
//! drain loop, started lazily by whichever `submit` finds the queue idle,
//! executes the jobs one at a time in submission order.
//!
//! # Architecture
//!
//! - [`Job`] - A deferred unit of work, consumed when it runs
//! - [`ScopeProvider`] - Builds the resource bundle each job owns while it runs
//! - [`JobQueue`] - FIFO plus the idle/draining state machine
//!
//! # Usage
//!
//! ```ignore
//! use job_queue::{FnJob, FnScopeProvider, JobQueue};
//!
//! let queue = JobQueue::new("tasks", FnScopeProvider::new(|| Ok(open_session())))?;
//! queue.submit(FnJob::new("create-task", |session| async move {
//!     session.insert(task).await.map_err(|e| JobError::failed(e.to_string()))?;
//!     Ok("task created".to_string())
//! }));
//! ```

mod job;
mod queue;
mod scope;

pub use job::{FnJob, Job, JobError, JobFuture, JobOutcome};
pub use queue::{ConsumerState, JobQueue, JobReport, QueueError, QueueStats};
pub use scope::{FnScopeProvider, ScopeError, ScopeProvider};

//! Per-job resource scope for task writes.

use db::Database;
use db::repositories::{TaskRepository, UserRepository};
use job_queue::{ScopeError, ScopeProvider};

use crate::realtime::Notifier;

/// The handles a queued task job runs against.
pub struct TaskScope {
    pub tasks: TaskRepository,
    pub users: UserRepository,
    pub notifier: Notifier,
}

/// Builds a fresh [`TaskScope`] for every job.
#[derive(Clone)]
pub struct DbScopeProvider {
    db: Database,
    notifier: Notifier,
}

impl DbScopeProvider {
    pub fn new(db: Database, notifier: Notifier) -> Self {
        Self { db, notifier }
    }
}

impl ScopeProvider for DbScopeProvider {
    type Scope = TaskScope;

    /// Checks the connection, then hands out new repository handles.
    async fn create_scope(&self) -> Result<TaskScope, ScopeError> {
        self.db
            .health()
            .await
            .map_err(|e| ScopeError::new(format!("database unavailable: {}", e)))?;

        Ok(TaskScope {
            tasks: TaskRepository::new(self.db.clone()),
            users: UserRepository::new(self.db.clone()),
            notifier: self.notifier.clone(),
        })
    }
}

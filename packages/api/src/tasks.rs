//! Task service: queued creation plus inline reads, updates and deletes.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use db::repositories::TaskRepository;
use job_queue::JobQueue;
use serde::{Deserialize, Serialize};
use task_core::{CompletionCache, Task, TaskEvent, TaskId, UserId, ValidationError, factory, validate_task};

use crate::error::ServiceError;
use crate::jobs::PersistTaskJob;
use crate::realtime::Notifier;
use crate::scope::DbScopeProvider;

/// The queue task writes go through.
pub type TaskQueue = JobQueue<DbScopeProvider>;

/// What a producer tells its caller. Never reflects the eventual write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Submission {
    /// Queued for processing; `position` is the job's sequence number.
    Accepted { position: u64 },
    /// Failed synchronous validation. Nothing was queued.
    Rejected { reason: ValidationError },
}

impl Submission {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted { .. })
    }
}

#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    queue: TaskQueue,
    notifier: Notifier,
    completion: Arc<CompletionCache>,
}

impl TaskService {
    pub fn new(tasks: TaskRepository, queue: TaskQueue, notifier: Notifier) -> Self {
        Self {
            tasks,
            queue,
            notifier,
            completion: Arc::new(CompletionCache::new()),
        }
    }

    /// Queue a task due in one day.
    pub fn add_high_priority_task(&self, description: impl Into<String>, owner: UserId) -> Submission {
        self.submit(factory::high_priority(description, owner), "high-priority")
    }

    /// Queue a task due in seven days.
    pub fn add_low_priority_task(&self, description: impl Into<String>, owner: UserId) -> Submission {
        self.submit(factory::low_priority(description, owner), "low-priority")
    }

    pub fn add_custom_task(
        &self,
        description: impl Into<String>,
        due_date: DateTime<Utc>,
        additional_data: impl Into<String>,
        owner: UserId,
    ) -> Submission {
        self.submit(
            factory::custom(description, due_date, additional_data, owner),
            "custom",
        )
    }

    fn submit(&self, task: Task, kind: &str) -> Submission {
        if let Err(reason) = validate_task(&task, Utc::now()) {
            tracing::warn!("Rejected {} task: {}", kind, reason);
            return Submission::Rejected { reason };
        }

        let position = self
            .queue
            .submit(PersistTaskJob::new(task, format!("{}-task", kind)));
        Submission::Accepted { position }
    }

    pub async fn list_tasks(&self) -> Result<Vec<Task>, ServiceError> {
        Ok(self.tasks.list().await?)
    }

    pub async fn list_tasks_for(&self, owner: UserId) -> Result<Vec<Task>, ServiceError> {
        Ok(self.tasks.list_by_owner(owner).await?)
    }

    pub async fn get_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        Ok(self.tasks.get(id).await?)
    }

    /// Validate and replace a task, then publish `TaskUpdated`.
    pub async fn update_task(&self, task: Task) -> Result<Task, ServiceError> {
        validate_task(&task, Utc::now())?;

        let updated = self.tasks.update(&task).await?;
        tracing::info!("Task {} updated", updated.id);
        self.notifier.publish(TaskEvent::updated(updated.clone()));
        Ok(updated)
    }

    /// Delete a task, then publish `TaskDeleted`.
    pub async fn delete_task(&self, id: TaskId) -> Result<Task, ServiceError> {
        let existing = self.tasks.get(id).await?;
        let removed = self.tasks.delete(existing.id).await?;
        tracing::info!("Task {} deleted", removed.id);
        self.notifier.publish(TaskEvent::deleted(&removed));
        Ok(removed)
    }

    /// Percentage of stored tasks that are completed.
    pub async fn completion_percentage(&self) -> Result<f64, ServiceError> {
        let tasks = self.tasks.list().await?;
        if tasks.is_empty() {
            return Err(ServiceError::NoTasks);
        }
        Ok(self.completion.completion_rate(&tasks))
    }
}

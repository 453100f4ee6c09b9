//! Change notifications broadcast to real-time subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Task, TaskId, UserId};

/// Events emitted whenever a task changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    /// A task was persisted.
    TaskCreated { task: Task, timestamp: DateTime<Utc> },
    /// A task's fields were replaced.
    TaskUpdated { task: Task, timestamp: DateTime<Utc> },
    /// A task was removed.
    TaskDeleted {
        task_id: TaskId,
        owner_id: UserId,
        description: String,
        timestamp: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn created(task: Task) -> Self {
        TaskEvent::TaskCreated {
            task,
            timestamp: Utc::now(),
        }
    }

    pub fn updated(task: Task) -> Self {
        TaskEvent::TaskUpdated {
            task,
            timestamp: Utc::now(),
        }
    }

    pub fn deleted(task: &Task) -> Self {
        TaskEvent::TaskDeleted {
            task_id: task.id,
            owner_id: task.owner_id,
            description: task.description.clone(),
            timestamp: Utc::now(),
        }
    }

    /// The event name, matching the serialized `event` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            TaskEvent::TaskCreated { .. } => "task_created",
            TaskEvent::TaskUpdated { .. } => "task_updated",
            TaskEvent::TaskDeleted { .. } => "task_deleted",
        }
    }

    /// Get the timestamp of the event.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            TaskEvent::TaskCreated { timestamp, .. }
            | TaskEvent::TaskUpdated { timestamp, .. }
            | TaskEvent::TaskDeleted { timestamp, .. } => *timestamp,
        }
    }

    /// Get the ID of the task this event is about.
    pub fn task_id(&self) -> TaskId {
        match self {
            TaskEvent::TaskCreated { task, .. } | TaskEvent::TaskUpdated { task, .. } => task.id,
            TaskEvent::TaskDeleted { task_id, .. } => *task_id,
        }
    }

    /// Get a short description of this event for logging.
    pub fn description(&self) -> String {
        match self {
            TaskEvent::TaskCreated { task, .. } => format!("New task created: {}", task.description),
            TaskEvent::TaskUpdated { task, .. } => format!("Task updated: {}", task.description),
            TaskEvent::TaskDeleted { description, .. } => format!("Task deleted: {}", description),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn serializes_with_event_tag() -> Result<(), serde_json::Error> {
        let task = Task::new("ship it", Utc::now() + Duration::days(1), UserId::new());
        let value = serde_json::to_value(TaskEvent::created(task.clone()))?;

        assert_eq!(value["event"], "task_created");
        assert_eq!(value["task"]["description"], "ship it");
        Ok(())
    }

    #[test]
    fn deleted_event_keeps_identity() {
        let task = Task::new("old", Utc::now() + Duration::days(1), UserId::new());
        let event = TaskEvent::deleted(&task);

        assert_eq!(event.task_id(), task.id);
        assert_eq!(event.description(), "Task deleted: old");
    }
}

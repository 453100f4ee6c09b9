//! Task domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::UserId;

/// Unique identifier for a task, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Ulid);

impl TaskId {
    /// Create a new unique task ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse a task ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Progress of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" | "inprogress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

/// A task owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier for this task.
    pub id: TaskId,
    /// What needs to be done.
    pub description: String,
    /// When the task is due.
    pub due_date: DateTime<Utc>,
    /// Current progress.
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-form extra information (priority label for factory-built tasks).
    #[serde(default)]
    pub additional_data: String,
    /// The user this task belongs to.
    pub owner_id: UserId,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a new pending task.
    pub fn new(description: impl Into<String>, due_date: DateTime<Utc>, owner_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            description: description.into(),
            due_date,
            status: TaskStatus::Pending,
            additional_data: String::new(),
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set the additional data for this task.
    pub fn with_additional_data(mut self, data: impl Into<String>) -> Self {
        self.additional_data = data.into();
        self
    }

    /// Set the status for this task.
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("Completed".parse(), Ok(TaskStatus::Completed));
        assert_eq!("PENDING".parse(), Ok(TaskStatus::Pending));
        assert_eq!("In Progress".parse(), Ok(TaskStatus::InProgress));
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn task_id_round_trips_through_display() -> Result<(), ulid::DecodeError> {
        let id = TaskId::new();
        assert_eq!(TaskId::parse(&id.to_string())?, id);
        Ok(())
    }
}

//! Constructors for the task shapes the service layer produces.

use chrono::{DateTime, Duration, Utc};

use crate::{Task, UserId};

pub const HIGH_PRIORITY: &str = "High Priority";
pub const LOW_PRIORITY: &str = "Low Priority";

/// A pending task due in one day.
pub fn high_priority(description: impl Into<String>, owner: UserId) -> Task {
    Task::new(description, Utc::now() + Duration::days(1), owner).with_additional_data(HIGH_PRIORITY)
}

/// A pending task due in seven days.
pub fn low_priority(description: impl Into<String>, owner: UserId) -> Task {
    Task::new(description, Utc::now() + Duration::days(7), owner).with_additional_data(LOW_PRIORITY)
}

/// A pending task with a caller-chosen due date and additional data.
pub fn custom(
    description: impl Into<String>,
    due_date: DateTime<Utc>,
    additional_data: impl Into<String>,
    owner: UserId,
) -> Task {
    Task::new(description, due_date, owner).with_additional_data(additional_data)
}

//! # Task Domain Model
//!
//! Core task record and lifecycle status enum shared by every component in the
//! crate. The registry stores these records, the gateway serializes them into
//! dispatch responses, and the schedule consumer mutates them through the
//! transition function.
//!
//! ## Status Model
//!
//! `status` is the single authority on lifecycle state; the `is_running` flag
//! is derived from it (`status == Running`) and is carried on the record only
//! because external readers filter on it. Code must never set `is_running`
//! independently of `status`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Lifecycle states for a task.
///
/// Scheduling events only move tasks between `Created`, `Scheduled`, and
/// `Running`. The `Completed`, `Failed`, and `Cancelled` states are reserved
/// for lifecycle extensions; no operation in this crate produces them, and
/// tasks in those states ignore scheduling events entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Created,
    Scheduled,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    /// Check if this status is reserved for lifecycle extensions.
    ///
    /// Reserved statuses never participate in scheduling transitions.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }

    /// Check if this status participates in scheduling transitions
    pub fn is_schedulable(&self) -> bool {
        !self.is_reserved()
    }

    /// Whether the derived running flag is set for this status
    pub fn is_running(&self) -> bool {
        matches!(self, TaskStatus::Running)
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Created
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Created => "Created",
            TaskStatus::Scheduled => "Scheduled",
            TaskStatus::Running => "Running",
            TaskStatus::Completed => "Completed",
            TaskStatus::Failed => "Failed",
            TaskStatus::Cancelled => "Cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Created" => Ok(TaskStatus::Created),
            "Scheduled" => Ok(TaskStatus::Scheduled),
            "Running" => Ok(TaskStatus::Running),
            "Completed" => Ok(TaskStatus::Completed),
            "Failed" => Ok(TaskStatus::Failed),
            "Cancelled" => Ok(TaskStatus::Cancelled),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

/// A task record as stored in the registry.
///
/// Records are plain data: cloning one hands out an independent snapshot, so
/// readers never observe a half-applied mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier assigned at creation
    pub id: Uuid,
    /// Human-readable task name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Creation timestamp, stamped by the registry
    pub created_at: DateTime<Utc>,
    /// When the task first entered the running state, if it ever has.
    /// Stamped once on the first transition into `Running` and never cleared.
    pub scheduled_at: Option<DateTime<Utc>>,
    /// Derived flag, always equal to `status == TaskStatus::Running`
    pub is_running: bool,
    /// Authoritative lifecycle state
    pub status: TaskStatus,
}

impl Task {
    /// Create a new task in its initial state.
    ///
    /// Assigns a fresh random identifier and stamps `created_at` with the
    /// current time. The task starts as `Created`, not running, with no
    /// scheduling timestamp.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            created_at: Utc::now(),
            scheduled_at: None,
            is_running: false,
            status: TaskStatus::Created,
        }
    }
}

//! # RPC Wire Contracts
//!
//! Request and response shapes for the synchronous task operations, as carried
//! between this core and RPC-facing adapters. Everything here is strings and
//! bools so the contract survives any serializer an adapter picks.
//!
//! ## Timestamp Format
//!
//! Timestamps travel as ISO-8601 UTC with exactly seven fractional digits,
//! `2024-01-02T03:04:05.1234567Z`. Seven digits is 100-nanosecond resolution,
//! the precision existing peers emit and expect; [`format_timestamp`] always
//! produces it and [`parse_timestamp`] accepts any RFC 3339 input. An absent
//! `scheduled_at` is the empty string, never `null`.

use crate::model::{Task, TaskStatus};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors converting wire records back into domain tasks.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("Invalid task ID format: {value}")]
    InvalidTaskId { value: String },

    #[error("Invalid timestamp {value}: {message}")]
    InvalidTimestamp { value: String, message: String },

    #[error("Invalid task status: {value}")]
    InvalidStatus { value: String },
}

/// Format a timestamp with exactly seven fractional digits.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    // 100ns ticks; the modulo drops a leap-second overflow chrono may carry
    let ticks = ts.nanosecond() % 1_000_000_000 / 100;
    format!("{}.{:07}Z", ts.format("%Y-%m-%dT%H:%M:%S"), ticks)
}

/// Format an optional timestamp; absence is the empty string.
pub fn format_optional_timestamp(ts: Option<DateTime<Utc>>) -> String {
    match ts {
        Some(ts) => format_timestamp(ts),
        None => String::new(),
    }
}

/// Parse an RFC 3339 timestamp into UTC.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, WireError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| WireError::InvalidTimestamp {
            value: value.to_string(),
            message: e.to_string(),
        })
}

/// Parse an optional timestamp; the empty string means absent.
pub fn parse_optional_timestamp(value: &str) -> Result<Option<DateTime<Utc>>, WireError> {
    if value.is_empty() {
        Ok(None)
    } else {
        parse_timestamp(value).map(Some)
    }
}

/// A task as carried on the synchronous wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: String,
    /// Empty string when the task has never run
    pub scheduled_at: String,
    pub is_running: bool,
    pub status: String,
}

impl From<&Task> for TaskRecord {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.to_string(),
            name: task.name.clone(),
            description: task.description.clone(),
            created_at: format_timestamp(task.created_at),
            scheduled_at: format_optional_timestamp(task.scheduled_at),
            is_running: task.is_running,
            status: task.status.to_string(),
        }
    }
}

impl TryFrom<TaskRecord> for Task {
    type Error = WireError;

    /// Convert a wire record back into a domain task.
    ///
    /// The running flag is derived from the parsed status, so a record whose
    /// peer sent an inconsistent flag normalizes on the way in.
    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&record.id).map_err(|_| WireError::InvalidTaskId {
            value: record.id.clone(),
        })?;
        let status: TaskStatus =
            record
                .status
                .parse()
                .map_err(|_| WireError::InvalidStatus {
                    value: record.status.clone(),
                })?;
        Ok(Task {
            id,
            name: record.name,
            description: record.description,
            created_at: parse_timestamp(&record.created_at)?,
            scheduled_at: parse_optional_timestamp(&record.scheduled_at)?,
            is_running: status.is_running(),
            status,
        })
    }
}

/// Create a task with the given fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateTaskRequest {
    pub name: String,
    pub description: String,
}

/// Replace a task's name and description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTaskRequest {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Delete a task by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DeleteTaskRequest {
    pub id: String,
}

/// Outcome of a delete or update operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOperationReply {
    pub success: bool,
    pub message: String,
}

impl TaskOperationReply {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            success: false,
            message: "Task not found".to_string(),
        }
    }
}

/// Result of the list operations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListReply {
    pub tasks: Vec<TaskRecord>,
}

impl TaskListReply {
    pub fn new(tasks: &[Task]) -> Self {
        Self {
            tasks: tasks.iter().map(TaskRecord::from).collect(),
        }
    }
}

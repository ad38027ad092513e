//! # Wire Message Types
//!
//! JSON payloads carried on the two asynchronous channels. Field names are
//! PascalCase on the wire to stay compatible with existing peers on the same
//! broker; keep the serde renames in place.

use crate::state_machine::ScheduleEvent;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A control event instructing the schedule consumer to transition a task.
///
/// Published to the control exchange with the action tag as routing key. The
/// `schedule_time` field is carried for peers that record it; this crate's
/// consumer does not read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ControlMessage {
    pub task_id: Uuid,
    /// Raw action tag. Kept as a string here so consumers can distinguish an
    /// unknown action from a malformed payload; parse with
    /// [`ControlMessage::event`].
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_time: Option<DateTime<Utc>>,
    pub timestamp: DateTime<Utc>,
}

impl ControlMessage {
    /// Build a schedule command for a task
    pub fn schedule(task_id: Uuid, schedule_time: Option<DateTime<Utc>>) -> Self {
        Self {
            task_id,
            action: ScheduleEvent::Schedule.as_str().to_string(),
            schedule_time,
            timestamp: Utc::now(),
        }
    }

    /// Build an unschedule command for a task
    pub fn unschedule(task_id: Uuid) -> Self {
        Self {
            task_id,
            action: ScheduleEvent::Unschedule.as_str().to_string(),
            schedule_time: None,
            timestamp: Utc::now(),
        }
    }

    /// Parse the action tag into the typed event set.
    ///
    /// `None` means the action is outside the closed command set.
    pub fn event(&self) -> Option<ScheduleEvent> {
        ScheduleEvent::parse(&self.action)
    }
}

/// A notification announcing that a task changed.
///
/// Published to the fanout notification exchange; any number of subscribers
/// may observe it, including zero. The `description` field is only present on
/// update notifications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskNotification {
    pub task_id: Uuid,
    pub task_name: String,
    /// What happened: `"updated"`, `"scheduled"`, or `"unscheduled"`
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl TaskNotification {
    /// Build a notification with the current time as its timestamp
    pub fn new(task_id: Uuid, task_name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            task_id,
            task_name: task_name.into(),
            action: action.into(),
            description: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the task description (update notifications carry it)
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

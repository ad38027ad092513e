//! # Command Gateway
//!
//! The single entry point for externally-originated commands. An ingress
//! adapter (HTTP handler, RPC service, CLI) builds a [`CommandEnvelope`] and
//! hands it to [`Gateway::dispatch`]; everything else in the crate works with
//! the typed [`TaskCommand`] that parsing produces.
//!
//! ## Validation Edge
//!
//! Action tags and identifier strings are validated here, exactly once.
//! Invalid input never raises an error through the call stack: every failure
//! mode folds into a structured [`DispatchResponse`] with `success == false`,
//! so an ingress adapter can serialize the result without its own error
//! mapping.
//!
//! ## Synchronous vs Fire-and-Forget
//!
//! CRUD commands complete against the registry before the response is built.
//! `schedule` / `unschedule` only publish a control command: their success
//! response means "command accepted", not "transition applied".

use crate::messaging::{ControlMessage, MessageChannel};
use crate::model::Task;
use crate::service::TaskService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

/// External command envelope, as deserialized from an ingress request.
///
/// Identifier fields stay as raw strings here; [`TaskCommand::from_envelope`]
/// is the one place they are parsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CommandEnvelope {
    pub action: Option<String>,
    pub task_id: Option<String>,
    pub create_payload: Option<TaskPayload>,
    pub update_payload: Option<TaskPayload>,
    pub schedule_payload: Option<SchedulePayload>,
}

/// Name and description carried by create and update commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskPayload {
    pub name: String,
    pub description: String,
}

/// Payload of a schedule command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulePayload {
    pub task_id: Option<String>,
    /// Requested start time, forwarded on the control channel for peers that
    /// record it
    pub schedule_time: Option<DateTime<Utc>>,
}

/// A fully validated command.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCommand {
    Create {
        name: String,
        description: String,
    },
    Update {
        task_id: Uuid,
        name: String,
        description: String,
    },
    Delete {
        task_id: Uuid,
    },
    GetAll,
    GetRunning,
    Schedule {
        task_id: Uuid,
        schedule_time: Option<DateTime<Utc>>,
    },
    Unschedule {
        task_id: Uuid,
    },
}

/// Why an envelope failed to parse into a [`TaskCommand`].
///
/// Display strings double as client-facing response messages; variant fields
/// carry the offending input for logs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CommandError {
    #[error("Unknown action")]
    UnknownAction { action: String },

    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid task ID format")]
    InvalidTaskId { value: String },
}

fn parse_task_id(value: Option<&str>) -> Result<Uuid, CommandError> {
    let raw = value.ok_or(CommandError::MissingField { field: "taskId" })?;
    Uuid::parse_str(raw.trim()).map_err(|_| CommandError::InvalidTaskId {
        value: raw.to_string(),
    })
}

impl TaskCommand {
    /// Validate an envelope into a typed command.
    ///
    /// Action tags are matched case-insensitively. Each action requires its
    /// own payload fields; anything missing or malformed produces a
    /// [`CommandError`] naming the first problem found.
    pub fn from_envelope(envelope: CommandEnvelope) -> Result<Self, CommandError> {
        let action = envelope.action.clone().unwrap_or_default();

        match action.to_lowercase().as_str() {
            "create" => {
                let payload = envelope.create_payload.ok_or(CommandError::MissingField {
                    field: "createPayload",
                })?;
                Ok(TaskCommand::Create {
                    name: payload.name,
                    description: payload.description,
                })
            }
            "update" => {
                let task_id = parse_task_id(envelope.task_id.as_deref())?;
                let payload = envelope.update_payload.ok_or(CommandError::MissingField {
                    field: "updatePayload",
                })?;
                Ok(TaskCommand::Update {
                    task_id,
                    name: payload.name,
                    description: payload.description,
                })
            }
            "delete" => Ok(TaskCommand::Delete {
                task_id: parse_task_id(envelope.task_id.as_deref())?,
            }),
            "getall" => Ok(TaskCommand::GetAll),
            "getrunning" => Ok(TaskCommand::GetRunning),
            "schedule" => {
                let payload = envelope.schedule_payload.ok_or(CommandError::MissingField {
                    field: "schedulePayload",
                })?;
                Ok(TaskCommand::Schedule {
                    task_id: parse_task_id(payload.task_id.as_deref())?,
                    schedule_time: payload.schedule_time,
                })
            }
            "unschedule" => Ok(TaskCommand::Unschedule {
                task_id: parse_task_id(envelope.task_id.as_deref())?,
            }),
            _ => Err(CommandError::UnknownAction { action }),
        }
    }
}

/// Uniform result of a dispatched command.
///
/// Serializes with camelCase fields; absent members are omitted entirely
/// rather than sent as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<Task>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Task>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<Uuid>,
}

impl DispatchResponse {
    /// Success carrying a single task
    pub fn ok_task(task: Task) -> Self {
        Self {
            success: true,
            message: None,
            task: Some(task),
            tasks: None,
            task_id: None,
        }
    }

    /// Success carrying a task list
    pub fn ok_tasks(tasks: Vec<Task>) -> Self {
        Self {
            success: true,
            message: None,
            task: None,
            tasks: Some(tasks),
            task_id: None,
        }
    }

    /// Success carrying only a message
    pub fn ok_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            task: None,
            tasks: None,
            task_id: None,
        }
    }

    /// Success carrying a message and the affected task id
    pub fn accepted(message: impl Into<String>, task_id: Uuid) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            task: None,
            tasks: None,
            task_id: Some(task_id),
        }
    }

    /// Structured failure
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            task: None,
            tasks: None,
            task_id: None,
        }
    }

    /// Catch-all failure shape for ingress adapters.
    ///
    /// Adapters that hit an unexpected fault outside [`Gateway::dispatch`]
    /// respond with this instead of leaking internals to the client.
    pub fn internal_error() -> Self {
        Self::failure("Internal server error")
    }
}

/// Dispatches validated commands to the synchronous handler or the control
/// channel.
pub struct Gateway {
    service: Arc<TaskService>,
    channel: Arc<dyn MessageChannel>,
}

impl Gateway {
    pub fn new(service: Arc<TaskService>, channel: Arc<dyn MessageChannel>) -> Self {
        Self { service, channel }
    }

    /// Validate and execute an external envelope.
    ///
    /// Never returns an error: validation failures come back as structured
    /// failure responses.
    pub async fn dispatch(&self, envelope: CommandEnvelope) -> DispatchResponse {
        match TaskCommand::from_envelope(envelope) {
            Ok(command) => self.execute(command).await,
            Err(e) => {
                warn!(reason = ?e, "Rejected command envelope");
                DispatchResponse::failure(e.to_string())
            }
        }
    }

    /// Execute an already validated command.
    pub async fn execute(&self, command: TaskCommand) -> DispatchResponse {
        match command {
            TaskCommand::Create { name, description } => {
                let task = self.service.create_task(name, description).await;
                DispatchResponse::ok_task(task)
            }
            TaskCommand::Update {
                task_id,
                name,
                description,
            } => {
                if self.service.update_task(task_id, name, description).await {
                    DispatchResponse::accepted("Task updated successfully", task_id)
                } else {
                    DispatchResponse::failure("Task not found")
                }
            }
            TaskCommand::Delete { task_id } => {
                if self.service.delete_task(task_id).await {
                    DispatchResponse::ok_message("Task deleted successfully")
                } else {
                    DispatchResponse::failure("Task not found")
                }
            }
            TaskCommand::GetAll => DispatchResponse::ok_tasks(self.service.get_all_tasks().await),
            TaskCommand::GetRunning => {
                DispatchResponse::ok_tasks(self.service.get_running_tasks().await)
            }
            TaskCommand::Schedule {
                task_id,
                schedule_time,
            } => {
                let message = ControlMessage::schedule(task_id, schedule_time);
                match self.channel.publish_control(&message).await {
                    Ok(()) => {
                        info!(task_id = %task_id, "Schedule command accepted");
                        DispatchResponse::accepted("Task scheduled successfully", task_id)
                    }
                    Err(e) => {
                        error!(task_id = %task_id, error = %e, "Failed to publish schedule command");
                        DispatchResponse::failure("Failed to schedule task")
                    }
                }
            }
            TaskCommand::Unschedule { task_id } => {
                let message = ControlMessage::unschedule(task_id);
                match self.channel.publish_control(&message).await {
                    Ok(()) => {
                        info!(task_id = %task_id, "Unschedule command accepted");
                        DispatchResponse::accepted("Task unscheduled successfully", task_id)
                    }
                    Err(e) => {
                        error!(task_id = %task_id, error = %e, "Failed to publish unschedule command");
                        DispatchResponse::failure("Failed to unschedule task")
                    }
                }
            }
        }
    }
}

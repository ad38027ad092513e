//! # Synchronous Task Operations
//!
//! CRUD-side handler over the registry. These operations complete against the
//! in-memory store before returning, so the response a caller gets always
//! reflects a state the registry actually held. The only asynchronous side
//! effect here is the update notification, published after the replacement
//! has landed.
//!
//! Scheduling is deliberately absent from this handler: schedule and
//! unschedule commands travel through the control channel and are applied by
//! the schedule consumer.

use crate::model::Task;
use crate::notifications::{NotificationKind, NotificationPublisher};
use crate::registry::TaskRegistry;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Handler for the synchronous CRUD operations.
pub struct TaskService {
    registry: Arc<TaskRegistry>,
    notifier: NotificationPublisher,
}

impl TaskService {
    pub fn new(registry: Arc<TaskRegistry>, notifier: NotificationPublisher) -> Self {
        Self { registry, notifier }
    }

    /// Create a task and return the stored record.
    ///
    /// Creation is silent on the notification channel.
    pub async fn create_task(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Task {
        let task = self.registry.create(name, description);
        info!(task_id = %task.id, task_name = %task.name, "Task created");
        task
    }

    /// Replace a task's name and description.
    ///
    /// Lifecycle fields are preserved as-is. On success an `updated`
    /// notification goes out; absence of the id reports `false` and publishes
    /// nothing.
    pub async fn update_task(
        &self,
        id: Uuid,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> bool {
        let Some(mut task) = self.registry.get(id) else {
            warn!(task_id = %id, "Update requested for unknown task");
            return false;
        };
        task.name = name.into();
        task.description = description.into();

        if !self.registry.update(task.clone()) {
            // deleted between the read and the write
            warn!(task_id = %id, "Task vanished during update");
            return false;
        }

        info!(task_id = %task.id, task_name = %task.name, "Task updated");
        self.notifier.notify(NotificationKind::Updated, &task).await;
        true
    }

    /// Remove a task. Returns whether it existed.
    ///
    /// Deletion is silent on the notification channel.
    pub async fn delete_task(&self, id: Uuid) -> bool {
        let deleted = self.registry.delete(id);
        if deleted {
            info!(task_id = %id, "Task deleted");
        } else {
            warn!(task_id = %id, "Delete requested for unknown task");
        }
        deleted
    }

    /// Snapshot of a single task
    pub async fn get_task(&self, id: Uuid) -> Option<Task> {
        self.registry.get(id)
    }

    /// Snapshot of every task
    pub async fn get_all_tasks(&self) -> Vec<Task> {
        self.registry.list_all()
    }

    /// Snapshot of tasks currently running
    pub async fn get_running_tasks(&self) -> Vec<Task> {
        self.registry.list_running()
    }
}

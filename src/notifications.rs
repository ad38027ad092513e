//! # Notification Publisher
//!
//! Fanout announcements of task changes. The registry itself never publishes;
//! the synchronous handler and the schedule consumer call this publisher after
//! a mutation lands, so the registry stays free of I/O and the notification
//! always describes a state that was actually stored.
//!
//! Notification delivery is not load-bearing. A publish failure is logged and
//! swallowed: the mutation already happened and must not be rolled back or
//! retried because an observer missed its announcement.

use crate::messaging::{MessageChannel, TaskNotification};
use crate::model::Task;
use crate::state_machine::ScheduleEvent;
use std::sync::Arc;
use tracing::{debug, warn};

/// What a notification announces about a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// Name or description changed
    Updated,
    /// A schedule command was applied
    Scheduled,
    /// An unschedule command was applied
    Unscheduled,
}

impl NotificationKind {
    /// Wire-level action tag
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Updated => "updated",
            NotificationKind::Scheduled => "scheduled",
            NotificationKind::Unscheduled => "unscheduled",
        }
    }
}

impl From<ScheduleEvent> for NotificationKind {
    fn from(event: ScheduleEvent) -> Self {
        match event {
            ScheduleEvent::Schedule => NotificationKind::Scheduled,
            ScheduleEvent::Unschedule => NotificationKind::Unscheduled,
        }
    }
}

/// Publishes task change notifications onto the fanout channel.
///
/// Cheap to clone; clones share the underlying channel.
#[derive(Clone)]
pub struct NotificationPublisher {
    channel: Arc<dyn MessageChannel>,
}

impl NotificationPublisher {
    pub fn new(channel: Arc<dyn MessageChannel>) -> Self {
        Self { channel }
    }

    /// Announce a task change.
    ///
    /// Update notifications carry the task description; scheduling
    /// notifications do not. Failures are logged and swallowed.
    pub async fn notify(&self, kind: NotificationKind, task: &Task) {
        let mut notification = TaskNotification::new(task.id, &task.name, kind.as_str());
        if kind == NotificationKind::Updated {
            notification = notification.with_description(&task.description);
        }

        match self.channel.publish_notification(&notification).await {
            Ok(()) => {
                debug!(task_id = %task.id, action = kind.as_str(), "Published task notification");
            }
            Err(e) => {
                warn!(
                    task_id = %task.id,
                    action = kind.as_str(),
                    error = %e,
                    "Failed to publish task notification"
                );
            }
        }
    }
}

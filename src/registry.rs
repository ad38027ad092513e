//! # Task Registry
//!
//! Concurrent in-memory task store. This is the single source of truth for
//! task state: the synchronous handler and the schedule consumer both mutate
//! tasks through it, concurrently, without any coordination between them.
//!
//! ## Concurrency
//!
//! Backed by a sharded concurrent map keyed by task id. Every operation on a
//! single task id is atomic (the shard lock covers the whole read-modify-write
//! in [`TaskRegistry::apply_event`] and [`TaskRegistry::update`]), and
//! operations on distinct ids proceed in parallel. List operations produce a
//! point-in-time snapshot of cloned records; they never lock the whole map.
//!
//! The registry performs no I/O and publishes nothing. Callers that need to
//! announce a mutation do so themselves after the registry call returns.

use crate::model::{Task, TaskStatus};
use crate::state_machine::{transition, ScheduleEvent};
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

/// Result of applying a scheduling event to a stored task.
#[derive(Debug, Clone, PartialEq)]
pub enum ScheduleOutcome {
    /// No task with that id
    NotFound,
    /// Task exists but sits in a reserved status; the record was not touched
    Ignored,
    /// Transition applied; carries the post-transition snapshot
    Applied(Task),
}

/// Concurrent registry of task records keyed by id.
///
/// Share one instance behind an `Arc`; all methods take `&self`.
#[derive(Debug, Default)]
pub struct TaskRegistry {
    tasks: DashMap<Uuid, Task>,
}

impl TaskRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            tasks: DashMap::new(),
        }
    }

    /// Create a task and store it.
    ///
    /// The registry assigns the identifier and the creation timestamp; the
    /// returned record is the stored snapshot.
    pub fn create(&self, name: impl Into<String>, description: impl Into<String>) -> Task {
        let task = Task::new(name, description);
        self.tasks.insert(task.id, task.clone());
        task
    }

    /// Fetch a snapshot of a task. Returns `None` when the id is unknown.
    pub fn get(&self, id: Uuid) -> Option<Task> {
        self.tasks.get(&id).map(|entry| entry.value().clone())
    }

    /// Remove a task. Returns whether a task with that id existed.
    pub fn delete(&self, id: Uuid) -> bool {
        self.tasks.remove(&id).is_some()
    }

    /// Replace a stored task wholesale.
    ///
    /// The incoming record's id selects the entry. Returns `false` without
    /// storing anything when the id is unknown; the caller decides whether
    /// that is an error.
    pub fn update(&self, task: Task) -> bool {
        match self.tasks.get_mut(&task.id) {
            Some(mut entry) => {
                *entry = task;
                true
            }
            None => false,
        }
    }

    /// Apply a scheduling event to a task.
    ///
    /// The whole read-transition-write happens under the entry lock. On a
    /// first entry into `Running` the record's `scheduled_at` is stamped with
    /// the current time; it is never cleared afterwards. Tasks in reserved
    /// statuses are left untouched and report [`ScheduleOutcome::Ignored`].
    pub fn apply_event(&self, id: Uuid, event: ScheduleEvent) -> ScheduleOutcome {
        let Some(mut entry) = self.tasks.get_mut(&id) else {
            return ScheduleOutcome::NotFound;
        };
        match transition(entry.status, event) {
            Some(next) => {
                entry.status = next;
                entry.is_running = next.is_running();
                if entry.is_running && entry.scheduled_at.is_none() {
                    entry.scheduled_at = Some(Utc::now());
                }
                ScheduleOutcome::Applied(entry.value().clone())
            }
            None => {
                debug!(
                    task_id = %id,
                    status = %entry.status,
                    event = %event,
                    "Scheduling event ignored for reserved status"
                );
                ScheduleOutcome::Ignored
            }
        }
    }

    /// Boolean facade over [`TaskRegistry::apply_event`].
    ///
    /// `running == true` applies a schedule event, `running == false` an
    /// unschedule event. Returns whether a task with that id existed.
    pub fn set_running(&self, id: Uuid, running: bool) -> bool {
        let event = if running {
            ScheduleEvent::Schedule
        } else {
            ScheduleEvent::Unschedule
        };
        self.apply_event(id, event) != ScheduleOutcome::NotFound
    }

    /// Snapshot of every stored task, in no particular order
    pub fn list_all(&self) -> Vec<Task> {
        self.tasks.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Snapshot of tasks currently in the running state
    pub fn list_running(&self) -> Vec<Task> {
        self.tasks
            .iter()
            .filter(|entry| entry.value().status == TaskStatus::Running)
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Number of stored tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether the registry holds no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

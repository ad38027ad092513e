//! # Scheduling State Machine
//!
//! Pure transition logic for task scheduling. The entire lifecycle effect of a
//! scheduling event is captured by [`transition`], a total function over
//! `(status, event)` with no I/O and no clock access, so every reachable
//! combination can be enumerated in tests.
//!
//! ## Transition Table
//!
//! | Current                          | Schedule   | Unschedule  |
//! |----------------------------------|------------|-------------|
//! | `Created`/`Scheduled`/`Running`  | `Running`  | `Scheduled` |
//! | `Completed`/`Failed`/`Cancelled` | (ignored)  | (ignored)   |
//!
//! Both events are idempotent: re-applying one to a task already in the target
//! state yields the same state. Reserved statuses return `None`, meaning the
//! event must leave the record untouched.

use crate::model::TaskStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A scheduling event carried on the control channel.
///
/// This is the closed set of commands the schedule consumer understands. Raw
/// action strings are parsed into this enum exactly once, at the channel edge;
/// everything downstream works with the typed event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleEvent {
    /// Start the task (move it toward `Running`)
    Schedule,
    /// Stop the task (move it back to `Scheduled`)
    Unschedule,
}

impl ScheduleEvent {
    /// Wire-level action tag, also used as the control routing key
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleEvent::Schedule => "schedule",
            ScheduleEvent::Unschedule => "unschedule",
        }
    }

    /// Parse an action tag, case-insensitively.
    ///
    /// Returns `None` for anything outside the closed command set so callers
    /// can discard unknown actions without treating them as parse failures.
    pub fn parse(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("schedule") {
            Some(ScheduleEvent::Schedule)
        } else if s.eq_ignore_ascii_case("unschedule") {
            Some(ScheduleEvent::Unschedule)
        } else {
            None
        }
    }

    /// Whether this event targets the running state
    pub fn targets_running(&self) -> bool {
        matches!(self, ScheduleEvent::Schedule)
    }
}

impl fmt::Display for ScheduleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Compute the status a scheduling event produces.
///
/// Returns `Some(next)` when the event applies, `None` when the current status
/// is reserved and the event must be ignored. Callers that get `Some` are
/// responsible for deriving `is_running` from the returned status and for
/// stamping `scheduled_at` on a first entry into `Running`.
pub fn transition(current: TaskStatus, event: ScheduleEvent) -> Option<TaskStatus> {
    match (current, event) {
        (
            TaskStatus::Created | TaskStatus::Scheduled | TaskStatus::Running,
            ScheduleEvent::Schedule,
        ) => Some(TaskStatus::Running),
        (
            TaskStatus::Created | TaskStatus::Scheduled | TaskStatus::Running,
            ScheduleEvent::Unschedule,
        ) => Some(TaskStatus::Scheduled),
        (TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled, _) => None,
    }
}

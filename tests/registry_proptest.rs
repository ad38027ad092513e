//! Property-based tests for the registry and the scheduling state machine.

use proptest::prelude::*;
use taskbridge_core::registry::ScheduleOutcome;
use taskbridge_core::{transition, ScheduleEvent, TaskRegistry, TaskStatus};

fn event_strategy() -> impl Strategy<Value = ScheduleEvent> {
    prop_oneof![
        Just(ScheduleEvent::Schedule),
        Just(ScheduleEvent::Unschedule),
    ]
}

fn event_sequence_strategy() -> impl Strategy<Value = Vec<ScheduleEvent>> {
    prop::collection::vec(event_strategy(), 0..32)
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Created),
        Just(TaskStatus::Scheduled),
        Just(TaskStatus::Running),
        Just(TaskStatus::Completed),
        Just(TaskStatus::Failed),
        Just(TaskStatus::Cancelled),
    ]
}

fn reserved_status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Completed),
        Just(TaskStatus::Failed),
        Just(TaskStatus::Cancelled),
    ]
}

fn task_name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,24}"
}

proptest! {
    /// Property: the transition function is defined exactly on schedulable
    /// statuses, and its result is fixed by the event alone.
    #[test]
    fn transition_defined_exactly_on_schedulable_statuses(
        status in status_strategy(),
        event in event_strategy(),
    ) {
        match transition(status, event) {
            Some(next) => {
                prop_assert!(status.is_schedulable());
                let expected = if event.targets_running() {
                    TaskStatus::Running
                } else {
                    TaskStatus::Scheduled
                };
                prop_assert_eq!(next, expected);
            }
            None => prop_assert!(status.is_reserved()),
        }
    }

    /// Property: after any event sequence the derived running flag mirrors
    /// the status.
    #[test]
    fn running_flag_mirrors_status(
        name in task_name_strategy(),
        events in event_sequence_strategy(),
    ) {
        let registry = TaskRegistry::new();
        let task = registry.create(name, "");

        for event in events {
            registry.apply_event(task.id, event);
            let current = registry.get(task.id).unwrap();
            prop_assert_eq!(current.is_running, current.status == TaskStatus::Running);
        }
    }

    /// Property: starting from a fresh task, the final status is determined
    /// entirely by the last event.
    #[test]
    fn final_status_follows_last_event(events in event_sequence_strategy()) {
        let registry = TaskRegistry::new();
        let task = registry.create("subject", "");

        for &event in &events {
            let outcome = registry.apply_event(task.id, event);
            prop_assert!(matches!(outcome, ScheduleOutcome::Applied(_)));
        }

        let expected = match events.last() {
            None => TaskStatus::Created,
            Some(last) if last.targets_running() => TaskStatus::Running,
            Some(_) => TaskStatus::Scheduled,
        };
        prop_assert_eq!(registry.get(task.id).unwrap().status, expected);
    }

    /// Property: scheduled_at is stamped exactly when a sequence first
    /// reaches running, and the stamp never changes afterwards.
    #[test]
    fn scheduled_at_stamped_once_and_kept(events in event_sequence_strategy()) {
        let registry = TaskRegistry::new();
        let task = registry.create("stamped", "");

        let mut first_stamp = None;
        for event in events {
            registry.apply_event(task.id, event);
            let current = registry.get(task.id).unwrap();
            match (first_stamp, current.scheduled_at) {
                (None, Some(at)) => {
                    prop_assert!(event.targets_running());
                    first_stamp = Some(at);
                }
                (Some(expected), actual) => prop_assert_eq!(actual, Some(expected)),
                (None, None) => prop_assert!(!event.targets_running()),
            }
        }
    }

    /// Property: tasks in reserved statuses ignore every event and keep
    /// their record byte-for-byte.
    #[test]
    fn reserved_tasks_ignore_all_events(
        status in reserved_status_strategy(),
        events in event_sequence_strategy(),
    ) {
        let registry = TaskRegistry::new();
        let mut task = registry.create("finished", "");
        task.status = status;
        task.is_running = false;
        prop_assert!(registry.update(task.clone()));

        for event in events {
            prop_assert_eq!(registry.apply_event(task.id, event), ScheduleOutcome::Ignored);
            prop_assert_eq!(registry.get(task.id).unwrap(), task.clone());
        }
    }

    /// Property: re-applying the event that produced the current state
    /// changes nothing.
    #[test]
    fn events_are_idempotent(
        events in event_sequence_strategy(),
        last in event_strategy(),
    ) {
        let registry = TaskRegistry::new();
        let task = registry.create("repeat", "");
        for event in events {
            registry.apply_event(task.id, event);
        }

        registry.apply_event(task.id, last);
        let before = registry.get(task.id).unwrap();
        registry.apply_event(task.id, last);
        prop_assert_eq!(registry.get(task.id).unwrap(), before);
    }

    /// Property: the running list is exactly the set of tasks whose derived
    /// flag is set.
    #[test]
    fn running_list_matches_flags(
        sequences in prop::collection::vec(event_sequence_strategy(), 1..6),
    ) {
        let registry = TaskRegistry::new();
        let mut ids = Vec::new();
        for (i, events) in sequences.iter().enumerate() {
            let task = registry.create(format!("task-{i}"), "");
            for &event in events {
                registry.apply_event(task.id, event);
            }
            ids.push(task.id);
        }

        let running: Vec<_> = registry.list_running();
        for task in &running {
            prop_assert!(task.is_running);
        }
        let expected = ids
            .iter()
            .filter(|id| registry.get(**id).unwrap().is_running)
            .count();
        prop_assert_eq!(running.len(), expected);
    }

    /// Property: events aimed at ids the registry has never seen report
    /// NotFound and leave the registry empty.
    #[test]
    fn unknown_ids_report_not_found(events in event_sequence_strategy()) {
        let registry = TaskRegistry::new();
        for event in events {
            let outcome = registry.apply_event(uuid::Uuid::new_v4(), event);
            prop_assert_eq!(outcome, ScheduleOutcome::NotFound);
        }
        prop_assert!(registry.is_empty());
    }
}

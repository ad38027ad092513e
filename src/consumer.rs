//! # Schedule Consumer
//!
//! The single processing loop for the control channel. Deliveries arrive as
//! raw bytes and are validated in stages: payload shape, then identifier,
//! then action tag. Anything that fails a stage is discarded with a warning
//! and the loop moves on; one bad payload never takes the consumer down.
//!
//! ## Shutdown
//!
//! [`ScheduleConsumer::spawn`] runs the loop on a background task and returns
//! a handle. Shutdown finishes the in-flight event before stopping: the stop
//! signal is only polled between deliveries.
//!
//! ## Loss Model
//!
//! Deliveries are acknowledged on receipt by the transport, so an event the
//! loop never got to is lost with the process. That is the accepted trade for
//! keeping the loop free of redelivery handling.

use crate::messaging::ControlSubscription;
use crate::notifications::{NotificationKind, NotificationPublisher};
use crate::registry::{ScheduleOutcome, TaskRegistry};
use crate::state_machine::ScheduleEvent;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Counters for consumer observability.
///
/// `events_received == transitions_applied + events_discarded` once the loop
/// is idle.
#[derive(Debug, Default)]
pub struct ScheduleConsumerStats {
    received: AtomicU64,
    applied: AtomicU64,
    discarded: AtomicU64,
}

impl ScheduleConsumerStats {
    /// Total deliveries taken off the channel
    pub fn events_received(&self) -> u64 {
        self.received.load(Ordering::Relaxed)
    }

    /// Deliveries that changed a task record
    pub fn transitions_applied(&self) -> u64 {
        self.applied.load(Ordering::Relaxed)
    }

    /// Deliveries dropped at a validation stage, plus events ignored for
    /// reserved statuses
    pub fn events_discarded(&self) -> u64 {
        self.discarded.load(Ordering::Relaxed)
    }

    fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    fn record_applied(&self) {
        self.applied.fetch_add(1, Ordering::Relaxed);
    }

    fn record_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }
}

/// Applies control channel events to the registry.
pub struct ScheduleConsumer {
    registry: Arc<TaskRegistry>,
    notifier: NotificationPublisher,
    stats: Arc<ScheduleConsumerStats>,
}

impl ScheduleConsumer {
    pub fn new(registry: Arc<TaskRegistry>, notifier: NotificationPublisher) -> Self {
        Self {
            registry,
            notifier,
            stats: Arc::new(ScheduleConsumerStats::default()),
        }
    }

    /// Shared handle to the consumer's counters
    pub fn stats(&self) -> Arc<ScheduleConsumerStats> {
        Arc::clone(&self.stats)
    }

    /// Run the processing loop on a background task.
    pub fn spawn(self, subscription: Box<dyn ControlSubscription>) -> ScheduleConsumerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let stats = self.stats();
        let join = tokio::spawn(self.run(subscription, shutdown_rx));
        ScheduleConsumerHandle {
            shutdown: shutdown_tx,
            join,
            stats,
        }
    }

    /// Drive the processing loop until shutdown or the subscription ends.
    ///
    /// Exposed for embedders that manage their own tasks; most callers want
    /// [`ScheduleConsumer::spawn`].
    pub async fn run(
        self,
        mut subscription: Box<dyn ControlSubscription>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("Schedule consumer started");
        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    info!("Schedule consumer stopping on shutdown signal");
                    break;
                }
                delivery = subscription.recv() => {
                    match delivery {
                        Some(payload) => self.process(&payload).await,
                        None => {
                            error!("Control subscription ended; schedule consumer stopping");
                            break;
                        }
                    }
                }
            }
        }
        info!(
            events_received = self.stats.events_received(),
            transitions_applied = self.stats.transitions_applied(),
            events_discarded = self.stats.events_discarded(),
            "Schedule consumer stopped"
        );
    }

    /// Validate and apply one control payload.
    async fn process(&self, payload: &[u8]) {
        self.stats.record_received();

        let value: serde_json::Value = match serde_json::from_slice(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Discarding malformed control event");
                self.stats.record_discarded();
                return;
            }
        };

        let Some(raw_id) = value.get("TaskId").and_then(serde_json::Value::as_str) else {
            warn!("Control event missing TaskId");
            self.stats.record_discarded();
            return;
        };
        let task_id = match Uuid::parse_str(raw_id) {
            Ok(id) => id,
            Err(_) => {
                warn!(task_id = %raw_id, "Invalid task ID in control event");
                self.stats.record_discarded();
                return;
            }
        };

        let action = value
            .get("Action")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        match ScheduleEvent::parse(action) {
            Some(event) => self.apply(task_id, event).await,
            None => {
                warn!(task_id = %task_id, action = %action, "Unknown control action");
                self.stats.record_discarded();
            }
        }
    }

    async fn apply(&self, task_id: Uuid, event: ScheduleEvent) {
        match self.registry.apply_event(task_id, event) {
            ScheduleOutcome::Applied(task) => {
                info!(
                    task_id = %task_id,
                    action = %event,
                    status = %task.status,
                    "Scheduling transition applied"
                );
                self.notifier.notify(NotificationKind::from(event), &task).await;
                self.stats.record_applied();
            }
            ScheduleOutcome::NotFound => {
                warn!(task_id = %task_id, action = %event, "Task not found for scheduling transition");
                self.stats.record_discarded();
            }
            ScheduleOutcome::Ignored => {
                debug!(task_id = %task_id, action = %event, "Scheduling event ignored for reserved status");
                self.stats.record_discarded();
            }
        }
    }
}

/// Handle to a spawned consumer loop.
pub struct ScheduleConsumerHandle {
    shutdown: watch::Sender<bool>,
    join: JoinHandle<()>,
    stats: Arc<ScheduleConsumerStats>,
}

impl ScheduleConsumerHandle {
    /// Counters of the running consumer
    pub fn stats(&self) -> Arc<ScheduleConsumerStats> {
        Arc::clone(&self.stats)
    }

    /// Whether the loop has already exited
    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Signal shutdown and wait for the loop to finish its in-flight event.
    pub async fn shutdown(self) {
        // send only fails when the loop already exited on its own
        let _ = self.shutdown.send(true);
        if let Err(e) = self.join.await {
            error!(error = %e, "Schedule consumer task panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messaging::providers::InMemoryChannel;
    use crate::messaging::{ControlMessage, MessageChannel};
    use crate::model::TaskStatus;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::mpsc;

    /// Feeds arbitrary bytes into the loop, bypassing message construction
    struct RawSubscription {
        rx: mpsc::UnboundedReceiver<Vec<u8>>,
    }

    #[async_trait]
    impl ControlSubscription for RawSubscription {
        async fn recv(&mut self) -> Option<Vec<u8>> {
            self.rx.recv().await
        }
    }

    fn raw_subscription() -> (mpsc::UnboundedSender<Vec<u8>>, Box<dyn ControlSubscription>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Box::new(RawSubscription { rx }))
    }

    struct Fixture {
        registry: Arc<TaskRegistry>,
        channel: Arc<InMemoryChannel>,
        handle: ScheduleConsumerHandle,
    }

    async fn fixture() -> Fixture {
        let registry = Arc::new(TaskRegistry::new());
        let channel = Arc::new(InMemoryChannel::new());
        let notifier = NotificationPublisher::new(channel.clone() as Arc<dyn MessageChannel>);
        let consumer = ScheduleConsumer::new(registry.clone(), notifier);
        let handle = consumer.spawn(channel.subscribe_control().await.unwrap());
        Fixture {
            registry,
            channel,
            handle,
        }
    }

    async fn wait_until(mut condition: impl FnMut() -> bool) {
        for _ in 0..500 {
            if condition() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("condition not met within timeout");
    }

    #[tokio::test]
    async fn test_schedule_event_transitions_task() {
        let fx = fixture().await;
        let task = fx.registry.create("job", "");

        fx.channel
            .publish_control(&ControlMessage::schedule(task.id, None))
            .await
            .unwrap();

        wait_until(|| fx.registry.get(task.id).is_some_and(|t| t.is_running)).await;

        let stored = fx.registry.get(task.id).unwrap();
        assert_eq!(stored.status, TaskStatus::Running);
        assert!(stored.scheduled_at.is_some());
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_discarded_and_loop_survives() {
        let registry = Arc::new(TaskRegistry::new());
        let channel = Arc::new(InMemoryChannel::new());
        let notifier = NotificationPublisher::new(channel as Arc<dyn MessageChannel>);
        let consumer = ScheduleConsumer::new(registry.clone(), notifier);
        let stats = consumer.stats();
        let (tx, subscription) = raw_subscription();
        let handle = consumer.spawn(subscription);

        let task = registry.create("job", "");

        // four discard stages: garbage bytes, missing id, malformed id,
        // unknown action
        tx.send(b"not json at all".to_vec()).unwrap();
        tx.send(br#"{"Action": "schedule"}"#.to_vec()).unwrap();
        tx.send(br#"{"TaskId": "zzz", "Action": "schedule"}"#.to_vec())
            .unwrap();
        tx.send(format!(r#"{{"TaskId": "{}", "Action": "explode"}}"#, task.id).into_bytes())
            .unwrap();

        wait_until(|| stats.events_discarded() == 4).await;
        assert_eq!(stats.transitions_applied(), 0);
        assert_eq!(registry.get(task.id).unwrap().status, TaskStatus::Created);

        // the loop is still alive and applies a good event afterwards
        let good = serde_json::to_vec(&ControlMessage::schedule(task.id, None)).unwrap();
        tx.send(good).unwrap();
        wait_until(|| stats.transitions_applied() == 1).await;
        assert!(registry.get(task.id).unwrap().is_running);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_unknown_task_is_discarded() {
        let fx = fixture().await;
        let stats = fx.handle.stats();

        fx.channel
            .publish_control(&ControlMessage::schedule(Uuid::new_v4(), None))
            .await
            .unwrap();

        wait_until(|| stats.events_discarded() == 1).await;
        assert_eq!(stats.transitions_applied(), 0);
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_reserved_status_event_is_ignored_not_applied() {
        let fx = fixture().await;
        let stats = fx.handle.stats();
        let mut task = fx.registry.create("done", "");
        task.status = TaskStatus::Completed;
        fx.registry.update(task.clone());

        fx.channel
            .publish_control(&ControlMessage::schedule(task.id, None))
            .await
            .unwrap();

        wait_until(|| stats.events_discarded() == 1).await;
        assert_eq!(stats.transitions_applied(), 0);
        assert_eq!(fx.registry.get(task.id).unwrap().status, TaskStatus::Completed);
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_events_apply_in_publication_order() {
        let fx = fixture().await;
        let stats = fx.handle.stats();
        let task = fx.registry.create("job", "");

        fx.channel
            .publish_control(&ControlMessage::schedule(task.id, None))
            .await
            .unwrap();
        fx.channel
            .publish_control(&ControlMessage::unschedule(task.id))
            .await
            .unwrap();
        fx.channel
            .publish_control(&ControlMessage::schedule(task.id, None))
            .await
            .unwrap();

        wait_until(|| stats.transitions_applied() == 3).await;
        assert_eq!(fx.registry.get(task.id).unwrap().status, TaskStatus::Running);
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_scheduling_notifications_published_on_apply() {
        let fx = fixture().await;
        let mut notifications = fx.channel.subscribe_notifications().await.unwrap();
        let task = fx.registry.create("watched", "");

        fx.channel
            .publish_control(&ControlMessage::schedule(task.id, None))
            .await
            .unwrap();
        let scheduled = notifications.recv().await.unwrap();
        assert_eq!(scheduled.action, "scheduled");
        assert_eq!(scheduled.task_id, task.id);
        assert_eq!(scheduled.task_name, "watched");
        assert!(scheduled.description.is_none());

        fx.channel
            .publish_control(&ControlMessage::unschedule(task.id))
            .await
            .unwrap();
        let unscheduled = notifications.recv().await.unwrap();
        assert_eq!(unscheduled.action, "unscheduled");
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_shutdown_stops_the_loop() {
        let fx = fixture().await;
        assert!(!fx.handle.is_finished());
        fx.handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_loop_exits_when_subscription_ends() {
        let registry = Arc::new(TaskRegistry::new());
        let channel = Arc::new(InMemoryChannel::new());
        let notifier = NotificationPublisher::new(channel as Arc<dyn MessageChannel>);
        let consumer = ScheduleConsumer::new(registry, notifier);
        let (tx, subscription) = raw_subscription();
        let handle = consumer.spawn(subscription);

        drop(tx);
        wait_until(|| handle.is_finished()).await;
        handle.shutdown().await;
    }
}

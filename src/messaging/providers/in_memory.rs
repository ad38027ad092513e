//! # In-Memory Channel Provider
//!
//! Broker-free [`MessageChannel`] built on tokio channels, used by tests and
//! single-process deployments. Matches the broker provider's semantics where
//! it matters: at-most-once delivery, a single control consumer, fanout
//! notifications that drop when nobody listens.
//!
//! The control queue exists from construction, so commands published before
//! the consumer attaches are buffered, up to the configured capacity.

use crate::messaging::channel::{ControlSubscription, MessageChannel, NotificationSubscription};
use crate::messaging::errors::{MessagingError, MessagingResult};
use crate::messaging::message::{ControlMessage, TaskNotification};
use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc, Mutex};
use tracing::{debug, warn};

/// Buffered control commands before the publisher blocks
pub const DEFAULT_CONTROL_CAPACITY: usize = 256;
/// Notifications a slow subscriber may fall behind before it starts skipping
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 1000;

/// In-memory message channel provider.
pub struct InMemoryChannel {
    control_tx: mpsc::Sender<Vec<u8>>,
    control_rx: Mutex<Option<mpsc::Receiver<Vec<u8>>>>,
    notify_tx: broadcast::Sender<TaskNotification>,
}

impl InMemoryChannel {
    /// Create a channel with default capacities
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CONTROL_CAPACITY, DEFAULT_NOTIFICATION_CAPACITY)
    }

    /// Create a channel with explicit queue capacities
    pub fn with_capacity(control: usize, notifications: usize) -> Self {
        let (control_tx, control_rx) = mpsc::channel(control.max(1));
        let (notify_tx, _) = broadcast::channel(notifications.max(1));
        Self {
            control_tx,
            control_rx: Mutex::new(Some(control_rx)),
            notify_tx,
        }
    }
}

impl Default for InMemoryChannel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessageChannel for InMemoryChannel {
    async fn publish_control(&self, message: &ControlMessage) -> MessagingResult<()> {
        let payload = serde_json::to_vec(message).map_err(MessagingError::from)?;
        if self.control_tx.send(payload).await.is_err() {
            // consumer detached and dropped its subscription; nothing is
            // listening, matching a broker exchange with no bound queue
            debug!(task_id = %message.task_id, action = %message.action, "Control command dropped, no consumer");
        }
        Ok(())
    }

    async fn publish_notification(&self, notification: &TaskNotification) -> MessagingResult<()> {
        // send only fails with zero subscribers, which is a valid state
        let _ = self.notify_tx.send(notification.clone());
        Ok(())
    }

    async fn subscribe_control(&self) -> MessagingResult<Box<dyn ControlSubscription>> {
        let rx = self.control_rx.lock().await.take().ok_or_else(|| {
            MessagingError::consume("in-memory control", "control subscription already taken")
        })?;
        Ok(Box::new(InMemoryControlSubscription { rx }))
    }

    async fn subscribe_notifications(&self) -> MessagingResult<Box<dyn NotificationSubscription>> {
        Ok(Box::new(InMemoryNotificationSubscription {
            rx: self.notify_tx.subscribe(),
        }))
    }

    async fn health_check(&self) -> MessagingResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "in_memory"
    }
}

struct InMemoryControlSubscription {
    rx: mpsc::Receiver<Vec<u8>>,
}

#[async_trait]
impl ControlSubscription for InMemoryControlSubscription {
    async fn recv(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }
}

struct InMemoryNotificationSubscription {
    rx: broadcast::Receiver<TaskNotification>,
}

#[async_trait]
impl NotificationSubscription for InMemoryNotificationSubscription {
    async fn recv(&mut self) -> Option<TaskNotification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Notification subscriber lagged, skipping");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

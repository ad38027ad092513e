#![allow(dead_code)]

//! Shared harness for integration tests: the full coordination stack wired
//! over the in-memory channel, plus polling helpers for observing the
//! asynchronous scheduling path.

use std::sync::Arc;
use std::time::Duration;
use taskbridge_core::gateway::CommandEnvelope;
use taskbridge_core::messaging::providers::InMemoryChannel;
use taskbridge_core::messaging::MessageChannel;
use taskbridge_core::{
    Gateway, NotificationPublisher, ScheduleConsumer, ScheduleConsumerHandle, TaskRegistry,
    TaskService,
};

/// Fully wired coordination stack over the in-memory channel.
pub struct TestStack {
    pub registry: Arc<TaskRegistry>,
    pub channel: Arc<InMemoryChannel>,
    pub service: Arc<TaskService>,
    pub gateway: Gateway,
    pub consumer: ScheduleConsumerHandle,
}

impl TestStack {
    /// Construct the stack and attach the schedule consumer.
    pub async fn start() -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let channel = Arc::new(InMemoryChannel::new());
        let shared: Arc<dyn MessageChannel> = channel.clone();
        let notifier = NotificationPublisher::new(Arc::clone(&shared));
        let service = Arc::new(TaskService::new(Arc::clone(&registry), notifier.clone()));
        let gateway = Gateway::new(Arc::clone(&service), Arc::clone(&shared));
        let consumer = ScheduleConsumer::new(Arc::clone(&registry), notifier).spawn(
            shared
                .subscribe_control()
                .await
                .expect("control subscription"),
        );
        Self {
            registry,
            channel,
            service,
            gateway,
            consumer,
        }
    }

    /// Dispatch a JSON envelope as an ingress adapter would.
    pub async fn dispatch_json(
        &self,
        envelope: serde_json::Value,
    ) -> taskbridge_core::DispatchResponse {
        let envelope: CommandEnvelope =
            serde_json::from_value(envelope).expect("envelope deserializes");
        self.gateway.dispatch(envelope).await
    }

    /// Wait until the task reports the given running state.
    pub async fn wait_for_running(&self, task_id: uuid::Uuid, running: bool) {
        wait_until(|| {
            self.registry
                .get(task_id)
                .is_some_and(|t| t.is_running == running)
        })
        .await;
    }

    /// Stop the consumer loop.
    pub async fn shutdown(self) {
        self.consumer.shutdown().await;
    }
}

/// Poll a condition until it holds, panicking after a couple of seconds.
pub async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not met within timeout");
}

//! # Message Channel Abstraction
//!
//! Provider-neutral interface over the two asynchronous channels: the
//! point-to-point control channel feeding the schedule consumer and the
//! fanout notification channel. Components hold an `Arc<dyn MessageChannel>`
//! and never know which provider backs it.
//!
//! ## Delivery Semantics
//!
//! Both channels are at-most-once: deliveries are acknowledged on receipt,
//! before processing, so a consumer crash mid-event loses that event. Publishing
//! a notification with zero subscribers succeeds and the notification is
//! dropped.

use crate::messaging::errors::MessagingResult;
use crate::messaging::message::{ControlMessage, TaskNotification};
use async_trait::async_trait;

/// Transport interface for control commands and change notifications.
///
/// Implementations must be safe to share across tasks; all methods take
/// `&self`.
#[async_trait]
pub trait MessageChannel: Send + Sync + 'static {
    /// Publish a control command onto the control channel.
    ///
    /// Succeeds once the broker has accepted the payload; whether any consumer
    /// is attached does not affect the result.
    async fn publish_control(&self, message: &ControlMessage) -> MessagingResult<()>;

    /// Publish a change notification onto the fanout channel.
    ///
    /// Zero subscribers is not an error.
    async fn publish_notification(&self, notification: &TaskNotification) -> MessagingResult<()>;

    /// Attach the single control consumer.
    ///
    /// Declares and binds the control queue if the provider has such a notion.
    /// Deliveries are acknowledged on receipt. Providers may reject a second
    /// concurrent subscription.
    async fn subscribe_control(&self) -> MessagingResult<Box<dyn ControlSubscription>>;

    /// Attach a notification subscriber.
    ///
    /// Any number of subscribers may be attached; each sees every notification
    /// published after it attached.
    async fn subscribe_notifications(&self) -> MessagingResult<Box<dyn NotificationSubscription>>;

    /// Check whether the underlying transport is usable
    async fn health_check(&self) -> MessagingResult<bool>;

    /// Short provider identifier for logs
    fn provider_name(&self) -> &'static str;
}

/// A stream of raw control payloads.
///
/// Payloads are handed over as bytes: the consumer owns payload validation and
/// must tolerate malformed input, so decoding is not the transport's job.
#[async_trait]
pub trait ControlSubscription: Send {
    /// Receive the next control payload.
    ///
    /// Returns `None` when the subscription has ended (connection closed or
    /// channel shut down); the caller is expected to stop and let the
    /// transport layer re-establish.
    async fn recv(&mut self) -> Option<Vec<u8>>;
}

/// A stream of decoded change notifications.
#[async_trait]
pub trait NotificationSubscription: Send {
    /// Receive the next notification, skipping payloads that do not decode.
    ///
    /// Returns `None` when the subscription has ended.
    async fn recv(&mut self) -> Option<TaskNotification>;
}

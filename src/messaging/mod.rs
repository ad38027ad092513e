//! # Messaging Layer
//!
//! Everything that crosses the asynchronous channel boundary: the wire message
//! types, the provider-neutral [`MessageChannel`] trait, and the concrete
//! providers. Domain components depend only on the trait; which transport
//! backs it is a wiring decision.

pub mod channel;
pub mod errors;
pub mod message;
pub mod providers;

pub use channel::{ControlSubscription, MessageChannel, NotificationSubscription};
pub use errors::{MessagingError, MessagingResult};
pub use message::{ControlMessage, TaskNotification};

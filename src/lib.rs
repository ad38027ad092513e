#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Taskbridge Core
//!
//! Task lifecycle coordination between a synchronous CRUD channel and an
//! asynchronous scheduling channel.
//!
//! ## Overview
//!
//! Tasks live in an in-memory concurrent registry. Two kinds of traffic hit
//! that registry:
//!
//! - **Synchronous commands** (create, update, delete, list) complete against
//!   the registry before the caller gets a response.
//! - **Scheduling commands** (schedule, unschedule) are accepted immediately,
//!   published onto a control channel, and applied later by a dedicated
//!   consumer loop. Acceptance of the command is not application: callers
//!   observe the transition by polling reads.
//!
//! Every applied change can fan out as a notification to any number of
//! subscribers over a broadcast channel.
//!
//! ## Architecture
//!
//! - [`gateway`] - validates external envelopes into typed commands and
//!   dispatches them
//! - [`service`] - synchronous CRUD handler over the registry
//! - [`consumer`] - the single processing loop applying control events
//! - [`registry`] - concurrent task store, the sole source of truth
//! - [`state_machine`] - pure scheduling transition function
//! - [`notifications`] - fanout publisher for task change announcements
//! - [`messaging`] - channel abstraction with in-memory and RabbitMQ providers
//! - [`wire`] - RPC record contracts and the timestamp codec
//! - [`model`], [`config`], [`error`], [`logging`] - the usual supports
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use taskbridge_core::gateway::{CommandEnvelope, TaskPayload};
//! use taskbridge_core::messaging::providers::InMemoryChannel;
//! use taskbridge_core::messaging::MessageChannel;
//! use taskbridge_core::{
//!     Gateway, NotificationPublisher, ScheduleConsumer, TaskRegistry, TaskService,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! taskbridge_core::logging::init_logging();
//!
//! let registry = Arc::new(TaskRegistry::new());
//! let channel: Arc<dyn MessageChannel> = Arc::new(InMemoryChannel::new());
//! let notifier = NotificationPublisher::new(Arc::clone(&channel));
//! let service = Arc::new(TaskService::new(Arc::clone(&registry), notifier.clone()));
//! let gateway = Gateway::new(Arc::clone(&service), Arc::clone(&channel));
//!
//! // attach the schedule consumer to the control channel
//! let consumer = ScheduleConsumer::new(Arc::clone(&registry), notifier);
//! let handle = consumer.spawn(channel.subscribe_control().await?);
//!
//! // dispatch an external command
//! let envelope = CommandEnvelope {
//!     action: Some("create".to_string()),
//!     create_payload: Some(TaskPayload {
//!         name: "demo".to_string(),
//!         description: "a demo task".to_string(),
//!     }),
//!     ..Default::default()
//! };
//! let response = gateway.dispatch(envelope).await;
//! assert!(response.success);
//!
//! handle.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Testing
//!
//! ```bash
//! cargo test                  # unit + integration tests, broker-free
//! cargo test -- --ignored     # RabbitMQ provider tests, needs a live broker
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod messaging;
pub mod model;
pub mod notifications;
pub mod registry;
pub mod service;
pub mod state_machine;
pub mod wire;

pub use config::{AmqpConfig, CoreConfig};
pub use consumer::{ScheduleConsumer, ScheduleConsumerHandle, ScheduleConsumerStats};
pub use error::{CoreError, Result};
pub use gateway::{CommandEnvelope, DispatchResponse, Gateway, TaskCommand};
pub use messaging::{ControlMessage, MessageChannel, TaskNotification};
pub use model::{Task, TaskStatus};
pub use notifications::{NotificationKind, NotificationPublisher};
pub use registry::{ScheduleOutcome, TaskRegistry};
pub use service::TaskService;
pub use state_machine::{transition, ScheduleEvent};

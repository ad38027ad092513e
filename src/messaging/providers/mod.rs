//! Channel provider implementations.
//!
//! - [`InMemoryChannel`]: tokio-channel transport for tests and single-process
//!   deployments
//! - [`RabbitMqChannel`]: AMQP transport for the deployed topology

pub mod in_memory;
pub mod rabbitmq;

pub use in_memory::InMemoryChannel;
pub use rabbitmq::RabbitMqChannel;

//! Error types for the messaging layer.
//!
//! Every fault a channel provider can hit maps onto one of these variants so
//! callers handle broker trouble uniformly regardless of which provider is
//! wired in.

use thiserror::Error;

/// Errors produced by message channel providers.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// Failed to reach or stay connected to the broker
    #[error("Broker connection error: {message}")]
    Connection { message: String },

    /// Failed to declare or bind an exchange or queue
    #[error("Declare failed for {object}: {message}")]
    Declare { object: String, message: String },

    /// Failed to publish to an exchange
    #[error("Publish failed on exchange {exchange}: {message}")]
    Publish { exchange: String, message: String },

    /// Failed to start or continue consuming from a queue
    #[error("Consume failed on queue {queue}: {message}")]
    Consume { queue: String, message: String },

    /// Failed to serialize an outbound message
    #[error("Message serialization error: {message}")]
    Serialization { message: String },

    /// Failed to deserialize an inbound message
    #[error("Message deserialization error: {message}")]
    Deserialization { message: String },
}

impl MessagingError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a declare error for a named exchange or queue
    pub fn declare(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Declare {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Create a publish error for a named exchange
    pub fn publish(exchange: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Publish {
            exchange: exchange.into(),
            message: message.into(),
        }
    }

    /// Create a consume error for a named queue
    pub fn consume(queue: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Consume {
            queue: queue.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a deserialization error
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for MessagingError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() || err.is_eof() {
            Self::deserialization(err.to_string())
        } else {
            Self::serialization(err.to_string())
        }
    }
}

/// Result type alias for messaging operations
pub type MessagingResult<T> = Result<T, MessagingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MessagingError::publish("task.schedule", "channel closed");
        assert_eq!(
            err.to_string(),
            "Publish failed on exchange task.schedule: channel closed"
        );

        let err = MessagingError::declare("task.schedule.queue", "access refused");
        assert!(err.to_string().contains("task.schedule.queue"));
    }

    #[test]
    fn test_serde_error_maps_to_deserialization() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let mapped: MessagingError = err.into();
        assert!(matches!(mapped, MessagingError::Deserialization { .. }));
    }
}

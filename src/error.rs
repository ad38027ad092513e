//! # Crate Error Types
//!
//! Structured error handling for the coordination core. Not-found conditions are
//! deliberately *not* errors anywhere in this crate: registry and handler
//! operations report absence through boolean or `Option` results, so this
//! taxonomy only covers validation, configuration, and transport faults.

use crate::messaging::MessagingError;
use thiserror::Error;

/// Top-level error type for the coordination core.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Messaging error: {0}")]
    Messaging(#[from] MessagingError),
}

impl CoreError {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

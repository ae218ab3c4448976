//! Error types for the engine session
//!
//! Every failure the session can produce maps onto one of these variants.
//! The HTTP layer turns all of them into a JSON error payload.

use thiserror::Error;

/// Errors that can occur while talking to the external engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Position string was rejected, either by the shape check or by the engine
    #[error("Invalid position: {message}")]
    InvalidPosition { message: String },

    /// Engine process is not running, crashed, or stopped answering
    #[error("Engine unavailable: {message}")]
    EngineUnavailable { message: String },

    /// Engine printed something the protocol does not allow at this point
    #[error("Engine protocol error: {message}")]
    Protocol { message: String },

    /// Strength parameters may only be applied once
    #[error("Engine session is already configured")]
    AlreadyConfigured,

    /// Pipe I/O failure
    #[error("Engine I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid_position(message: impl Into<String>) -> Self {
        Self::InvalidPosition {
            message: message.into(),
        }
    }

    pub(crate) fn unavailable(message: impl Into<String>) -> Self {
        Self::EngineUnavailable {
            message: message.into(),
        }
    }

    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Whether this error means the engine process can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::EngineUnavailable { .. } | Self::Io(_))
    }
}

/// Result type alias for engine session operations
pub type EngineResult<T> = Result<T, EngineError>;

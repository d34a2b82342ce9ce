//! Error types for eventcal.

use thiserror::Error;

use crate::event::EventId;
use crate::user::UserId;

/// Errors that can occur in eventcal operations.
#[derive(Error, Debug)]
pub enum EventCalError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {0}")]
    EventNotFound(EventId),

    #[error("User not found: {0}")]
    UserNotFound(UserId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for eventcal operations.
pub type EventCalResult<T> = Result<T, EventCalError>;

use thiserror::Error;

use super::messages::MessageType;
use crate::room::errors::RoomError;

/// Reasons an inbound event is rejected. Each one becomes a private `error`
/// message to the connection that sent the event.
#[derive(Debug, Error)]
pub enum EventError {
    #[error(transparent)]
    Room(#[from] RoomError),

    #[error("Invalid payload for {event}: {reason}")]
    InvalidPayload { event: MessageType, reason: String },

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(MessageType),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),
}

impl EventError {
    pub fn invalid_payload(event: MessageType, reason: impl Into<String>) -> Self {
        EventError::InvalidPayload {
            event,
            reason: reason.into(),
        }
    }
}

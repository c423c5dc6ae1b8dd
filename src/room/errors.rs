use thiserror::Error;

/// Failures reported by the room registry. Anything not listed here is a
/// deliberate no-op and must not be surfaced to clients.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("Room not found")]
    NotFound(String),

    #[error("Player not found in room")]
    PlayerNotFound(String),

    #[error("Room is full")]
    RoomFull(String),
}

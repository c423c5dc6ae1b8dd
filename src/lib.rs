// Library crate for the arena shooter room server
// This file exposes the public API for integration tests

pub mod clock;
pub mod config;
pub mod room;
pub mod shared;
pub mod websockets;

// Re-export commonly used types for easier access in tests
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CleanupConfig, RoomLimits, ServerConfig};
pub use room::{InMemoryRoomRepository, Room, RoomError, RoomPlayer, RoomRepository};
pub use shared::{AppError, AppState};
pub use websockets::{
    ConnectionManager, EventError, InMemoryConnectionManager, MessageHandler, MessageType,
    WebSocketMessage, WebsocketReceiveHandler,
};

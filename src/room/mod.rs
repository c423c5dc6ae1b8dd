// Public API - what other modules can use
pub use errors::RoomError;
pub use handlers::{get_room, list_rooms};
pub use models::{Bug, Bullet, Position, Room, RoomPlayer, RoomStatus};
pub use repository::{InMemoryRoomRepository, RoomRepository};

// Internal modules
pub mod activity_tracker;
pub mod cleanup_task;
pub mod errors;
mod handlers;
pub mod models;
pub mod repository;
pub mod types;

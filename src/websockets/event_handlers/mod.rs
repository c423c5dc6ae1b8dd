pub mod bug_events;
pub mod player_events;
pub mod room_events;
pub mod shared;

pub use bug_events::BugEventHandlers;
pub use player_events::PlayerEventHandlers;
pub use room_events::RoomEventHandlers;

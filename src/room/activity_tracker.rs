use std::sync::Arc;
use tracing::{debug, instrument};

use super::errors::RoomError;
use super::repository::RoomRepository;

/// Service for keeping rooms and players alive between state-changing events
pub struct ActivityTracker {
    room_repository: Arc<dyn RoomRepository>,
}

impl ActivityTracker {
    /// Creates a new activity tracker with the given room repository
    pub fn new(room_repository: Arc<dyn RoomRepository>) -> Self {
        Self { room_repository }
    }

    /// Records that `player_id` is still present in `room_id`. Refreshes the room's
    /// `updated_at` and the player's `last_active_at` without any other change.
    #[instrument(skip(self))]
    pub fn record_activity(&self, room_id: &str, player_id: &str) -> Result<(), RoomError> {
        debug!(room_id = %room_id, player_id = %player_id, "Recording player activity");
        self.room_repository.record_activity(room_id, player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::config::RoomLimits;
    use crate::room::models::RoomPlayer;
    use crate::room::repository::InMemoryRoomRepository;
    use std::time::Duration;

    #[test]
    fn test_record_activity_updates_timestamps() {
        let clock = Arc::new(ManualClock::default());
        let repo = Arc::new(InMemoryRoomRepository::with_config(
            RoomLimits::default(),
            clock.clone(),
        ));
        let tracker = ActivityTracker::new(repo.clone());
        let room = repo.create_room("arena", RoomPlayer::new("alice"), None);

        clock.advance(Duration::from_secs(10));
        tracker.record_activity("arena", "alice").unwrap();

        let updated_room = repo.find_room("arena").unwrap();
        assert!(
            updated_room.updated_at > room.updated_at,
            "Room timestamp should be updated"
        );
        assert_eq!(
            updated_room.player("alice").unwrap().last_active_at,
            Some(clock.now())
        );
    }

    #[test]
    fn test_record_activity_unknown_player_still_touches_room() {
        let clock = Arc::new(ManualClock::default());
        let repo = Arc::new(InMemoryRoomRepository::with_config(
            RoomLimits::default(),
            clock.clone(),
        ));
        let tracker = ActivityTracker::new(repo.clone());
        repo.create_room("arena", RoomPlayer::new("alice"), None);

        clock.advance(Duration::from_secs(10));
        tracker.record_activity("arena", "ghost").unwrap();

        let room = repo.find_room("arena").unwrap();
        assert_eq!(room.updated_at, clock.now());
        assert_eq!(room.player_count(), 1);
    }

    #[test]
    fn test_record_activity_nonexistent_room() {
        let repo = Arc::new(InMemoryRoomRepository::new());
        let tracker = ActivityTracker::new(repo);

        let result = tracker.record_activity("nonexistent-room", "alice");

        assert!(matches!(result.unwrap_err(), RoomError::NotFound(_)));
    }
}

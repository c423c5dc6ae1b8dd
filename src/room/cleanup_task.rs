use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use super::repository::RoomRepository;
use crate::clock::Clock;
use crate::config::CleanupConfig;
use crate::websockets::{
    connection_manager::ConnectionManager, event_handlers::shared::MessageBroadcaster,
    messages::WebSocketMessage,
};

/// Starts the background liveness sweeper. Evicts silent players and drops
/// abandoned rooms, each on its own interval, until the task is aborted.
#[instrument(skip_all)]
pub async fn start_cleanup_task(
    room_repository: Arc<dyn RoomRepository>,
    connection_manager: Arc<dyn ConnectionManager>,
    clock: Arc<dyn Clock>,
    config: CleanupConfig,
) {
    info!(
        player_sweep_interval_secs = config.player_sweep_interval.as_secs(),
        player_timeout_secs = config.player_timeout.as_secs(),
        room_sweep_interval_secs = config.room_sweep_interval.as_secs(),
        room_timeout_secs = config.room_timeout.as_secs(),
        "Starting liveness sweeper"
    );

    let mut player_interval = interval(config.player_sweep_interval);
    let mut room_interval = interval(config.room_sweep_interval);
    player_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    room_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = player_interval.tick() => {
                let evicted = sweep_inactive_players(
                    &room_repository,
                    &connection_manager,
                    clock.now(),
                    config.player_timeout,
                )
                .await;
                debug!(evicted = evicted, "Player sweep completed");
            }
            _ = room_interval.tick() => {
                let removed = sweep_inactive_rooms(&room_repository, clock.now(), config.room_timeout);
                debug!(removed = removed, "Room sweep completed");
            }
        }
    }
}

/// Evicts every player silent for longer than `timeout` and tells the rest of
/// the room. A room that fails to sweep is skipped, never the whole pass.
/// Returns the number of players evicted.
pub async fn sweep_inactive_players(
    room_repository: &Arc<dyn RoomRepository>,
    connection_manager: &Arc<dyn ConnectionManager>,
    now: DateTime<Utc>,
    timeout: Duration,
) -> usize {
    let mut evicted = 0;

    for room_id in room_repository.room_ids() {
        let eviction = match room_repository.evict_inactive_players(&room_id, now, timeout) {
            Ok(eviction) => eviction,
            Err(e) => {
                // Usually a room deleted between listing and locking
                warn!(room_id = %room_id, error = %e, "Skipping room during player sweep");
                continue;
            }
        };

        for player_id in eviction.removed {
            info!(room_id = %room_id, player_id = %player_id, "Player timed out");
            MessageBroadcaster::broadcast_to_room(
                connection_manager,
                &room_id,
                &WebSocketMessage::player_left(eviction.room.clone(), player_id),
            )
            .await;
            evicted += 1;
        }
    }

    evicted
}

/// Drops rooms nobody has touched for `max_inactive`. Returns how many went.
pub fn sweep_inactive_rooms(
    room_repository: &Arc<dyn RoomRepository>,
    now: DateTime<Utc>,
    max_inactive: Duration,
) -> usize {
    let removed = room_repository.sweep_inactive_rooms(now, max_inactive);
    for room_id in &removed {
        info!(room_id = %room_id, "Deleted inactive room");
    }
    removed.len()
}

use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    room::{
        activity_tracker::ActivityTracker, models::RoomStatus, repository::RoomRepository,
    },
    websockets::{
        connection_manager::ConnectionManager,
        errors::EventError,
        messages::{JoinRoomPayload, PlayerRefPayload, RoomRefPayload, WebSocketMessage},
    },
};

use super::shared::MessageBroadcaster;

/// Membership and round lifecycle: join, leave, heartbeat, game over, restart
pub struct RoomEventHandlers {
    room_repository: Arc<dyn RoomRepository>,
    activity_tracker: Arc<ActivityTracker>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl RoomEventHandlers {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        activity_tracker: Arc<ActivityTracker>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_repository,
            activity_tracker,
            connection_manager,
        }
    }

    pub async fn handle_join(
        &self,
        connection_id: &str,
        payload: JoinRoomPayload,
    ) -> Result<(), EventError> {
        let JoinRoomPayload { room_id, player } = payload;
        debug!(room_id = %room_id, player_id = %player.id, "Handling join request");

        let outcome = self.room_repository.join_room(&room_id, player.clone())?;
        let room = outcome.room;
        let member = room.player(&player.id).cloned().unwrap_or(player);

        self.connection_manager
            .join_group(&room_id, connection_id)
            .await;

        MessageBroadcaster::send_to_connection(
            &self.connection_manager,
            connection_id,
            &WebSocketMessage::joined_room(room.clone(), member.clone()),
        )
        .await;

        info!(
            room_id = %room_id,
            player_id = %member.id,
            created = outcome.created,
            player_count = room.player_count(),
            "Player joined room"
        );

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::player_joined(room, member),
        )
        .await;

        Ok(())
    }

    pub async fn handle_leave(
        &self,
        connection_id: &str,
        payload: PlayerRefPayload,
    ) -> Result<(), EventError> {
        let PlayerRefPayload { room_id, player_id } = payload;

        let room = self
            .room_repository
            .remove_player_from_room(&room_id, &player_id)?;

        self.connection_manager
            .leave_group(&room_id, connection_id)
            .await;

        info!(
            room_id = %room_id,
            player_id = %player_id,
            room_deleted = room.is_none(),
            "Player left room"
        );

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::player_left(room, player_id),
        )
        .await;

        Ok(())
    }

    /// Keeps the room and player alive. Never answers, not even with an error.
    pub async fn handle_heartbeat(&self, payload: PlayerRefPayload) -> Result<(), EventError> {
        if let Err(e) = self
            .activity_tracker
            .record_activity(&payload.room_id, &payload.player_id)
        {
            debug!(room_id = %payload.room_id, error = %e, "Heartbeat ignored");
        }
        Ok(())
    }

    pub async fn handle_game_over(&self, payload: RoomRefPayload) -> Result<(), EventError> {
        let room = self
            .room_repository
            .set_room_status(&payload.room_id, RoomStatus::Over)?;

        info!(room_id = %payload.room_id, score = room.score, "Game over");

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &payload.room_id,
            &WebSocketMessage::game_over(room),
        )
        .await;

        Ok(())
    }

    pub async fn handle_restart(&self, payload: RoomRefPayload) -> Result<(), EventError> {
        let room = self.room_repository.restart_room(&payload.room_id)?;

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &payload.room_id,
            &WebSocketMessage::game_restarted(room),
        )
        .await;

        Ok(())
    }
}

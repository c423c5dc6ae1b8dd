use std::sync::Arc;

use crate::{
    room::repository::RoomRepository,
    websockets::{
        connection_manager::ConnectionManager,
        errors::EventError,
        messages::{FireBulletPayload, PlayerMovePayload, UpdateBulletsPayload, WebSocketMessage},
    },
};

use super::shared::MessageBroadcaster;

/// High-frequency player updates. Broadcasts carry only the delta, not the room.
pub struct PlayerEventHandlers {
    room_repository: Arc<dyn RoomRepository>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl PlayerEventHandlers {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_repository,
            connection_manager,
        }
    }

    pub async fn handle_move(&self, payload: PlayerMovePayload) -> Result<(), EventError> {
        let PlayerMovePayload {
            room_id,
            player_id,
            position,
        } = payload;

        self.room_repository
            .update_player_position(&room_id, &player_id, position)?;

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::player_moved(player_id, position),
        )
        .await;

        Ok(())
    }

    pub async fn handle_fire_bullet(&self, payload: FireBulletPayload) -> Result<(), EventError> {
        let FireBulletPayload {
            room_id,
            player_id,
            bullet,
        } = payload;

        self.room_repository
            .add_bullet_to_player(&room_id, &player_id, bullet.clone())?;

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::bullet_fired(player_id, bullet),
        )
        .await;

        Ok(())
    }

    pub async fn handle_update_bullets(
        &self,
        payload: UpdateBulletsPayload,
    ) -> Result<(), EventError> {
        let UpdateBulletsPayload {
            room_id,
            player_id,
            bullets,
        } = payload;

        self.room_repository
            .update_player_bullets(&room_id, &player_id, bullets.clone())?;

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::bullets_updated(player_id, bullets),
        )
        .await;

        Ok(())
    }
}

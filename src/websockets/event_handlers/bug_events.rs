use std::sync::Arc;
use tracing::{debug, info};

use crate::{
    room::{
        models::{MAX_BUG_LEVEL, MIN_BUG_LEVEL},
        repository::RoomRepository,
    },
    websockets::{
        connection_manager::ConnectionManager,
        errors::EventError,
        messages::{
            AddBugPayload, KillBugPayload, MessageType, UpdateBugHealthPayload, WebSocketMessage,
        },
    },
};

use super::shared::MessageBroadcaster;

/// Enemy lifecycle: spawn, kill, health changes
pub struct BugEventHandlers {
    room_repository: Arc<dyn RoomRepository>,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl BugEventHandlers {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        Self {
            room_repository,
            connection_manager,
        }
    }

    pub async fn handle_add_bug(&self, payload: AddBugPayload) -> Result<(), EventError> {
        let AddBugPayload { room_id, bug } = payload;

        if !bug.has_valid_level() {
            return Err(EventError::invalid_payload(
                MessageType::AddBug,
                format!("bug level must be between {MIN_BUG_LEVEL} and {MAX_BUG_LEVEL}"),
            ));
        }

        let room = self.room_repository.add_bug_to_room(&room_id, bug.clone())?;
        debug!(room_id = %room_id, bug_id = %bug.id, bug_count = room.bugs.len(), "Bug added");

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::bug_added(room, bug),
        )
        .await;

        Ok(())
    }

    pub async fn handle_kill_bug(&self, payload: KillBugPayload) -> Result<(), EventError> {
        let KillBugPayload {
            room_id,
            bug_id,
            player_id,
        } = payload;

        let room = self
            .room_repository
            .kill_bug(&room_id, &bug_id, &player_id)?;

        info!(
            room_id = %room_id,
            bug_id = %bug_id,
            player_id = %player_id,
            score = room.score,
            "Bug killed"
        );

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::bug_killed(room, bug_id, player_id),
        )
        .await;

        Ok(())
    }

    pub async fn handle_update_bug_health(
        &self,
        payload: UpdateBugHealthPayload,
    ) -> Result<(), EventError> {
        let UpdateBugHealthPayload {
            room_id,
            bug_id,
            health,
        } = payload;

        let room = self
            .room_repository
            .update_bug_health(&room_id, &bug_id, health)?;

        MessageBroadcaster::broadcast_to_room(
            &self.connection_manager,
            &room_id,
            &WebSocketMessage::bug_health_updated(room, bug_id, health),
        )
        .await;

        Ok(())
    }
}

use crate::websockets::{connection_manager::ConnectionManager, messages::WebSocketMessage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Serialises outbound messages and hands them to the transport. Sending is
/// fire-and-forget: a message that cannot be encoded is logged and dropped.
pub struct MessageBroadcaster;

impl MessageBroadcaster {
    pub async fn broadcast_to_room(
        connection_manager: &Arc<dyn ConnectionManager>,
        room_id: &str,
        message: &WebSocketMessage,
    ) {
        let Some(message_json) = encode(message) else {
            return;
        };
        connection_manager
            .broadcast_to_group(room_id, &message_json)
            .await;
        debug!(room_id = %room_id, message_type = %message.message_type, "Broadcast to room");
    }

    pub async fn send_to_connection(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection_id: &str,
        message: &WebSocketMessage,
    ) {
        let Some(message_json) = encode(message) else {
            return;
        };
        connection_manager
            .send_to_connection(connection_id, &message_json)
            .await;
    }

    /// Reports a failure privately to the connection that caused it
    pub async fn send_error(
        connection_manager: &Arc<dyn ConnectionManager>,
        connection_id: &str,
        message: String,
    ) {
        Self::send_to_connection(
            connection_manager,
            connection_id,
            &WebSocketMessage::error(message),
        )
        .await;
    }
}

fn encode(message: &WebSocketMessage) -> Option<String> {
    serde_json::to_string(message)
        .map_err(|e| {
            warn!(message_type = %message.message_type, error = %e, "Failed to serialize message");
        })
        .ok()
}

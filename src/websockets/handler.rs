use async_trait::async_trait;
use axum::{
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::room::{activity_tracker::ActivityTracker, repository::RoomRepository};
use crate::shared::AppState;
use crate::websockets::{
    connection_manager::ConnectionManager,
    errors::EventError,
    event_handlers::{shared::MessageBroadcaster, BugEventHandlers, PlayerEventHandlers, RoomEventHandlers},
    messages::{MessageType, WebSocketMessage},
};

use super::socket::{Connection, MessageHandler};

/// Event gateway: turns each inbound message into one registry call and its
/// broadcast. Failures go back privately to the sender.
pub struct WebsocketReceiveHandler {
    room_handlers: RoomEventHandlers,
    bug_handlers: BugEventHandlers,
    player_handlers: PlayerEventHandlers,
    connection_manager: Arc<dyn ConnectionManager>,
}

impl WebsocketReceiveHandler {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_manager: Arc<dyn ConnectionManager>,
    ) -> Self {
        let activity_tracker = Arc::new(ActivityTracker::new(Arc::clone(&room_repository)));

        Self {
            room_handlers: RoomEventHandlers::new(
                Arc::clone(&room_repository),
                activity_tracker,
                Arc::clone(&connection_manager),
            ),
            bug_handlers: BugEventHandlers::new(
                Arc::clone(&room_repository),
                Arc::clone(&connection_manager),
            ),
            player_handlers: PlayerEventHandlers::new(
                Arc::clone(&room_repository),
                Arc::clone(&connection_manager),
            ),
            connection_manager,
        }
    }

    async fn dispatch(&self, connection_id: &str, message: WebSocketMessage) -> Result<(), EventError> {
        let event = message.message_type;
        match event {
            MessageType::JoinRoom => {
                self.room_handlers
                    .handle_join(connection_id, decode(&message)?)
                    .await
            }
            MessageType::LeaveRoom => {
                self.room_handlers
                    .handle_leave(connection_id, decode(&message)?)
                    .await
            }
            MessageType::Heartbeat => self.room_handlers.handle_heartbeat(decode(&message)?).await,
            MessageType::GameOver => self.room_handlers.handle_game_over(decode(&message)?).await,
            MessageType::RestartGame => self.room_handlers.handle_restart(decode(&message)?).await,
            MessageType::AddBug => self.bug_handlers.handle_add_bug(decode(&message)?).await,
            MessageType::KillBug => self.bug_handlers.handle_kill_bug(decode(&message)?).await,
            MessageType::UpdateBugHealth => {
                self.bug_handlers
                    .handle_update_bug_health(decode(&message)?)
                    .await
            }
            MessageType::PlayerMove => self.player_handlers.handle_move(decode(&message)?).await,
            MessageType::FireBullet => {
                self.player_handlers
                    .handle_fire_bullet(decode(&message)?)
                    .await
            }
            MessageType::UpdateBullets => {
                self.player_handlers
                    .handle_update_bullets(decode(&message)?)
                    .await
            }
            MessageType::JoinedRoom
            | MessageType::PlayerJoined
            | MessageType::PlayerLeft
            | MessageType::BugAdded
            | MessageType::BugKilled
            | MessageType::BugHealthUpdated
            | MessageType::PlayerMoved
            | MessageType::BulletFired
            | MessageType::BulletsUpdated
            | MessageType::GameRestarted
            | MessageType::Error => Err(EventError::UnsupportedEvent(event)),
        }
    }
}

fn decode<T: DeserializeOwned>(message: &WebSocketMessage) -> Result<T, EventError> {
    message
        .payload_as()
        .map_err(|e| EventError::invalid_payload(message.message_type, e.to_string()))
}

#[async_trait]
impl MessageHandler for WebsocketReceiveHandler {
    async fn handle_message(&self, connection_id: &str, message: String) {
        debug!(connection_id = %connection_id, message = %message, "Received message");

        let result = match serde_json::from_str::<WebSocketMessage>(&message) {
            Ok(ws_message) => self.dispatch(connection_id, ws_message).await,
            Err(e) => Err(EventError::MalformedMessage(e.to_string())),
        };

        if let Err(e) = result {
            debug!(connection_id = %connection_id, error = %e, "Rejected inbound event");
            MessageBroadcaster::send_error(&self.connection_manager, connection_id, e.to_string())
                .await;
        }
    }
}

/// WebSocket endpoint
/// GET /ws
pub async fn websocket_handler(ws: WebSocketUpgrade, State(app_state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_websocket_connection(socket, app_state))
}

/// Handle the upgraded WebSocket connection
async fn handle_websocket_connection(socket: axum::extract::ws::WebSocket, app_state: AppState) {
    let connection_id = Uuid::new_v4().to_string();
    info!(connection_id = %connection_id, "WebSocket connection established");

    // Create the outbound channel (app -> client)
    let (outbound_sender, outbound_receiver) = mpsc::unbounded_channel::<String>();

    app_state
        .connection_manager
        .add_connection(connection_id.clone(), outbound_sender)
        .await;

    let connection = Connection::new(
        connection_id.clone(),
        Box::new(socket),
        outbound_receiver,
        app_state.receive_handler.clone(),
    );

    // Run the connection until disconnect
    match connection.run().await {
        Ok(()) => {
            info!(connection_id = %connection_id, "WebSocket connection closed cleanly");
        }
        Err(e) => {
            warn!(connection_id = %connection_id, error = ?e, "WebSocket connection error");
        }
    }

    // Players are not removed here; the sweeper evicts them once they go quiet.
    app_state
        .connection_manager
        .remove_connection(&connection_id)
        .await;
}

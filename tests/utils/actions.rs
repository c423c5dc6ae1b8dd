//! Client-side actions, each delivered through the gateway as one text frame
#![allow(dead_code)]

use serde_json::{json, Value};

use shooter::websockets::{MessageHandler, MessageType, WebSocketMessage};

use super::setup::{TestSetup, ROOM_ID};

// ============================================================================
// Action Helpers
// ============================================================================

impl TestSetup {
    /// Deliver a raw frame as if it arrived on `connection_id`
    pub async fn send_raw(&self, connection_id: &str, frame: &str) {
        self.input_handler
            .handle_message(connection_id, frame.to_string())
            .await;
    }

    pub async fn send_message(&self, connection_id: &str, message: WebSocketMessage) {
        let message_json = serde_json::to_string(&message).unwrap();
        self.send_raw(connection_id, &message_json).await;
    }

    pub async fn send(&self, connection_id: &str, message_type: MessageType, payload: Value) {
        self.send_message(connection_id, WebSocketMessage::new(message_type, payload))
            .await;
    }

    /// Clear all recorded messages
    pub async fn clear_messages(&self) {
        self.mock_conn_manager.clear_messages().await;
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn join(&self, player: &str) {
        self.join_room(player, ROOM_ID).await;
    }

    pub async fn join_room(&self, player: &str, room_id: &str) {
        self.send(
            player,
            MessageType::JoinRoom,
            json!({ "roomId": room_id, "player": { "id": player, "position": { "x": 0.0, "y": 0.0 } } }),
        )
        .await;
    }

    pub async fn leave(&self, player: &str) {
        self.send(
            player,
            MessageType::LeaveRoom,
            json!({ "roomId": ROOM_ID, "playerId": player }),
        )
        .await;
    }

    pub async fn heartbeat(&self, player: &str) {
        self.heartbeat_in(player, ROOM_ID).await;
    }

    pub async fn heartbeat_in(&self, player: &str, room_id: &str) {
        self.send(
            player,
            MessageType::Heartbeat,
            json!({ "roomId": room_id, "playerId": player }),
        )
        .await;
    }

    pub async fn add_bug(&self, player: &str, bug_id: &str, level: u8) {
        self.send(
            player,
            MessageType::AddBug,
            json!({ "roomId": ROOM_ID, "bug": { "id": bug_id, "health": 100, "level": level } }),
        )
        .await;
    }

    pub async fn kill_bug(&self, player: &str, bug_id: &str) {
        self.send(
            player,
            MessageType::KillBug,
            json!({ "roomId": ROOM_ID, "bugId": bug_id, "playerId": player }),
        )
        .await;
    }

    pub async fn update_bug_health(&self, player: &str, bug_id: &str, health: i64) {
        self.send(
            player,
            MessageType::UpdateBugHealth,
            json!({ "roomId": ROOM_ID, "bugId": bug_id, "health": health }),
        )
        .await;
    }

    pub async fn move_player(&self, player: &str, x: f64, y: f64) {
        self.send(
            player,
            MessageType::PlayerMove,
            json!({ "roomId": ROOM_ID, "playerId": player, "position": { "x": x, "y": y } }),
        )
        .await;
    }

    pub async fn fire_bullet(&self, player: &str, x: f64, y: f64) {
        self.send(
            player,
            MessageType::FireBullet,
            json!({
                "roomId": ROOM_ID,
                "playerId": player,
                "bullet": { "position": { "x": x, "y": y }, "direction": { "x": 0.0, "y": -1.0 } }
            }),
        )
        .await;
    }

    pub async fn update_bullets(&self, player: &str, bullets: Value) {
        self.send(
            player,
            MessageType::UpdateBullets,
            json!({ "roomId": ROOM_ID, "playerId": player, "bullets": bullets }),
        )
        .await;
    }

    pub async fn game_over(&self, player: &str) {
        self.send(player, MessageType::GameOver, json!({ "roomId": ROOM_ID }))
            .await;
    }

    pub async fn restart(&self, player: &str) {
        self.send(player, MessageType::RestartGame, json!({ "roomId": ROOM_ID }))
            .await;
    }
}

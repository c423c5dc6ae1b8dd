use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

use crate::room::models::{Bug, Bullet, Position, Room, RoomPlayer};

/// Message types for WebSocket communication
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MessageType {
    // Client -> Server
    JoinRoom,
    LeaveRoom,
    Heartbeat,
    AddBug,
    KillBug,
    UpdateBugHealth,
    PlayerMove,
    FireBullet,
    UpdateBullets,
    RestartGame,

    // Both directions: clients declare it, the room hears it
    GameOver,

    // Server -> Client
    JoinedRoom,
    PlayerJoined,
    PlayerLeft,
    BugAdded,
    BugKilled,
    BugHealthUpdated,
    PlayerMoved,
    BulletFired,
    BulletsUpdated,
    GameRestarted,
    Error,
}

impl MessageType {
    /// Wire name of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::JoinRoom => "join-room",
            MessageType::LeaveRoom => "leave-room",
            MessageType::Heartbeat => "heartbeat",
            MessageType::AddBug => "add-bug",
            MessageType::KillBug => "kill-bug",
            MessageType::UpdateBugHealth => "update-bug-health",
            MessageType::PlayerMove => "player-move",
            MessageType::FireBullet => "fire-bullet",
            MessageType::UpdateBullets => "update-bullets",
            MessageType::RestartGame => "restart-game",
            MessageType::GameOver => "game-over",
            MessageType::JoinedRoom => "joined-room",
            MessageType::PlayerJoined => "player-joined",
            MessageType::PlayerLeft => "player-left",
            MessageType::BugAdded => "bug-added",
            MessageType::BugKilled => "bug-killed",
            MessageType::BugHealthUpdated => "bug-health-updated",
            MessageType::PlayerMoved => "player-moved",
            MessageType::BulletFired => "bullet-fired",
            MessageType::BulletsUpdated => "bullets-updated",
            MessageType::GameRestarted => "game-restarted",
            MessageType::Error => "error",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Base structure for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: MessageType,
    #[serde(default)]
    pub payload: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<WebSocketMessageMeta>,
}

/// Client-to-Server message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub player: RoomPlayer,
}

/// Payload of leave-room and heartbeat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRefPayload {
    pub room_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddBugPayload {
    pub room_id: String,
    pub bug: Bug,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillBugPayload {
    pub room_id: String,
    pub bug_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBugHealthPayload {
    pub room_id: String,
    pub bug_id: String,
    pub health: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovePayload {
    pub room_id: String,
    pub player_id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FireBulletPayload {
    pub room_id: String,
    pub player_id: String,
    pub bullet: Bullet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBulletsPayload {
    pub room_id: String,
    pub player_id: String,
    pub bullets: Vec<Bullet>,
}

/// Payload of game-over and restart-game
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRefPayload {
    pub room_id: String,
}

/// Server-to-Client message payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomPlayerPayload {
    pub room: Room,
    pub player: RoomPlayer,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerLeftPayload {
    pub room: Option<Room>,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BugAddedPayload {
    pub room: Room,
    pub bug: Bug,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugKilledPayload {
    pub room: Room,
    pub bug_id: String,
    pub player_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BugHealthUpdatedPayload {
    pub room: Room,
    pub bug_id: String,
    pub health: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMovedPayload {
    pub player_id: String,
    pub position: Position,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletFiredPayload {
    pub player_id: String,
    pub bullet: Bullet,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletsUpdatedPayload {
    pub player_id: String,
    pub bullets: Vec<Bullet>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomSnapshotPayload {
    pub room: Room,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

/// Helper functions for creating messages
impl WebSocketMessage {
    pub fn new(message_type: MessageType, payload: serde_json::Value) -> Self {
        Self {
            message_type,
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    fn from_payload(message_type: MessageType, payload: impl Serialize) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or_else(|e| {
            warn!(message_type = %message_type, error = %e, "Failed to serialize payload");
            serde_json::Value::Null
        });
        Self::new(message_type, payload)
    }

    /// Decodes the payload into the structure expected for this message type
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.payload)
    }

    /// Create a JOINED_ROOM message (private acknowledgement to the joiner)
    pub fn joined_room(room: Room, player: RoomPlayer) -> Self {
        Self::from_payload(MessageType::JoinedRoom, RoomPlayerPayload { room, player })
    }

    pub fn player_joined(room: Room, player: RoomPlayer) -> Self {
        Self::from_payload(MessageType::PlayerJoined, RoomPlayerPayload { room, player })
    }

    /// `room` is `None` when the departure deleted the room
    pub fn player_left(room: Option<Room>, player_id: String) -> Self {
        Self::from_payload(MessageType::PlayerLeft, PlayerLeftPayload { room, player_id })
    }

    pub fn bug_added(room: Room, bug: Bug) -> Self {
        Self::from_payload(MessageType::BugAdded, BugAddedPayload { room, bug })
    }

    pub fn bug_killed(room: Room, bug_id: String, player_id: String) -> Self {
        Self::from_payload(
            MessageType::BugKilled,
            BugKilledPayload {
                room,
                bug_id,
                player_id,
            },
        )
    }

    pub fn bug_health_updated(room: Room, bug_id: String, health: i64) -> Self {
        Self::from_payload(
            MessageType::BugHealthUpdated,
            BugHealthUpdatedPayload {
                room,
                bug_id,
                health,
            },
        )
    }

    pub fn player_moved(player_id: String, position: Position) -> Self {
        Self::from_payload(
            MessageType::PlayerMoved,
            PlayerMovedPayload {
                player_id,
                position,
            },
        )
    }

    pub fn bullet_fired(player_id: String, bullet: Bullet) -> Self {
        Self::from_payload(MessageType::BulletFired, BulletFiredPayload { player_id, bullet })
    }

    pub fn bullets_updated(player_id: String, bullets: Vec<Bullet>) -> Self {
        Self::from_payload(
            MessageType::BulletsUpdated,
            BulletsUpdatedPayload { player_id, bullets },
        )
    }

    pub fn game_over(room: Room) -> Self {
        Self::from_payload(MessageType::GameOver, RoomSnapshotPayload { room })
    }

    pub fn game_restarted(room: Room) -> Self {
        Self::from_payload(MessageType::GameRestarted, RoomSnapshotPayload { room })
    }

    /// Create an ERROR message
    pub fn error(message: String) -> Self {
        Self::from_payload(MessageType::Error, ErrorPayload { message })
    }
}

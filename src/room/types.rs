use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Room, RoomStatus};

/// Lobby view of a room, served by GET /rooms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummary {
    pub id: String,
    pub player_count: usize,
    pub max_players: usize,
    pub bug_count: usize,
    pub score: u64,
    pub status: RoomStatus,
    pub updated_at: DateTime<Utc>,
}

impl RoomSummary {
    pub fn from_room(room: &Room, max_players: usize) -> Self {
        Self {
            id: room.id.clone(),
            player_count: room.player_count(),
            max_players,
            bug_count: room.bugs.len(),
            score: room.score,
            status: room.status,
            updated_at: room.updated_at,
        }
    }
}

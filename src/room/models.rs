use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lowest and highest point value a bug can carry
pub const MIN_BUG_LEVEL: u8 = 1;
pub const MAX_BUG_LEVEL: u8 = 4;

/// 2D coordinate in arena space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Whether a room's round is still running
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    #[default]
    Playing,
    Over,
}

/// Projectile owned by a player. Direction, speed and anything else the client
/// attaches are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub position: Position,
    #[serde(flatten)]
    pub motion: Map<String, Value>,
}

impl Bullet {
    pub fn at(position: Position) -> Self {
        Self {
            position,
            motion: Map::new(),
        }
    }
}

/// Enemy spawned into a room. Health is decided by clients; level is the score
/// awarded when it is killed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub id: String,
    pub health: i64,
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

impl Bug {
    pub fn new(id: impl Into<String>, health: i64, level: u8) -> Self {
        Self {
            id: id.into(),
            health,
            level,
            position: None,
        }
    }

    pub fn has_valid_level(&self) -> bool {
        (MIN_BUG_LEVEL..=MAX_BUG_LEVEL).contains(&self.level)
    }
}

/// Player as seen inside one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPlayer {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub last_active_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub bullets: Vec<Bullet>,
}

impl RoomPlayer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            position: Position::default(),
            last_active_at: None,
            bullets: Vec::new(),
        }
    }

    /// A player that never reported activity counts as inactive.
    pub fn is_inactive(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        match self.last_active_at {
            Some(last_active_at) => now - last_active_at > timeout,
            None => true,
        }
    }
}

/// A shared arena session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: String,
    pub players: Vec<RoomPlayer>,
    pub bugs: Vec<Bug>,
    pub max_bugs: usize,
    pub score: u64,
    pub status: RoomStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    /// Creates a playing room whose only member is `creator`
    pub fn new(
        id: impl Into<String>,
        creator: RoomPlayer,
        max_bugs: usize,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            players: vec![RoomPlayer::joining(creator, now)],
            bugs: Vec::new(),
            max_bugs,
            score: 0,
            status: RoomStatus::Playing,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&RoomPlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut RoomPlayer> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    pub fn bug(&self, bug_id: &str) -> Option<&Bug> {
        self.bugs.iter().find(|b| b.id == bug_id)
    }

    pub fn is_bug_capacity_reached(&self) -> bool {
        self.bugs.len() >= self.max_bugs
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }

    pub fn is_inactive(&self, now: DateTime<Utc>, max_inactive: chrono::Duration) -> bool {
        now - self.updated_at > max_inactive
    }
}

impl RoomPlayer {
    /// Normalises a player entering a room: fresh activity stamp, no bullets.
    pub(crate) fn joining(mut player: RoomPlayer, now: DateTime<Utc>) -> Self {
        player.last_active_at = Some(now);
        player.bullets.clear();
        player
    }
}

use std::{env, str::FromStr, time::Duration};

/// Maximum number of players allowed in a room
pub const MAX_ROOM_PLAYERS: usize = 4;
/// Bug capacity given to a room when the creator does not choose one
pub const DEFAULT_MAX_BUGS: usize = 30;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_PLAYER_TIMEOUT: Duration = Duration::from_secs(45);
pub const DEFAULT_ROOM_TIMEOUT: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_PLAYER_SWEEP_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_ROOM_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Capacity rules enforced by the room registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomLimits {
    pub max_players: usize,
    pub default_max_bugs: usize,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            max_players: MAX_ROOM_PLAYERS,
            default_max_bugs: DEFAULT_MAX_BUGS,
        }
    }
}

/// Configuration for the liveness sweeper
#[derive(Debug, Clone)]
pub struct CleanupConfig {
    /// How often inactive players are evicted
    pub player_sweep_interval: Duration,
    /// How long a player may stay silent before eviction
    pub player_timeout: Duration,
    /// How often inactive rooms are dropped
    pub room_sweep_interval: Duration,
    /// How long a room may go without mutation before it is dropped
    pub room_timeout: Duration,
}

impl Default for CleanupConfig {
    fn default() -> Self {
        Self {
            player_sweep_interval: DEFAULT_PLAYER_SWEEP_INTERVAL,
            player_timeout: DEFAULT_PLAYER_TIMEOUT,
            room_sweep_interval: DEFAULT_ROOM_SWEEP_INTERVAL,
            room_timeout: DEFAULT_ROOM_TIMEOUT,
        }
    }
}

/// Process-level configuration read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub limits: RoomLimits,
    pub cleanup: CleanupConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            allowed_origins: default_allowed_origins(),
            limits: RoomLimits::default(),
            cleanup: CleanupConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Builds the configuration from environment variables, falling back to defaults
    /// for anything missing or unparseable.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.allowed_origins);

        Self {
            port: parse_or(&lookup, "PORT", defaults.port),
            allowed_origins,
            limits: RoomLimits {
                max_players: parse_or(&lookup, "MAX_ROOM_PLAYERS", defaults.limits.max_players),
                default_max_bugs: parse_or(
                    &lookup,
                    "DEFAULT_MAX_BUGS",
                    defaults.limits.default_max_bugs,
                ),
            },
            cleanup: CleanupConfig {
                player_sweep_interval: secs_or(
                    &lookup,
                    "PLAYER_SWEEP_INTERVAL_SECS",
                    defaults.cleanup.player_sweep_interval,
                ),
                player_timeout: secs_or(
                    &lookup,
                    "PLAYER_TIMEOUT_SECS",
                    defaults.cleanup.player_timeout,
                ),
                room_sweep_interval: secs_or(
                    &lookup,
                    "ROOM_SWEEP_INTERVAL_SECS",
                    defaults.cleanup.room_sweep_interval,
                ),
                room_timeout: secs_or(&lookup, "ROOM_TIMEOUT_SECS", defaults.cleanup.room_timeout),
            },
        }
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
    ]
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

// Zero-length periods would make tokio's interval panic.
fn secs_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: Duration) -> Duration {
    lookup(key)
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}

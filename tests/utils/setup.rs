use std::sync::Arc;

use shooter::{
    clock::ManualClock,
    config::RoomLimits,
    room::repository::{InMemoryRoomRepository, RoomRepository},
    websockets::WebsocketReceiveHandler,
};

use super::mocks::MockConnectionManager;

pub const ROOM_ID: &str = "arena";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// Gateway wired to a real registry and a recording connection manager.
/// Each player talks over a connection whose id is the player's id.
pub struct TestSetup {
    pub repo: Arc<InMemoryRoomRepository>,
    pub clock: Arc<ManualClock>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub input_handler: WebsocketReceiveHandler,
    pub players: Vec<String>,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    limits: RoomLimits,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            limits: RoomLimits::default(),
        }
    }

    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_four_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "charlie", "david"])
    }

    pub fn with_max_bugs(mut self, max_bugs: usize) -> Self {
        self.limits.default_max_bugs = max_bugs;
        self
    }

    /// Joins every configured player to `ROOM_ID`, then forgets the join traffic
    pub async fn build(self) -> TestSetup {
        let clock = Arc::new(ManualClock::default());
        let repo = Arc::new(InMemoryRoomRepository::with_config(self.limits, clock.clone()));
        let mock_conn_manager = Arc::new(MockConnectionManager::new());

        let input_handler = WebsocketReceiveHandler::new(
            repo.clone() as Arc<dyn RoomRepository>,
            mock_conn_manager.clone(),
        );

        let setup = TestSetup {
            repo,
            clock,
            mock_conn_manager,
            input_handler,
            players: self.players,
        };

        for player in &setup.players {
            setup.join(player).await;
        }
        setup.clear_messages().await;

        setup
    }
}

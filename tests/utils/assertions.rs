//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use shooter::websockets::{MessageType, WebSocketMessage};

use super::setup::TestSetup;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    connections: Vec<&'a str>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for every player in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        let connections = setup.players.iter().map(String::as_str).collect();
        Self { setup, connections }
    }

    pub fn for_players(setup: &'a TestSetup, connections: Vec<&'a str>) -> Self {
        Self { setup, connections }
    }

    pub fn for_player(setup: &'a TestSetup, connection: &'a str) -> Self {
        Self::for_players(setup, vec![connection])
    }

    /// Assert that every connection received a message of this type next
    /// (consumes it) and that all of them saw the same payload
    pub async fn received_message_type(self, expected_type: MessageType) -> MessageContent {
        let mut messages = vec![];

        for connection in &self.connections {
            let message = self
                .setup
                .mock_conn_manager
                .consume_message_for(connection)
                .await
                .unwrap_or_else(|| panic!("{} should have received {}", connection, expected_type));

            let msg: WebSocketMessage = serde_json::from_str(&message).unwrap();
            assert_eq!(
                msg.message_type, expected_type,
                "{} received wrong message type",
                connection
            );
            messages.push(msg);
        }

        let first_payload = &messages[0].payload;
        for (i, msg) in messages.iter().enumerate().skip(1) {
            assert_eq!(
                &msg.payload, first_payload,
                "{} payload differs from {}",
                self.connections[i], self.connections[0]
            );
        }

        MessageContent {
            payload: messages[0].payload.clone(),
        }
    }

    /// Assert that the connections have nothing left in their queues
    pub async fn received_no_messages(self) {
        for connection in &self.connections {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection)
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                connection,
                messages
            );
        }
    }

    /// Assert the queued message types, in order, without consuming them
    pub async fn received_message_sequence(self, expected_types: Vec<MessageType>) {
        for connection in &self.connections {
            let queued = self
                .setup
                .mock_conn_manager
                .get_messages_for(connection)
                .await;
            let actual: Vec<MessageType> = queued
                .iter()
                .map(|raw| serde_json::from_str::<WebSocketMessage>(raw).unwrap().message_type)
                .collect();
            assert_eq!(actual, expected_types, "{} received wrong sequence", connection);
        }
    }
}

// ============================================================================
// Message Content Assertions
// ============================================================================

pub struct MessageContent {
    payload: Value,
}

impl MessageContent {
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn with_player_id(self, expected: &str) -> Self {
        assert_eq!(self.payload["playerId"], expected);
        self
    }

    pub fn with_joined_player(self, expected: &str) -> Self {
        assert_eq!(self.payload["player"]["id"], expected);
        self
    }

    pub fn with_room_player_count(self, expected: usize) -> Self {
        let players = self.payload["room"]["players"]
            .as_array()
            .expect("payload should carry the room");
        assert_eq!(players.len(), expected);
        self
    }

    pub fn with_score(self, expected: u64) -> Self {
        assert_eq!(self.payload["room"]["score"], expected);
        self
    }

    pub fn with_status(self, expected: &str) -> Self {
        assert_eq!(self.payload["room"]["status"], expected);
        self
    }

    pub fn with_deleted_room(self) -> Self {
        assert!(self.payload["room"].is_null(), "room should be gone");
        self
    }

    pub fn with_error_containing(self, expected: &str) -> Self {
        let message = self.payload["message"]
            .as_str()
            .expect("error payload should carry a message");
        assert!(
            message.contains(expected),
            "error {:?} should mention {:?}",
            message,
            expected
        );
        self
    }
}

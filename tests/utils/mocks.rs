use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};

use shooter::websockets::ConnectionManager;

// ============================================================================
// Mock Infrastructure
// ============================================================================

/// Records every frame that would have been written to each connection
#[derive(Clone, Default)]
pub struct MockConnectionManager {
    sent_messages: Arc<RwLock<HashMap<String, Vec<String>>>>,
    groups: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

#[allow(dead_code)]
impl MockConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_messages_for(&self, connection_id: &str) -> Vec<String> {
        self.sent_messages
            .read()
            .await
            .get(connection_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Pops the oldest message queued for a connection
    pub async fn consume_message_for(&self, connection_id: &str) -> Option<String> {
        let mut sent = self.sent_messages.write().await;
        let queue = sent.get_mut(connection_id)?;
        if queue.is_empty() {
            None
        } else {
            Some(queue.remove(0))
        }
    }

    pub async fn clear_messages(&self) {
        self.sent_messages.write().await.clear();
    }

    pub async fn is_in_group(&self, room_id: &str, connection_id: &str) -> bool {
        self.groups
            .read()
            .await
            .get(room_id)
            .is_some_and(|members| members.contains(connection_id))
    }
}

#[async_trait]
impl ConnectionManager for MockConnectionManager {
    async fn add_connection(&self, _connection_id: String, _sender: mpsc::UnboundedSender<String>) {}

    async fn remove_connection(&self, connection_id: &str) {
        let mut groups = self.groups.write().await;
        for members in groups.values_mut() {
            members.remove(connection_id);
        }
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        self.sent_messages
            .write()
            .await
            .entry(connection_id.to_string())
            .or_default()
            .push(message.to_string());
    }

    async fn join_group(&self, room_id: &str, connection_id: &str) {
        self.groups
            .write()
            .await
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_group(&self, room_id: &str, connection_id: &str) {
        if let Some(members) = self.groups.write().await.get_mut(room_id) {
            members.remove(connection_id);
        }
    }

    async fn broadcast_to_group(&self, room_id: &str, message: &str) {
        let members: Vec<String> = self
            .groups
            .read()
            .await
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default();

        for connection_id in members {
            self.send_to_connection(&connection_id, message).await;
        }
    }
}

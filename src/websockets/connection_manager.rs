use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tracing::debug;

/// Pub/sub view of the transport: private sends to one connection and
/// broadcasts to every connection subscribed to a room group.
#[async_trait]
pub trait ConnectionManager: Send + Sync {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>);

    /// Drops the connection and all of its group memberships
    async fn remove_connection(&self, connection_id: &str);

    async fn send_to_connection(&self, connection_id: &str, message: &str);

    async fn join_group(&self, room_id: &str, connection_id: &str);

    async fn leave_group(&self, room_id: &str, connection_id: &str);

    async fn broadcast_to_group(&self, room_id: &str, message: &str);
}

pub struct InMemoryConnectionManager {
    // connection id -> sender
    connections: Arc<RwLock<HashMap<String, mpsc::UnboundedSender<String>>>>,
    // room id -> subscribed connection ids
    groups: Arc<RwLock<HashMap<String, HashSet<String>>>>,
}

impl Default for InMemoryConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
            groups: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn group_members(&self, room_id: &str) -> Vec<String> {
        self.groups
            .read()
            .await
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ConnectionManager for InMemoryConnectionManager {
    async fn add_connection(&self, connection_id: String, sender: mpsc::UnboundedSender<String>) {
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, sender);
    }

    async fn remove_connection(&self, connection_id: &str) {
        self.connections.write().await.remove(connection_id);

        let mut groups = self.groups.write().await;
        groups.retain(|_, members| {
            members.remove(connection_id);
            !members.is_empty()
        });
    }

    async fn send_to_connection(&self, connection_id: &str, message: &str) {
        let connections = self.connections.read().await;
        if let Some(sender) = connections.get(connection_id) {
            let _ = sender.send(message.to_string());
        }
    }

    async fn join_group(&self, room_id: &str, connection_id: &str) {
        let mut groups = self.groups.write().await;
        groups
            .entry(room_id.to_string())
            .or_default()
            .insert(connection_id.to_string());
    }

    async fn leave_group(&self, room_id: &str, connection_id: &str) {
        let mut groups = self.groups.write().await;
        if let Some(members) = groups.get_mut(room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                groups.remove(room_id);
            }
        }
    }

    async fn broadcast_to_group(&self, room_id: &str, message: &str) {
        let groups = self.groups.read().await;
        let Some(members) = groups.get(room_id) else {
            debug!(room_id = %room_id, "No subscribers for room");
            return;
        };

        let connections = self.connections.read().await;
        for connection_id in members {
            if let Some(sender) = connections.get(connection_id) {
                let _ = sender.send(message.to_string());
            }
        }
    }
}

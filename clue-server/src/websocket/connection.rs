use clue_types::{PlayerId, ServerMessage};
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::debug;

use crate::broadcast::BroadcastGateway;

#[derive(Debug, Clone)]
pub struct Connection {
    pub player_id: PlayerId,
    pub connected_at: Instant,
    pub sender: mpsc::UnboundedSender<ServerMessage>,
}

impl Connection {
    pub fn new(player_id: PlayerId) -> (Self, mpsc::UnboundedReceiver<ServerMessage>) {
        let (sender, receiver) = mpsc::unbounded_channel();

        let connection = Self {
            player_id,
            connected_at: Instant::now(),
            sender,
        };

        (connection, receiver)
    }

    pub fn send_message(&self, message: ServerMessage) -> Result<(), String> {
        self.sender
            .send(message)
            .map_err(|_| "Connection closed".to_string())
    }
}

/// Live WebSocket connections keyed by the player id minted for each one.
pub struct ConnectionManager {
    connections: DashMap<PlayerId, Connection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection and return the receiving half of its outbox.
    pub fn create_connection(&self, player_id: PlayerId) -> mpsc::UnboundedReceiver<ServerMessage> {
        let (connection, receiver) = Connection::new(player_id);
        self.connections.insert(player_id, connection);
        receiver
    }

    /// Returns how long the removed connection was open.
    pub fn remove_connection(&self, player_id: PlayerId) -> Option<Duration> {
        self.connections
            .remove(&player_id)
            .map(|(_, connection)| connection.connected_at.elapsed())
    }

    pub fn is_connected(&self, player_id: PlayerId) -> bool {
        self.connections.contains_key(&player_id)
    }

    pub fn send_to_connection(
        &self,
        player_id: PlayerId,
        message: ServerMessage,
    ) -> Result<(), String> {
        match self.connections.get(&player_id) {
            Some(connection) => connection.send_message(message),
            None => Err("Connection not found".to_string()),
        }
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BroadcastGateway for ConnectionManager {
    fn send_to_player(&self, player_id: PlayerId, message: ServerMessage) {
        let name = message.name();
        if let Err(e) = self.send_to_connection(player_id, message) {
            debug!("Dropping {} for {}: {}", name, player_id, e);
        }
    }
}

use clue_types::{PlayerId, ServerMessage};

/// Outbound delivery of server events.
///
/// Delivery is fire-and-forget: a player whose connection is already gone
/// is skipped silently, since their disconnect is handled separately.
pub trait BroadcastGateway: Send + Sync {
    fn send_to_player(&self, player_id: PlayerId, message: ServerMessage);

    /// Send the same event to every listed player, in order.
    fn send_to_players(&self, player_ids: &[PlayerId], message: ServerMessage) {
        for player_id in player_ids {
            self.send_to_player(*player_id, message.clone());
        }
    }
}

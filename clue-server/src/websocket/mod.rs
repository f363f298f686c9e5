use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;
use warp::ws::{Message, WebSocket};

use crate::game_manager::GameManager;
use clue_types::{ClientMessage, ErrorCode};

pub mod connection;
pub mod handlers;
pub mod rate_limiter;


pub use connection::ConnectionManager;
use handlers::MessageHandler;
use rate_limiter::{RateLimit, RateLimiter};

pub async fn handle_connection(
    websocket: WebSocket,
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
    rate_limit: RateLimit,
) {
    // Identity is scoped to this socket
    let player_id = Uuid::new_v4();
    info!("New WebSocket connection: {}", player_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();
    let message_receiver = connection_manager.create_connection(player_id);
    let message_handler = MessageHandler::new(
        player_id,
        connection_manager.clone(),
        game_manager.clone(),
    );

    // Handle incoming messages
    let incoming_handler = {
        let message_handler = message_handler.clone();
        let mut rate_limiter = RateLimiter::new(rate_limit);

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        if msg.is_close() {
                            break;
                        }
                        handle_message(msg, &mut rate_limiter, &message_handler).await;
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", player_id, e);
                        break;
                    }
                }
            }
        }
    };

    // Handle outgoing messages
    let outgoing_handler = async move {
        let mut receiver = message_receiver;

        while let Some(message) = receiver.recv().await {
            let json = match serde_json::to_string(&message) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {}: {:?}", message.name(), e);
                    continue;
                }
            };

            if let Err(e) = ws_sender.send(Message::text(json)).await {
                warn!("Failed to send message to {}: {:?}", player_id, e);
                break;
            }
        }
    };

    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    message_handler.handle_disconnect().await;
    match connection_manager.remove_connection(player_id) {
        Some(open_for) => info!(
            "Connection {} disconnected after {:.1}s",
            player_id,
            open_for.as_secs_f64()
        ),
        None => info!("Connection {} disconnected", player_id),
    }
}

async fn handle_message(msg: Message, rate_limiter: &mut RateLimiter, handler: &MessageHandler) {
    // Only text frames carry commands
    if !msg.is_text() {
        return;
    }

    if !rate_limiter.check_rate_limit() {
        warn!("Rate limit exceeded for connection {}", handler.player_id());
        handler.send_error(
            ErrorCode::CapacityExceeded,
            "Too many messages, slow down",
        );
        return;
    }

    let Ok(text) = msg.to_str() else {
        return;
    };

    match serde_json::from_str::<ClientMessage>(text) {
        Ok(client_message) => handler.handle_message(client_message).await,
        Err(e) => {
            warn!("Invalid message from {}: {}", handler.player_id(), e);
            handler.send_error(
                ErrorCode::ValidationError,
                format!("Invalid JSON message: {}", e),
            );
        }
    }
}

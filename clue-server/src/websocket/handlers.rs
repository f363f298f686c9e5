use std::sync::Arc;
use tracing::{debug, warn};

use crate::game_manager::GameManager;
use crate::websocket::connection::ConnectionManager;
use clue_core::SessionResult;
use clue_types::{ClientMessage, ErrorCode, PlayerId, ServerMessage, SettingsPatch};

/// Per-connection command handler. The connection's player id is the actor
/// of every command it sends.
#[derive(Clone)]
pub struct MessageHandler {
    player_id: PlayerId,
    connection_manager: Arc<ConnectionManager>,
    game_manager: Arc<GameManager>,
}

impl MessageHandler {
    pub fn new(
        player_id: PlayerId,
        connection_manager: Arc<ConnectionManager>,
        game_manager: Arc<GameManager>,
    ) -> Self {
        Self {
            player_id,
            connection_manager,
            game_manager,
        }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Run one command. Rejections go back to this connection only, as
    /// `lobbyError`.
    pub async fn handle_message(&self, message: ClientMessage) {
        let name = message.name();
        debug!("{} from {}", name, self.player_id);

        let result = match message {
            ClientMessage::CreateLobby { player_name } => {
                self.handle_create_lobby(&player_name).await
            }
            ClientMessage::JoinLobby {
                lobby_id,
                player_name,
            } => self.handle_join_lobby(&lobby_id, &player_name).await,
            ClientMessage::UpdateLobbySettings { lobby_id, settings } => {
                self.handle_update_settings(&lobby_id, &settings).await
            }
            ClientMessage::StartGame { lobby_id } => self.handle_start_game(&lobby_id).await,
            ClientMessage::SubmitGuess { lobby_id, guess } => {
                self.handle_submit_guess(&lobby_id, &guess).await
            }
            ClientMessage::StartNextRound { lobby_id } => {
                self.handle_start_next_round(&lobby_id).await
            }
            ClientMessage::EndGame { lobby_id } => self.handle_end_game(&lobby_id).await,
            ClientMessage::LeaveLobby { lobby_id } => self.handle_leave_lobby(&lobby_id).await,
        };

        if let Err(e) = result {
            warn!("{} from {} rejected: {}", name, self.player_id, e);
            self.send_error(e.code(), e.to_string());
        }
    }

    pub async fn handle_disconnect(&self) {
        self.game_manager.handle_disconnect(self.player_id).await;
    }

    async fn handle_create_lobby(&self, player_name: &str) -> SessionResult<()> {
        self.game_manager
            .create_lobby(self.player_id, player_name)
            .await
    }

    async fn handle_join_lobby(&self, lobby_id: &str, player_name: &str) -> SessionResult<()> {
        self.game_manager
            .join_lobby(self.player_id, lobby_id, player_name)
            .await
    }

    async fn handle_update_settings(
        &self,
        lobby_id: &str,
        settings: &SettingsPatch,
    ) -> SessionResult<()> {
        self.game_manager
            .update_settings(self.player_id, lobby_id, settings)
            .await
    }

    async fn handle_start_game(&self, lobby_id: &str) -> SessionResult<()> {
        self.game_manager.start_game(self.player_id, lobby_id).await
    }

    async fn handle_submit_guess(&self, lobby_id: &str, guess: &str) -> SessionResult<()> {
        self.game_manager
            .submit_guess(self.player_id, lobby_id, guess)
            .await
    }

    async fn handle_start_next_round(&self, lobby_id: &str) -> SessionResult<()> {
        self.game_manager
            .start_next_round(self.player_id, lobby_id)
            .await
    }

    async fn handle_end_game(&self, lobby_id: &str) -> SessionResult<()> {
        self.game_manager.end_game(self.player_id, lobby_id).await
    }

    async fn handle_leave_lobby(&self, lobby_id: &str) -> SessionResult<()> {
        self.game_manager.leave_lobby(self.player_id, lobby_id).await
    }

    pub fn send_error(&self, code: ErrorCode, message: impl Into<String>) {
        let message = ServerMessage::LobbyError {
            code,
            message: message.into(),
        };
        if let Err(e) = self
            .connection_manager
            .send_to_connection(self.player_id, message)
        {
            debug!("Could not report error to {}: {}", self.player_id, e);
        }
    }
}

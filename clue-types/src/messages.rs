use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{ErrorCode, GameStateSnapshot, LobbyId, LobbySnapshot, PlayerId, SettingsPatch};

/// Commands a connection can issue. The sender's connection id is the actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum ClientMessage {
    #[serde(rename_all = "camelCase")]
    CreateLobby { player_name: String },
    #[serde(rename_all = "camelCase")]
    JoinLobby {
        lobby_id: LobbyId,
        player_name: String,
    },
    #[serde(rename_all = "camelCase")]
    UpdateLobbySettings {
        lobby_id: LobbyId,
        settings: SettingsPatch,
    },
    #[serde(rename_all = "camelCase")]
    StartGame { lobby_id: LobbyId },
    #[serde(rename_all = "camelCase")]
    SubmitGuess { lobby_id: LobbyId, guess: String },
    #[serde(rename_all = "camelCase")]
    StartNextRound { lobby_id: LobbyId },
    #[serde(rename_all = "camelCase")]
    EndGame { lobby_id: LobbyId },
    #[serde(rename_all = "camelCase")]
    LeaveLobby { lobby_id: LobbyId },
}

impl ClientMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ClientMessage::CreateLobby { .. } => "createLobby",
            ClientMessage::JoinLobby { .. } => "joinLobby",
            ClientMessage::UpdateLobbySettings { .. } => "updateLobbySettings",
            ClientMessage::StartGame { .. } => "startGame",
            ClientMessage::SubmitGuess { .. } => "submitGuess",
            ClientMessage::StartNextRound { .. } => "startNextRound",
            ClientMessage::EndGame { .. } => "endGame",
            ClientMessage::LeaveLobby { .. } => "leaveLobby",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "camelCase")]
#[ts(export)]
pub enum ServerMessage {
    LobbyCreated { lobby: LobbySnapshot },
    LobbyJoined { lobby: LobbySnapshot },
    LobbyUpdated { lobby: LobbySnapshot },
    #[serde(rename_all = "camelCase")]
    LobbyLeft { lobby_id: LobbyId },
    GameStarted { state: GameStateSnapshot },
    #[serde(rename_all = "camelCase")]
    Hint { hint: String, hint_number: u32 },
    /// Shared chat-like feed of every guess, right or wrong.
    #[serde(rename_all = "camelCase")]
    PlayerGuess {
        player_id: PlayerId,
        player_name: String,
        guess: String,
        correct: bool,
    },
    #[serde(rename_all = "camelCase")]
    CorrectGuess {
        player_id: PlayerId,
        player_name: String,
        guess: String,
        round_score: u32,
    },
    IncorrectGuess { message: String },
    RoundEnded { state: GameStateSnapshot },
    GameEnded { state: GameStateSnapshot },
    LobbyError { code: ErrorCode, message: String },
}

impl ServerMessage {
    pub fn name(&self) -> &'static str {
        match self {
            ServerMessage::LobbyCreated { .. } => "lobbyCreated",
            ServerMessage::LobbyJoined { .. } => "lobbyJoined",
            ServerMessage::LobbyUpdated { .. } => "lobbyUpdated",
            ServerMessage::LobbyLeft { .. } => "lobbyLeft",
            ServerMessage::GameStarted { .. } => "gameStarted",
            ServerMessage::Hint { .. } => "hint",
            ServerMessage::PlayerGuess { .. } => "playerGuess",
            ServerMessage::CorrectGuess { .. } => "correctGuess",
            ServerMessage::IncorrectGuess { .. } => "incorrectGuess",
            ServerMessage::RoundEnded { .. } => "roundEnded",
            ServerMessage::GameEnded { .. } => "gameEnded",
            ServerMessage::LobbyError { .. } => "lobbyError",
        }
    }
}

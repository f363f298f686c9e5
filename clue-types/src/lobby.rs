use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameWinner, LobbyId, Player, PlayerId, RoundWinner};

/// Host-configurable rules for a lobby. All durations are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Settings {
    pub time_limit: u32,
    pub hint_interval: u32,
    pub max_players: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit: 60,
            hint_interval: 15,
            max_players: 8,
        }
    }
}

/// Partial settings update sent by the host. Missing fields keep their value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub time_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub hint_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub max_players: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum GameStatus {
    Waiting,    // Lobby open, no game started yet
    Playing,    // Round in progress, hints being revealed
    RoundEnded, // Round over, host may start the next one
    Ended,      // Game over, winner decided
}

impl GameStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::Waiting => "waiting",
            GameStatus::Playing => "playing",
            GameStatus::RoundEnded => "roundEnded",
            GameStatus::Ended => "ended",
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Round state as clients see it.
///
/// `word` stays `None` while a round is being played so the secret never
/// reaches a client before the round is over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct GameStateSnapshot {
    pub status: GameStatus,
    pub round: u32,
    pub hints: Vec<String>,
    pub hint_count: u32,
    pub total_hints: u32,
    pub time_limit: u32,
    pub hint_interval: u32,
    pub time_remaining: Option<u32>,
    pub start_time: Option<String>, // ISO 8601 string
    pub round_winner: Option<RoundWinner>,
    pub winner: Option<GameWinner>,
    pub word: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct LobbySnapshot {
    pub id: LobbyId,
    pub host_id: PlayerId,
    pub players: Vec<Player>,
    pub settings: Settings,
    pub game_state: GameStateSnapshot,
}

impl LobbySnapshot {
    pub fn member_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }
}

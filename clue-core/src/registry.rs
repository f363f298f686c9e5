use clue_types::{GameStateSnapshot, LobbyId, LobbySnapshot, Player, PlayerId, SettingsPatch};
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::{GuessOutcome, Lobby, RevealedHint, SessionError, SessionResult, WordProvider};

/// Lobby codes avoid characters that are easy to misread (0/O, 1/I).
pub const LOBBY_ID_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const LOBBY_ID_LENGTH: usize = 6;
pub const MAX_PLAYER_NAME_CHARS: usize = 20;

/// Membership after a successful create or join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub lobby: LobbySnapshot,
    /// The player was already a member and nothing changed.
    pub rejoined: bool,
    /// The lobby the player was in before, if joining moved them.
    pub previous: Option<LeaveOutcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// Lobby still has members; snapshot reflects the departure.
    Remaining(LobbySnapshot),
    /// Last member left and the lobby was deleted.
    Disbanded(LobbyId),
}

impl LeaveOutcome {
    pub fn lobby_id(&self) -> &str {
        match self {
            LeaveOutcome::Remaining(lobby) => &lobby.id,
            LeaveOutcome::Disbanded(id) => id,
        }
    }
}

/// Owns every live lobby plus the player → lobby index.
///
/// State is process-scoped and in-memory only; nothing survives a restart.
pub struct LobbyRegistry {
    lobbies: HashMap<LobbyId, Lobby>,
    player_to_lobby: HashMap<PlayerId, LobbyId>,
    words: Arc<dyn WordProvider>,
}

impl LobbyRegistry {
    pub fn new(words: Arc<dyn WordProvider>) -> Self {
        Self {
            lobbies: HashMap::new(),
            player_to_lobby: HashMap::new(),
            words,
        }
    }

    pub fn get(&self, lobby_id: &str) -> Option<&Lobby> {
        self.lobbies.get(lobby_id)
    }

    pub fn lobby_of(&self, player_id: PlayerId) -> Option<&LobbyId> {
        self.player_to_lobby.get(&player_id)
    }

    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }

    pub fn create_lobby(&mut self, host_id: PlayerId, host_name: &str) -> SessionResult<JoinOutcome> {
        let host_name = validate_player_name(host_name)?;
        let previous = self.leave_current(host_id);

        let lobby_id = self.generate_lobby_id();
        let lobby = Lobby::new(lobby_id.clone(), Player::new(host_id, host_name.clone()));
        let snapshot = lobby.snapshot();

        self.lobbies.insert(lobby_id.clone(), lobby);
        self.player_to_lobby.insert(host_id, lobby_id.clone());

        info!("Lobby {} created by {}", lobby_id, host_name);
        Ok(JoinOutcome {
            lobby: snapshot,
            rejoined: false,
            previous,
        })
    }

    pub fn join_lobby(
        &mut self,
        lobby_id: &str,
        player_id: PlayerId,
        player_name: &str,
    ) -> SessionResult<JoinOutcome> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let lobby = self
            .lobbies
            .get(&lobby_id)
            .ok_or_else(|| SessionError::LobbyNotFound(lobby_id.clone()))?;

        // Reattaching after navigation; allowed in any status
        if lobby.is_member(player_id) {
            return Ok(JoinOutcome {
                lobby: lobby.snapshot(),
                rejoined: true,
                previous: None,
            });
        }

        let player_name = validate_player_name(player_name)?;
        if lobby.status() == clue_types::GameStatus::Playing {
            return Err(SessionError::GameInProgress);
        }
        if lobby.is_full() {
            return Err(SessionError::LobbyFull(lobby_id));
        }

        let previous = self.leave_current(player_id);

        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| SessionError::LobbyNotFound(lobby_id.clone()))?;
        lobby.add_player(Player::new(player_id, player_name.clone()));
        let snapshot = lobby.snapshot();
        self.player_to_lobby.insert(player_id, lobby_id.clone());

        info!("{} joined lobby {}", player_name, lobby_id);
        Ok(JoinOutcome {
            lobby: snapshot,
            rejoined: false,
            previous,
        })
    }

    pub fn leave_lobby(&mut self, lobby_id: &str, player_id: PlayerId) -> SessionResult<LeaveOutcome> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let lobby = self
            .lobbies
            .get_mut(&lobby_id)
            .ok_or_else(|| SessionError::LobbyNotFound(lobby_id.clone()))?;

        let removed = lobby
            .remove_player(player_id)
            .ok_or_else(|| SessionError::PlayerNotInLobby(lobby_id.clone()))?;
        if self.player_to_lobby.get(&player_id) == Some(&lobby_id) {
            self.player_to_lobby.remove(&player_id);
        }

        if lobby.players().is_empty() {
            self.lobbies.remove(&lobby_id);
            info!("{} left lobby {}, lobby disbanded", removed.name, lobby_id);
            return Ok(LeaveOutcome::Disbanded(lobby_id));
        }

        info!("{} left lobby {}", removed.name, lobby_id);
        Ok(LeaveOutcome::Remaining(lobby.snapshot()))
    }

    /// A dropped connection is the same as leaving its lobby.
    pub fn handle_disconnect(&mut self, player_id: PlayerId) -> Option<LeaveOutcome> {
        self.leave_current(player_id)
    }

    fn leave_current(&mut self, player_id: PlayerId) -> Option<LeaveOutcome> {
        let lobby_id = self.player_to_lobby.get(&player_id)?.clone();
        match self.leave_lobby(&lobby_id, player_id) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                // Index pointed at a lobby the player is not in
                tracing::warn!("Stale lobby index for {}: {}", player_id, e);
                self.player_to_lobby.remove(&player_id);
                None
            }
        }
    }

    fn lobby_mut(&mut self, lobby_id: &str) -> SessionResult<&mut Lobby> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        self.lobbies
            .get_mut(&lobby_id)
            .ok_or(SessionError::LobbyNotFound(lobby_id))
    }

    pub fn update_settings(
        &mut self,
        lobby_id: &str,
        actor: PlayerId,
        patch: &SettingsPatch,
    ) -> SessionResult<LobbySnapshot> {
        let lobby = self.lobby_mut(lobby_id)?;
        lobby.update_settings(actor, patch)?;
        Ok(lobby.snapshot())
    }

    pub fn start_game(
        &mut self,
        lobby_id: &str,
        actor: PlayerId,
        now: Instant,
    ) -> SessionResult<GameStateSnapshot> {
        let words = Arc::clone(&self.words);
        self.lobby_mut(lobby_id)?.start_game(actor, words.as_ref(), now)
    }

    pub fn submit_guess(
        &mut self,
        lobby_id: &str,
        player_id: PlayerId,
        guess: &str,
        now: Instant,
    ) -> SessionResult<GuessOutcome> {
        self.lobby_mut(lobby_id)?.submit_guess(player_id, guess, now)
    }

    /// Ends the round if one is being played; otherwise returns the state as is.
    pub fn end_round(&mut self, lobby_id: &str) -> SessionResult<GameStateSnapshot> {
        let lobby = self.lobby_mut(lobby_id)?;
        lobby.end_round();
        Ok(lobby.game_state())
    }

    pub fn start_next_round(
        &mut self,
        lobby_id: &str,
        actor: PlayerId,
        now: Instant,
    ) -> SessionResult<GameStateSnapshot> {
        let words = Arc::clone(&self.words);
        self.lobby_mut(lobby_id)?
            .start_next_round(actor, words.as_ref(), now)
    }

    pub fn end_game(&mut self, lobby_id: &str, actor: PlayerId) -> SessionResult<GameStateSnapshot> {
        self.lobby_mut(lobby_id)?.end_game(actor)
    }

    pub fn reveal_next_hint(&mut self, lobby_id: &str, round: u32) -> Option<RevealedHint> {
        self.lobbies.get_mut(lobby_id)?.reveal_next_hint(round)
    }

    fn generate_lobby_id(&self) -> LobbyId {
        let mut rng = rand::rng();
        loop {
            let id: String = (0..LOBBY_ID_LENGTH)
                .map(|_| LOBBY_ID_ALPHABET[rng.random_range(0..LOBBY_ID_ALPHABET.len())] as char)
                .collect();
            if !self.lobbies.contains_key(&id) {
                return id;
            }
        }
    }
}

/// Lobby codes are typed by people: ignore surrounding space and case.
pub fn normalize_lobby_id(raw: &str) -> SessionResult<LobbyId> {
    let id = raw.trim().to_uppercase();
    if id.is_empty() {
        return Err(SessionError::validation("Lobby id is required"));
    }
    Ok(id)
}

pub fn validate_player_name(raw: &str) -> SessionResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SessionError::validation("Player name is required"));
    }
    if name.chars().count() > MAX_PLAYER_NAME_CHARS {
        return Err(SessionError::validation(format!(
            "Player name must be at most {} characters",
            MAX_PLAYER_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

pub fn is_valid_lobby_id(id: &str) -> bool {
    id.len() == LOBBY_ID_LENGTH && id.bytes().all(|b| LOBBY_ID_ALPHABET.contains(&b))
}

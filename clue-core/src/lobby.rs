use chrono::{DateTime, Utc};
use clue_types::{
    GameStateSnapshot, GameStatus, GameWinner, LobbyId, LobbySnapshot, Player, PlayerId,
    RoundWinner, Settings, SettingsPatch,
};
use std::time::Instant;
use tracing::info;

use crate::{
    ScoringEngine, SessionError, SessionResult, WordEntry, WordProvider, apply_settings_patch,
};

pub const MIN_PLAYERS_TO_START: usize = 2;

/// Result of a guess that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuessOutcome {
    Correct {
        player_name: String,
        guess: String,
        winner: RoundWinner,
    },
    Incorrect {
        player_name: String,
        guess: String,
    },
}

impl GuessOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, GuessOutcome::Correct { .. })
    }

    pub fn player_name(&self) -> &str {
        match self {
            GuessOutcome::Correct { player_name, .. } | GuessOutcome::Incorrect { player_name, .. } => {
                player_name
            }
        }
    }

    pub fn guess(&self) -> &str {
        match self {
            GuessOutcome::Correct { guess, .. } | GuessOutcome::Incorrect { guess, .. } => guess,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealedHint {
    pub hint: String,
    /// 1-based position of this hint in the round's list.
    pub number: u32,
    /// Hints still hidden after this one.
    pub remaining: usize,
}

#[derive(Debug, Clone)]
struct RoundState {
    status: GameStatus,
    word: Option<WordEntry>, // Secret, never sent while playing
    revealed: Vec<String>,
    number: u32,
    started_at: Option<Instant>,
    started_at_utc: Option<DateTime<Utc>>,
    time_remaining: Option<u32>,
    round_winner: Option<RoundWinner>,
    winner: Option<GameWinner>,
}

impl RoundState {
    fn new() -> Self {
        Self {
            status: GameStatus::Waiting,
            word: None,
            revealed: Vec::new(),
            number: 0,
            started_at: None,
            started_at_utc: None,
            time_remaining: None,
            round_winner: None,
            winner: None,
        }
    }
}

/// One lobby: its members, rules and the round/game state machine.
///
/// ```text
/// waiting → playing → roundEnded → playing … → ended
/// ```
///
/// Mutation goes through [`crate::LobbyRegistry`]; everything handed to
/// callers is a snapshot.
#[derive(Debug, Clone)]
pub struct Lobby {
    id: LobbyId,
    host_id: PlayerId,
    players: Vec<Player>,
    settings: Settings,
    round: RoundState,
}

impl Lobby {
    pub(crate) fn new(id: LobbyId, host: Player) -> Self {
        Self {
            id,
            host_id: host.id,
            players: vec![host],
            settings: Settings::default(),
            round: RoundState::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn host_id(&self) -> PlayerId {
        self.host_id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn status(&self) -> GameStatus {
        self.round.status
    }

    pub fn round_number(&self) -> u32 {
        self.round.number
    }

    pub fn revealed_hints(&self) -> &[String] {
        &self.round.revealed
    }

    pub fn total_hints(&self) -> usize {
        self.round.word.as_ref().map_or(0, |w| w.hints.len())
    }

    /// The secret word of the current or last round. Server-side only.
    pub fn current_word(&self) -> Option<&str> {
        self.round.word.as_ref().map(|w| w.word.as_str())
    }

    pub fn round_winner(&self) -> Option<&RoundWinner> {
        self.round.round_winner.as_ref()
    }

    pub fn winner(&self) -> Option<&GameWinner> {
        self.round.winner.as_ref()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_member(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.settings.max_players as usize
    }

    pub(crate) fn add_player(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Remove a member, handing the host role to the next member in join
    /// order if the host left.
    pub(crate) fn remove_player(&mut self, player_id: PlayerId) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let removed = self.players.remove(index);

        if self.host_id == player_id {
            if let Some(next_host) = self.players.first() {
                info!(
                    "Host of lobby {} passed from {} to {}",
                    self.id, player_id, next_host.id
                );
                self.host_id = next_host.id;
            }
        }

        Some(removed)
    }

    fn require_host(&self, actor: PlayerId, action: &'static str) -> SessionResult<()> {
        if self.host_id != actor {
            return Err(SessionError::NotHost(action));
        }
        Ok(())
    }

    pub(crate) fn update_settings(
        &mut self,
        actor: PlayerId,
        patch: &SettingsPatch,
    ) -> SessionResult<()> {
        self.require_host(actor, "update settings")?;
        if self.round.status == GameStatus::Playing {
            return Err(SessionError::invalid_state(
                "Cannot update settings during a round",
            ));
        }

        self.settings = apply_settings_patch(&self.settings, patch)?;
        info!("Lobby {} settings updated: {:?}", self.id, self.settings);
        Ok(())
    }

    pub(crate) fn start_game(
        &mut self,
        actor: PlayerId,
        words: &dyn WordProvider,
        now: Instant,
    ) -> SessionResult<GameStateSnapshot> {
        self.require_host(actor, "start the game")?;
        if self.round.status == GameStatus::Playing {
            return Err(SessionError::invalid_state("Game is already in progress"));
        }
        if self.players.len() < MIN_PLAYERS_TO_START {
            return Err(SessionError::invalid_state(format!(
                "Need at least {} players to start",
                MIN_PLAYERS_TO_START
            )));
        }

        // A fresh game always begins at round 1 with zeroed scores
        for player in &mut self.players {
            player.score = 0;
        }
        self.begin_round(1, words, now);
        self.round.winner = None;

        info!(
            "Game started in lobby {} with {} players",
            self.id,
            self.players.len()
        );
        Ok(self.game_state())
    }

    pub(crate) fn start_next_round(
        &mut self,
        actor: PlayerId,
        words: &dyn WordProvider,
        now: Instant,
    ) -> SessionResult<GameStateSnapshot> {
        self.require_host(actor, "start the next round")?;
        if self.round.status != GameStatus::RoundEnded {
            return Err(SessionError::invalid_state("Round is not ended"));
        }

        let next = self.round.number + 1;
        self.begin_round(next, words, now);

        info!("Round {} started in lobby {}", next, self.id);
        Ok(self.game_state())
    }

    fn begin_round(&mut self, number: u32, words: &dyn WordProvider, now: Instant) {
        let entry = words.draw(self.current_word());
        let secret = entry.word.trim().to_uppercase();

        self.round.word = Some(WordEntry {
            word: secret,
            hints: entry.hints,
        });
        self.round.status = GameStatus::Playing;
        self.round.number = number;
        self.round.revealed.clear();
        self.round.round_winner = None;
        self.round.started_at = Some(now);
        self.round.started_at_utc = Some(Utc::now());
        self.round.time_remaining = Some(self.settings.time_limit);
    }

    pub(crate) fn submit_guess(
        &mut self,
        player_id: PlayerId,
        raw_guess: &str,
        now: Instant,
    ) -> SessionResult<GuessOutcome> {
        if self.round.status != GameStatus::Playing {
            return Err(SessionError::invalid_state("Game is not in progress"));
        }
        let guess = raw_guess.trim();
        if guess.is_empty() {
            return Err(SessionError::validation("Guess must not be empty"));
        }

        let (word, started_at) = match (&self.round.word, self.round.started_at) {
            (Some(entry), Some(started_at)) => (entry.word.as_str(), started_at),
            _ => return Err(SessionError::invalid_state("Round has no word")),
        };
        let correct = ScoringEngine::is_correct(guess, word);
        let elapsed = now.saturating_duration_since(started_at);
        let settings = self.settings;

        let player = self
            .players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| SessionError::PlayerNotInLobby(self.id.clone()))?;

        if !correct {
            return Ok(GuessOutcome::Incorrect {
                player_name: player.name.clone(),
                guess: guess.to_string(),
            });
        }

        let round_score = ScoringEngine::round_score(elapsed, &settings);
        player.score = player.score.saturating_add(round_score);
        let winner = RoundWinner {
            id: player.id,
            name: player.name.clone(),
            score: player.score,
            round_score,
        };
        let player_name = player.name.clone();
        self.round.round_winner = Some(winner.clone());

        info!(
            "{} guessed the word in lobby {} after {:.1}s for {} points",
            player_name,
            self.id,
            elapsed.as_secs_f64(),
            round_score
        );
        Ok(GuessOutcome::Correct {
            player_name,
            guess: guess.to_string(),
            winner,
        })
    }

    /// End the current round. Returns `false` (and changes nothing) when no
    /// round is being played.
    pub(crate) fn end_round(&mut self) -> bool {
        if self.round.status != GameStatus::Playing {
            return false;
        }
        self.round.status = GameStatus::RoundEnded;
        self.round.time_remaining = Some(0);
        info!("Round {} ended in lobby {}", self.round.number, self.id);
        true
    }

    pub(crate) fn end_game(&mut self, actor: PlayerId) -> SessionResult<GameStateSnapshot> {
        self.require_host(actor, "end the game")?;
        if self.round.status == GameStatus::Waiting {
            return Err(SessionError::invalid_state("Game has not started"));
        }

        self.round.winner = self.leading_player();
        self.round.status = GameStatus::Ended;
        self.round.time_remaining = Some(0);

        info!(
            "Game ended in lobby {}, winner {:?}",
            self.id,
            self.round.winner.as_ref().map(|w| w.name.as_str())
        );
        Ok(self.game_state())
    }

    /// Highest cumulative score; on a tie the earliest joiner wins.
    fn leading_player(&self) -> Option<GameWinner> {
        let mut best: Option<&Player> = None;
        for player in &self.players {
            if best.is_none_or(|b| player.score > b.score) {
                best = Some(player);
            }
        }
        best.map(|p| GameWinner {
            id: p.id,
            name: p.name.clone(),
            score: p.score,
        })
    }

    /// Reveal the next hint of `round`. Returns `None` if that round is no
    /// longer being played or every hint is already out.
    pub(crate) fn reveal_next_hint(&mut self, round: u32) -> Option<RevealedHint> {
        if self.round.status != GameStatus::Playing || self.round.number != round {
            return None;
        }
        let entry = self.round.word.as_ref()?;
        let next = entry.hints.get(self.round.revealed.len())?.clone();
        self.round.revealed.push(next.clone());

        let number = self.round.revealed.len();
        Some(RevealedHint {
            hint: next,
            number: number as u32,
            remaining: entry.hints.len() - number,
        })
    }

    pub fn game_state(&self) -> GameStateSnapshot {
        let word = match self.round.status {
            GameStatus::RoundEnded | GameStatus::Ended => self.current_word().map(str::to_string),
            GameStatus::Waiting | GameStatus::Playing => None,
        };

        GameStateSnapshot {
            status: self.round.status,
            round: self.round.number,
            hints: self.round.revealed.clone(),
            hint_count: self.round.revealed.len() as u32,
            total_hints: self.total_hints() as u32,
            time_limit: self.settings.time_limit,
            hint_interval: self.settings.hint_interval,
            time_remaining: self.round.time_remaining,
            start_time: self.round.started_at_utc.map(|t| t.to_rfc3339()),
            round_winner: self.round.round_winner.clone(),
            winner: self.round.winner.clone(),
            word,
        }
    }

    pub fn snapshot(&self) -> LobbySnapshot {
        LobbySnapshot {
            id: self.id.clone(),
            host_id: self.host_id,
            players: self.players.clone(),
            settings: self.settings,
            game_state: self.game_state(),
        }
    }
}

use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info};

use crate::broadcast::BroadcastGateway;
use crate::timers::{RoundTimerCoordinator, TimerEvent, TimerKind, TimerTag};
use clue_core::{
    GuessOutcome, LeaveOutcome, LobbyRegistry, SessionResult, WordProvider, normalize_lobby_id,
};
use clue_types::{
    GameStateSnapshot, GameStatus, LobbyId, LobbySnapshot, PlayerId, ServerMessage, SettingsPatch,
};

const INCORRECT_GUESS_MESSAGE: &str = "Incorrect guess!";

struct ManagerState {
    registry: LobbyRegistry,
    timers: RoundTimerCoordinator,
}

impl ManagerState {
    fn members(&self, lobby_id: &str) -> Vec<PlayerId> {
        self.registry
            .get(lobby_id)
            .map(|lobby| lobby.players().iter().map(|p| p.id).collect())
            .unwrap_or_default()
    }
}

/// Dispatches lobby commands and timer events.
///
/// Everything that reads or mutates lobby state goes through one mutex, so
/// commands and timer firings are applied one at a time in arrival order.
/// Broadcasts are issued while the lock is held, which keeps the order seen
/// by clients identical to the order of state changes.
pub struct GameManager {
    state: Mutex<ManagerState>,
    gateway: Arc<dyn BroadcastGateway>,
}

impl GameManager {
    /// Build a manager and spawn the task that feeds timer events back
    /// into it. Must be called from within a tokio runtime.
    pub fn start(words: Arc<dyn WordProvider>, gateway: Arc<dyn BroadcastGateway>) -> Arc<Self> {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let manager = Arc::new(Self {
            state: Mutex::new(ManagerState {
                registry: LobbyRegistry::new(words),
                timers: RoundTimerCoordinator::new(events_tx),
            }),
            gateway,
        });

        spawn_timer_pump(Arc::downgrade(&manager), events_rx);
        manager
    }

    pub async fn create_lobby(&self, player_id: PlayerId, player_name: &str) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        let outcome = state.registry.create_lobby(player_id, player_name)?;

        if let Some(previous) = outcome.previous {
            self.announce_departure(&mut state, previous);
        }

        self.gateway.send_to_player(
            player_id,
            ServerMessage::LobbyCreated {
                lobby: outcome.lobby.clone(),
            },
        );
        self.gateway.send_to_player(
            player_id,
            ServerMessage::LobbyJoined {
                lobby: outcome.lobby,
            },
        );
        Ok(())
    }

    pub async fn join_lobby(
        &self,
        player_id: PlayerId,
        lobby_id: &str,
        player_name: &str,
    ) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        let outcome = state.registry.join_lobby(lobby_id, player_id, player_name)?;

        if let Some(previous) = outcome.previous {
            self.announce_departure(&mut state, previous);
        }

        self.gateway.send_to_player(
            player_id,
            ServerMessage::LobbyJoined {
                lobby: outcome.lobby.clone(),
            },
        );
        if !outcome.rejoined {
            self.gateway.send_to_players(
                &outcome.lobby.member_ids(),
                ServerMessage::LobbyUpdated {
                    lobby: outcome.lobby,
                },
            );
        }
        Ok(())
    }

    pub async fn update_settings(
        &self,
        player_id: PlayerId,
        lobby_id: &str,
        patch: &SettingsPatch,
    ) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        let lobby = state.registry.update_settings(lobby_id, player_id, patch)?;

        self.gateway.send_to_players(
            &lobby.member_ids(),
            ServerMessage::LobbyUpdated { lobby },
        );
        Ok(())
    }

    pub async fn start_game(&self, player_id: PlayerId, lobby_id: &str) -> SessionResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let mut state = self.state.lock().await;
        let game_state = state.registry.start_game(&lobby_id, player_id, now())?;

        self.begin_round(&mut state, &lobby_id, game_state);
        Ok(())
    }

    pub async fn start_next_round(&self, player_id: PlayerId, lobby_id: &str) -> SessionResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let mut state = self.state.lock().await;
        let game_state = state
            .registry
            .start_next_round(&lobby_id, player_id, now())?;

        self.begin_round(&mut state, &lobby_id, game_state);
        Ok(())
    }

    pub async fn submit_guess(
        &self,
        player_id: PlayerId,
        lobby_id: &str,
        guess: &str,
    ) -> SessionResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let mut state = self.state.lock().await;
        let outcome = state
            .registry
            .submit_guess(&lobby_id, player_id, guess, now())?;

        // A winning guess stops the timers before anything is sent
        if outcome.is_correct() {
            state.timers.disarm(&lobby_id);
        }

        let members = state.members(&lobby_id);
        self.gateway.send_to_players(
            &members,
            ServerMessage::PlayerGuess {
                player_id,
                player_name: outcome.player_name().to_string(),
                guess: outcome.guess().to_string(),
                correct: outcome.is_correct(),
            },
        );

        match outcome {
            GuessOutcome::Correct {
                player_name,
                guess,
                winner,
            } => {
                self.gateway.send_to_players(
                    &members,
                    ServerMessage::CorrectGuess {
                        player_id,
                        player_name,
                        guess,
                        round_score: winner.round_score,
                    },
                );
                let game_state = state.registry.end_round(&lobby_id)?;
                self.gateway
                    .send_to_players(&members, ServerMessage::RoundEnded { state: game_state });
            }
            GuessOutcome::Incorrect { .. } => {
                self.gateway.send_to_player(
                    player_id,
                    ServerMessage::IncorrectGuess {
                        message: INCORRECT_GUESS_MESSAGE.to_string(),
                    },
                );
            }
        }
        Ok(())
    }

    pub async fn end_game(&self, player_id: PlayerId, lobby_id: &str) -> SessionResult<()> {
        let lobby_id = normalize_lobby_id(lobby_id)?;
        let mut state = self.state.lock().await;
        let game_state = state.registry.end_game(&lobby_id, player_id)?;
        state.timers.disarm(&lobby_id);

        let members = state.members(&lobby_id);
        self.gateway
            .send_to_players(&members, ServerMessage::GameEnded { state: game_state });
        Ok(())
    }

    pub async fn leave_lobby(&self, player_id: PlayerId, lobby_id: &str) -> SessionResult<()> {
        let mut state = self.state.lock().await;
        let outcome = state.registry.leave_lobby(lobby_id, player_id)?;

        self.gateway.send_to_player(
            player_id,
            ServerMessage::LobbyLeft {
                lobby_id: outcome.lobby_id().to_string(),
            },
        );
        self.announce_departure(&mut state, outcome);
        Ok(())
    }

    /// A dropped connection leaves its lobby without a `lobbyLeft` reply.
    pub async fn handle_disconnect(&self, player_id: PlayerId) {
        let mut state = self.state.lock().await;
        if let Some(outcome) = state.registry.handle_disconnect(player_id) {
            info!("Player {} disconnected from lobby {}", player_id, outcome.lobby_id());
            self.announce_departure(&mut state, outcome);
        }
    }

    pub async fn handle_timer_event(&self, event: TimerEvent) {
        let mut state = self.state.lock().await;
        if !state.timers.is_current(&event.tag) {
            debug!("Dropping stale {:?} timer event {:?}", event.kind, event.tag);
            return;
        }

        let lobby_id = event.tag.lobby_id.as_str();
        let still_playing = state.registry.get(lobby_id).is_some_and(|lobby| {
            lobby.status() == GameStatus::Playing && lobby.round_number() == event.tag.round
        });
        if !still_playing {
            debug!("Lobby {} is no longer playing round {}", lobby_id, event.tag.round);
            state.timers.disarm(lobby_id);
            return;
        }

        match event.kind {
            TimerKind::Hint => self.reveal_hint(&mut state, lobby_id, event.tag.round),
            TimerKind::Timeout => {
                state.timers.disarm(lobby_id);
                if let Ok(game_state) = state.registry.end_round(lobby_id) {
                    info!("Round {} timed out in lobby {}", event.tag.round, lobby_id);
                    let members = state.members(lobby_id);
                    self.gateway
                        .send_to_players(&members, ServerMessage::RoundEnded { state: game_state });
                }
            }
        }
    }

    fn begin_round(&self, state: &mut ManagerState, lobby_id: &str, game_state: GameStateSnapshot) {
        let round = game_state.round;
        let members = state.members(lobby_id);
        let Some(settings) = state.registry.get(lobby_id).map(|lobby| *lobby.settings()) else {
            return;
        };

        self.gateway
            .send_to_players(&members, ServerMessage::GameStarted { state: game_state });
        state.timers.arm(lobby_id, round, &settings);
        self.reveal_hint(state, lobby_id, round);
    }

    fn reveal_hint(&self, state: &mut ManagerState, lobby_id: &str, round: u32) {
        match state.registry.reveal_next_hint(lobby_id, round) {
            Some(revealed) => {
                debug!(
                    "Lobby {} round {} hint {} revealed",
                    lobby_id, round, revealed.number
                );
                let members = state.members(lobby_id);
                self.gateway.send_to_players(
                    &members,
                    ServerMessage::Hint {
                        hint: revealed.hint,
                        hint_number: revealed.number,
                    },
                );
                if revealed.remaining == 0 {
                    state.timers.disarm_hints(lobby_id);
                }
            }
            None => state.timers.disarm_hints(lobby_id),
        }
    }

    fn announce_departure(&self, state: &mut ManagerState, outcome: LeaveOutcome) {
        match outcome {
            LeaveOutcome::Remaining(lobby) => {
                self.gateway.send_to_players(
                    &lobby.member_ids(),
                    ServerMessage::LobbyUpdated { lobby },
                );
            }
            LeaveOutcome::Disbanded(lobby_id) => {
                state.timers.disarm(&lobby_id);
            }
        }
    }

    pub async fn lobby_snapshot(&self, lobby_id: &str) -> Option<LobbySnapshot> {
        let state = self.state.lock().await;
        state.registry.get(lobby_id).map(|lobby| lobby.snapshot())
    }

    pub async fn lobby_of(&self, player_id: PlayerId) -> Option<LobbyId> {
        let state = self.state.lock().await;
        state.registry.lobby_of(player_id).cloned()
    }

    pub async fn lobby_count(&self) -> usize {
        self.state.lock().await.registry.len()
    }

    pub async fn timers_armed(&self, lobby_id: &str) -> bool {
        self.state.lock().await.timers.is_armed(lobby_id)
    }

    pub async fn hints_armed(&self, lobby_id: &str) -> bool {
        self.state.lock().await.timers.hints_armed(lobby_id)
    }

    pub async fn current_timer_tag(&self, lobby_id: &str) -> Option<TimerTag> {
        let state = self.state.lock().await;
        state.timers.current_tag(lobby_id).cloned()
    }
}

fn spawn_timer_pump(manager: Weak<GameManager>, mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(manager) = manager.upgrade() else {
                break;
            };
            manager.handle_timer_event(event).await;
        }
        debug!("Timer pump stopped");
    });
}

/// Round clock. Uses tokio's clock so paused-time tests control scoring.
fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

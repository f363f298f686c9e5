use clue_types::{LobbyId, Settings};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at, sleep_until};
use tracing::debug;

/// Identifies one armed timer set. A new generation is minted on every arm,
/// so events from an earlier set of the same lobby and round never match.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerTag {
    pub lobby_id: LobbyId,
    pub round: u32,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Hint,
    Timeout,
}

/// A timer firing, delivered to the game manager for processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEvent {
    pub tag: TimerTag,
    pub kind: TimerKind,
}

struct ArmedTimers {
    tag: TimerTag,
    hint_task: Option<JoinHandle<()>>,
    timeout_task: JoinHandle<()>,
}

impl ArmedTimers {
    fn abort(self) {
        if let Some(hint_task) = self.hint_task {
            hint_task.abort();
        }
        self.timeout_task.abort();
    }
}

/// Schedules the hint cadence and round timeout for each playing lobby.
///
/// Tasks never touch lobby state. They only push [`TimerEvent`]s into the
/// channel given at construction.
pub struct RoundTimerCoordinator {
    armed: HashMap<LobbyId, ArmedTimers>,
    next_generation: u64,
    events: mpsc::UnboundedSender<TimerEvent>,
}

impl RoundTimerCoordinator {
    pub fn new(events: mpsc::UnboundedSender<TimerEvent>) -> Self {
        Self {
            armed: HashMap::new(),
            next_generation: 0,
            events,
        }
    }

    /// Start timers for `round` of `lobby_id`, replacing any armed set.
    ///
    /// The hint timer first fires one `hint_interval` from now; the caller
    /// reveals the opening hint itself.
    pub fn arm(&mut self, lobby_id: &str, round: u32, settings: &Settings) -> TimerTag {
        self.disarm(lobby_id);

        self.next_generation += 1;
        let tag = TimerTag {
            lobby_id: lobby_id.to_string(),
            round,
            generation: self.next_generation,
        };

        // Deadlines are fixed here rather than when the tasks first run
        let now = Instant::now();
        let hint_interval = Duration::from_secs(settings.hint_interval as u64);
        let time_limit = Duration::from_secs(settings.time_limit as u64);

        let hint_task = {
            let events = self.events.clone();
            let event = TimerEvent {
                tag: tag.clone(),
                kind: TimerKind::Hint,
            };
            tokio::spawn(async move {
                let mut ticker = interval_at(now + hint_interval, hint_interval);
                loop {
                    ticker.tick().await;
                    if events.send(event.clone()).is_err() {
                        break;
                    }
                }
            })
        };

        let timeout_task = {
            let events = self.events.clone();
            let event = TimerEvent {
                tag: tag.clone(),
                kind: TimerKind::Timeout,
            };
            tokio::spawn(async move {
                sleep_until(now + time_limit).await;
                let _ = events.send(event);
            })
        };

        debug!(
            "Armed timers for lobby {} round {} (generation {})",
            lobby_id, round, tag.generation
        );
        self.armed.insert(
            lobby_id.to_string(),
            ArmedTimers {
                tag: tag.clone(),
                hint_task: Some(hint_task),
                timeout_task,
            },
        );
        tag
    }

    /// Cancel both timers of a lobby. Returns whether anything was armed.
    pub fn disarm(&mut self, lobby_id: &str) -> bool {
        match self.armed.remove(lobby_id) {
            Some(timers) => {
                debug!(
                    "Disarmed timers for lobby {} round {}",
                    lobby_id, timers.tag.round
                );
                timers.abort();
                true
            }
            None => false,
        }
    }

    /// Stop the hint cadence but keep the round timeout running.
    pub fn disarm_hints(&mut self, lobby_id: &str) {
        if let Some(hint_task) = self
            .armed
            .get_mut(lobby_id)
            .and_then(|timers| timers.hint_task.take())
        {
            hint_task.abort();
        }
    }

    pub fn is_current(&self, tag: &TimerTag) -> bool {
        self.armed
            .get(&tag.lobby_id)
            .is_some_and(|timers| timers.tag == *tag)
    }

    pub fn current_tag(&self, lobby_id: &str) -> Option<&TimerTag> {
        self.armed.get(lobby_id).map(|timers| &timers.tag)
    }

    pub fn is_armed(&self, lobby_id: &str) -> bool {
        self.armed.contains_key(lobby_id)
    }

    pub fn hints_armed(&self, lobby_id: &str) -> bool {
        self.armed
            .get(lobby_id)
            .is_some_and(|timers| timers.hint_task.is_some())
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }
}

impl Drop for RoundTimerCoordinator {
    fn drop(&mut self) {
        for (_, timers) in self.armed.drain() {
            timers.abort();
        }
    }
}

#![allow(dead_code)]

use clue_core::{LobbyRegistry, WordEntry, WordProvider};
use clue_types::{LobbyId, PlayerId};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use uuid::Uuid;

/// Hands out words from a fixed list in order, wrapping around.
pub struct ScriptedWords {
    entries: Vec<WordEntry>,
    next: AtomicUsize,
}

impl ScriptedWords {
    pub fn new(words: &[&str]) -> Self {
        let entries = words
            .iter()
            .map(|word| {
                WordEntry::new(
                    *word,
                    (1..=4).map(|i| format!("{} hint {}", word, i)).collect(),
                )
            })
            .collect();
        Self {
            entries,
            next: AtomicUsize::new(0),
        }
    }
}

impl WordProvider for ScriptedWords {
    fn draw(&self, _previous: Option<&str>) -> WordEntry {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.entries[index % self.entries.len()].clone()
    }
}

/// Creates a registry whose rounds use LANTERN, then GLACIER, then PIANO.
pub fn create_test_registry() -> LobbyRegistry {
    LobbyRegistry::new(Arc::new(ScriptedWords::new(&[
        "LANTERN", "GLACIER", "PIANO",
    ])))
}

pub struct TestLobby {
    pub id: LobbyId,
    pub host: PlayerId,
    pub guests: Vec<PlayerId>,
}

/// Creates a lobby hosted by "Hana" with one guest per entry in `guests`.
pub fn create_lobby_with_guests(registry: &mut LobbyRegistry, guests: &[&str]) -> TestLobby {
    let host = Uuid::new_v4();
    let id = registry.create_lobby(host, "Hana").unwrap().lobby.id;

    let guests = guests
        .iter()
        .map(|name| {
            let guest = Uuid::new_v4();
            registry.join_lobby(&id, guest, name).unwrap();
            guest
        })
        .collect();

    TestLobby { id, host, guests }
}

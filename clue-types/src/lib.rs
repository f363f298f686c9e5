pub mod errors;
pub mod lobby;
pub mod messages;
pub mod player;

use uuid::Uuid;

/// Short, upper-case lobby code shared between players.
pub type LobbyId = String;

/// Connection-scoped player identity. A new WebSocket gets a new id.
pub type PlayerId = Uuid;

// Re-export all types
pub use errors::*;
pub use lobby::*;
pub use messages::*;
pub use player::*;

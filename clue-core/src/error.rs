use clue_types::{ErrorCode, LobbyId};

/// Why a lobby operation was rejected. A rejected operation never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Lobby {0} not found")]
    LobbyNotFound(LobbyId),

    #[error("Player not in lobby {0}")]
    PlayerNotInLobby(LobbyId),

    /// Carries the action that was attempted, e.g. "start the game".
    #[error("Only the host can {0}")]
    NotHost(&'static str),

    #[error("Game is already in progress. Cannot join mid-game.")]
    GameInProgress,

    #[error("{0}")]
    InvalidState(String),

    #[error("Lobby {0} is full")]
    LobbyFull(LobbyId),

    #[error("{0}")]
    Validation(String),
}

impl SessionError {
    pub fn invalid_state(message: impl Into<String>) -> Self {
        SessionError::InvalidState(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        SessionError::Validation(message.into())
    }

    /// Wire-level category of this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::LobbyNotFound(_) | SessionError::PlayerNotInLobby(_) => {
                ErrorCode::NotFound
            }
            SessionError::NotHost(_) => ErrorCode::Unauthorized,
            SessionError::GameInProgress | SessionError::InvalidState(_) => {
                ErrorCode::InvalidState
            }
            SessionError::LobbyFull(_) => ErrorCode::CapacityExceeded,
            SessionError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

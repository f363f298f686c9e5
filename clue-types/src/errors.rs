use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error categories reported to clients in `lobbyError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum ErrorCode {
    NotFound,
    Unauthorized,
    InvalidState,
    CapacityExceeded,
    ValidationError,
}

use clue_types::{Settings, SettingsPatch};
use std::ops::RangeInclusive;

use crate::{SessionError, SessionResult};

pub const TIME_LIMIT_RANGE: RangeInclusive<u32> = 30..=300;
pub const HINT_INTERVAL_RANGE: RangeInclusive<u32> = 5..=60;
pub const MAX_PLAYERS_RANGE: RangeInclusive<u32> = 2..=16;

/// Merge `patch` into `current`, rejecting the whole patch if any field is out of range.
pub fn apply_settings_patch(current: &Settings, patch: &SettingsPatch) -> SessionResult<Settings> {
    let mut next = *current;

    if let Some(time_limit) = patch.time_limit {
        next.time_limit = checked("timeLimit", time_limit, &TIME_LIMIT_RANGE)?;
    }
    if let Some(hint_interval) = patch.hint_interval {
        next.hint_interval = checked("hintInterval", hint_interval, &HINT_INTERVAL_RANGE)?;
    }
    if let Some(max_players) = patch.max_players {
        next.max_players = checked("maxPlayers", max_players, &MAX_PLAYERS_RANGE)?;
    }

    Ok(next)
}

fn checked(field: &str, value: u32, range: &RangeInclusive<u32>) -> SessionResult<u32> {
    if range.contains(&value) {
        Ok(value)
    } else {
        Err(SessionError::validation(format!(
            "{} must be between {} and {}, got {}",
            field,
            range.start(),
            range.end(),
            value
        )))
    }
}

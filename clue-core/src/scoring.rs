use clue_types::Settings;
use std::time::Duration;

pub struct ScoringEngine;

impl ScoringEngine {
    /// Seconds of remaining time worth one point.
    pub const SECONDS_PER_POINT: u32 = 10;
    /// A correct guess always scores at least this much, even after the deadline.
    pub const MIN_ROUND_SCORE: u32 = 1;

    /// Score for a correct guess made `elapsed` into the round:
    /// `max(1, floor((timeLimit - elapsed) / 10))`.
    pub fn round_score(elapsed: Duration, settings: &Settings) -> u32 {
        // Work in nanoseconds so fractional seconds floor exactly.
        let limit_nanos = u128::from(settings.time_limit) * 1_000_000_000;
        let remaining = limit_nanos.saturating_sub(elapsed.as_nanos());
        let per_point = u128::from(Self::SECONDS_PER_POINT) * 1_000_000_000;
        let points = u32::try_from(remaining / per_point).unwrap_or(u32::MAX);
        points.max(Self::MIN_ROUND_SCORE)
    }

    /// Case-folded, trimmed form used to compare guesses with the secret word.
    pub fn normalize(text: &str) -> String {
        text.trim().to_lowercase()
    }

    pub fn is_correct(guess: &str, word: &str) -> bool {
        Self::normalize(guess) == Self::normalize(word)
    }
}

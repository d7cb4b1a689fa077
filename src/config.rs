//! Shared board geometry and tunable game settings.

use log::LevelFilter;

/// Board is always square: `WIDTH` x `WIDTH` cells.
pub const WIDTH: usize = 6;
pub const CELL_COUNT: usize = WIDTH * WIDTH;
/// Shortest run that clears.
pub const MIN_RUN: usize = 3;

/// Storage key the browser front end uses for the best score.
pub const HIGH_SCORE_KEY: &str = "candyHighest";

/// Runtime settings for a game. Defaults reproduce the classic two minute mode.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Countdown length in whole seconds.
    pub session_seconds: u32,
    /// Pause between clear -> collapse and collapse -> cascade check.
    pub settle_delay_ms: u64,
    /// Pause before a swap that produced no match is undone.
    pub revert_delay_ms: u64,
    pub points_per_tile: u32,
    pub high_score_key: String,
    pub log_level: LevelFilter,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            session_seconds: 120,
            settle_delay_ms: 180,
            revert_delay_ms: 180,
            points_per_tile: 10,
            high_score_key: HIGH_SCORE_KEY.to_string(),
            log_level: LevelFilter::Info,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON object; missing fields keep their defaults.
    #[cfg(feature = "serde_json")]
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

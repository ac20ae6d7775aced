//! Session configuration.

use std::time::Duration;

use scrawl_tick::ClockConfig;
use serde::{Deserialize, Serialize};

use crate::select::{RandomSelector, RotatingSelector, Selector};
use crate::words::DEFAULT_WORDS;

// ---------------------------------------------------------------------------
// GameConfig
// ---------------------------------------------------------------------------

/// Tuning knobs for one session.
///
/// Every field has a default, and `#[serde(default)]` lets a JSON config
/// file override only the fields it names:
///
/// ```json
/// { "round_secs": 90, "words": ["rocket", "lighthouse"] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Length of a round in seconds (timer start value).
    pub round_secs: u32,

    /// Pause between rounds in seconds.
    pub intermission_secs: u32,

    /// Countdown tick interval in milliseconds.
    pub tick_interval_ms: u64,

    /// Points per remaining second for a correct guess.
    pub score_multiplier: u32,

    /// Minimum roster size to start or continue a round. Never below 2:
    /// a round needs a drawer and at least one guesser.
    pub min_players: usize,

    /// Maximum roster size. Further joins are refused.
    pub max_players: usize,

    /// Display names are truncated to this many characters.
    pub max_name_len: usize,

    /// Chat lines are truncated to this many characters.
    pub max_message_len: usize,

    /// How the next drawer and word are chosen.
    pub selection: SelectionPolicy,

    /// Candidate words. Normalized to uppercase when the word bank is built.
    pub words: Vec<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_secs: 60,
            intermission_secs: 5,
            tick_interval_ms: 1000,
            score_multiplier: 10,
            min_players: 2,
            max_players: 16,
            max_name_len: 24,
            max_message_len: 200,
            selection: SelectionPolicy::Random,
            words: DEFAULT_WORDS.iter().map(|w| w.to_string()).collect(),
        }
    }
}

impl GameConfig {
    /// Clamp out-of-range values so the config is safe to run with.
    pub fn validated(mut self) -> Self {
        self.round_secs = self.round_secs.max(1);
        self.min_players = self.min_players.max(2);
        self.max_players = self.max_players.max(self.min_players);
        self.max_name_len = self.max_name_len.max(1);
        self.max_message_len = self.max_message_len.max(1);
        self
    }

    pub fn intermission(&self) -> Duration {
        Duration::from_secs(u64::from(self.intermission_secs))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Round clock settings derived from this config.
    pub fn clock_config(&self) -> ClockConfig {
        ClockConfig::with_interval(self.tick_interval())
    }
}

// ---------------------------------------------------------------------------
// SelectionPolicy
// ---------------------------------------------------------------------------

/// Built-in drawer/word selection strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Unweighted random drawer and word; repeats allowed.
    #[default]
    Random,
    /// Round-robin drawer in player-id order; never the same word twice in
    /// a row.
    Rotating,
}

impl SelectionPolicy {
    /// Instantiate the strategy.
    pub fn build(self) -> Box<dyn Selector> {
        match self {
            Self::Random => Box::new(RandomSelector::new()),
            Self::Rotating => Box::new(RotatingSelector::new()),
        }
    }
}

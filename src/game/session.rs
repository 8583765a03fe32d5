//! Game state and per-session fields

use serde::{Deserialize, Serialize};

use super::category::Category;
use crate::consts::{DEFAULT_ROUND_TIME_SECS, DEFAULT_TOTAL_ROUNDS};

/// Current phase of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Start screen
    #[default]
    Idle,
    /// Untimed, unscored free drawing
    Drawing,
    /// Timed round with a target
    Playing,
    /// Target guessed; waiting for "next"
    RoundComplete,
    /// Out of rounds or out of time
    GameOver,
}

impl GameState {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::Idle => "idle",
            GameState::Drawing => "drawing",
            GameState::Playing => "playing",
            GameState::RoundComplete => "round-complete",
            GameState::GameOver => "game-over",
        }
    }

    /// States that show the drawing surface
    pub fn shows_canvas(&self) -> bool {
        matches!(self, GameState::Drawing | GameState::Playing)
    }
}

/// Round/score/timer state of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    pub state: GameState,
    pub score: u32,
    pub round: u32,
    pub total_rounds: u32,
    /// Seconds remaining, shared across all rounds of the game
    pub time_left: u32,
    pub target: Option<Category>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(DEFAULT_TOTAL_ROUNDS, DEFAULT_ROUND_TIME_SECS)
    }
}

impl GameSession {
    pub fn new(total_rounds: u32, time_limit_secs: u32) -> Self {
        Self {
            state: GameState::Idle,
            score: 0,
            round: 1,
            total_rounds: total_rounds.max(1),
            time_left: time_limit_secs,
            target: None,
        }
    }

    pub fn is_last_round(&self) -> bool {
        self.round >= self.total_rounds
    }

    /// Target label, empty when no game is running
    pub fn target_label(&self) -> &'static str {
        self.target.map(|c| c.as_str()).unwrap_or("")
    }
}

//! DoodlAI - a timed doodle guessing game
//!
//! Core modules:
//! - `surface`: Raster drawing surface (strokes, erase, compositing, export)
//! - `classifier`: Remote classifier client (health probe, prediction)
//! - `game`: Round/score/timer state machine
//! - `settings`: Startup configuration

pub mod classifier;
pub mod error;
pub mod game;
pub mod settings;
pub mod surface;

pub use classifier::{ApiReadiness, Classifier, HttpClassifier, Prediction};
pub use error::{ClassifyError, GameError, SurfaceError};
pub use game::{Category, GameController, GameSession, GameState};
pub use settings::Settings;
pub use surface::{BrushConfig, BrushMode, RasterSurface};

/// Game configuration constants
pub mod consts {
    use std::time::Duration;

    /// Bitmap edge length (the surface is square)
    pub const SURFACE_SIZE: u32 = 280;

    /// Rounds per game
    pub const DEFAULT_TOTAL_ROUNDS: u32 = 5;
    /// Seconds on the clock at game start (shared across all rounds)
    pub const DEFAULT_ROUND_TIME_SECS: u32 = 60;
    /// Countdown granularity
    pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// Brush width limits
    pub const MIN_BRUSH_WIDTH: u32 = 1;
    pub const MAX_BRUSH_WIDTH: u32 = 30;
    pub const DEFAULT_BRUSH_WIDTH: u32 = 10;

    /// Background fill (white)
    pub const BACKGROUND_RGB: [u8; 3] = [0xFF, 0xFF, 0xFF];
    /// Stroke color (#2c3e50)
    pub const FOREGROUND_RGB: [u8; 3] = [0x2C, 0x3E, 0x50];

    /// File name used by the download action
    pub const DOWNLOAD_FILE_NAME: &str = "doodlai-drawing.png";

    /// Classifier service address
    pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
    /// Per-request timeout for classifier calls
    pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
}

/// Points awarded for a correct guess at the given confidence.
#[inline]
pub fn points_for_probability(probability: f32) -> u32 {
    (probability.clamp(0.0, 1.0) * 100.0).round() as u32
}

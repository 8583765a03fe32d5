//! Game state machine
//!
//! All session state lives in one `GameSession` owned by `GameController`.
//! Time only advances through `GameController::tick`; target selection uses a
//! seeded RNG so a fixed seed replays the same targets.

pub mod category;
pub mod controller;
pub mod session;
pub mod timer;

pub use category::Category;
pub use controller::{AnalyzeOutcome, AnalyzeRequest, GameController, GameEvent};
pub use session::{GameSession, GameState};
pub use timer::CountdownTimer;

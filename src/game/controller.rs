//! Session lifecycle: rounds, countdown, scoring, classifier calls
//!
//! The controller is driven by discrete calls from a single event thread.
//! Classification is split in two halves so the network call can run
//! elsewhere: `begin_analyze` hands out a sequence-numbered request and
//! `complete_analyze` applies the result only if that request is still the
//! newest one and has not been invalidated by a clear or a transition.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::category::Category;
use super::session::{GameSession, GameState};
use super::timer::CountdownTimer;
use crate::classifier::{ApiReadiness, Classifier, Prediction};
use crate::consts::{DOWNLOAD_FILE_NAME, TICK_INTERVAL};
use crate::error::{ClassifyError, GameError};
use crate::points_for_probability;
use crate::settings::Settings;
use crate::surface::{BrushMode, InputDisposition, PointerEvent, RasterSurface, SurfaceRect, TouchEvent};

/// A classification the caller should send to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeRequest {
    pub seq: u64,
    /// PNG data URI of the bitmap at request time
    pub image: String,
}

/// What a completed classification did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeOutcome {
    /// Superseded or invalidated; discarded without effect
    Stale,
    /// The service returned no predictions
    Empty,
    /// Shown to the player, no state change
    Displayed,
    /// Correct guess while playing
    Scored { points: u32 },
}

/// Notable changes reported by time-driven and navigation calls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Tick { time_left: u32 },
    TimeUp { score: u32 },
    RoundStarted { round: u32, target: Category },
    GameOver { score: u32 },
}

pub struct GameController {
    session: GameSession,
    surface: RasterSurface,
    readiness: ApiReadiness,
    prediction: Option<Prediction>,
    last_points: Option<u32>,
    /// Present only while `Playing`
    timer: Option<CountdownTimer>,
    rng: Pcg32,
    total_rounds: u32,
    time_limit_secs: u32,
    tick_interval: Duration,
    /// Sequence number of the newest issued request
    last_issued: u64,
    /// Requests at or below this number are discarded on completion
    invalidated_through: u64,
    outstanding: u32,
    /// Sequence number of the newest health probe
    last_probe: u64,
}

impl GameController {
    pub fn new(total_rounds: u32, time_limit_secs: u32, seed: u64) -> Self {
        Self {
            session: GameSession::new(total_rounds, time_limit_secs),
            surface: RasterSurface::default(),
            readiness: ApiReadiness::Checking,
            prediction: None,
            last_points: None,
            timer: None,
            rng: Pcg32::seed_from_u64(seed),
            total_rounds: total_rounds.max(1),
            time_limit_secs,
            tick_interval: TICK_INTERVAL,
            last_issued: 0,
            invalidated_through: 0,
            outstanding: 0,
            last_probe: 0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(rand::random);
        let mut controller = Self::new(settings.total_rounds, settings.round_time_secs, seed);
        controller.set_brush_width(settings.brush_width);
        controller
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn state(&self) -> GameState {
        self.session.state
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }

    pub fn readiness(&self) -> ApiReadiness {
        self.readiness
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    /// Points earned by the most recent correct guess
    pub fn last_points(&self) -> Option<u32> {
        self.last_points
    }

    /// True while at least one classification has not completed
    pub fn is_loading(&self) -> bool {
        self.outstanding > 0
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    /// Displayed prediction names the current target during a game
    pub fn prediction_matches_target(&self) -> bool {
        matches!(self.session.state, GameState::Playing | GameState::RoundComplete)
            && match (&self.prediction, self.session.target) {
                (Some(p), Some(target)) => target.matches(&p.category),
                _ => false,
            }
    }

    // ------------------------------------------------------------------
    // Readiness
    // ------------------------------------------------------------------

    pub fn set_readiness(&mut self, readiness: ApiReadiness) {
        if readiness != self.readiness {
            log::info!("API status: {} -> {}", self.readiness.label(), readiness.label());
        }
        self.readiness = readiness;
    }

    /// Mark readiness as `Checking` and number a new health probe.
    /// Earlier probes still in flight are superseded.
    pub fn begin_readiness_check(&mut self) -> u64 {
        self.set_readiness(ApiReadiness::Checking);
        self.last_probe += 1;
        self.last_probe
    }

    /// Apply the result of probe `seq`. Returns false if a newer probe was issued.
    pub fn complete_readiness_check(&mut self, seq: u64, readiness: ApiReadiness) -> bool {
        if seq != self.last_probe {
            log::debug!("Discarding stale health probe #{seq} (latest #{})", self.last_probe);
            return false;
        }
        self.set_readiness(readiness);
        true
    }

    /// Probe the service now (initial check or explicit retry)
    pub fn refresh_readiness<C: Classifier + ?Sized>(&mut self, classifier: &C) -> ApiReadiness {
        let seq = self.begin_readiness_check();
        self.complete_readiness_check(seq, classifier.check_health());
        self.readiness
    }

    // ------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------

    /// Idle/GameOver -> Playing with a fresh session
    pub fn start_game(&mut self, now: Instant) -> Result<GameEvent, GameError> {
        let state = self.session.state;
        if !matches!(state, GameState::Idle | GameState::GameOver) {
            return Err(GameError::InvalidTransition { action: "start a game", state });
        }
        if !self.readiness.is_ready() {
            return Err(GameError::NotReady(self.readiness));
        }

        let target = Category::random(&mut self.rng);
        self.session = GameSession {
            state,
            target: Some(target),
            ..GameSession::new(self.total_rounds, self.time_limit_secs)
        };
        self.last_points = None;
        self.clear_canvas();
        self.enter_playing(now);
        log::info!("Round 1/{}: draw a {}", self.session.total_rounds, target);
        Ok(GameEvent::RoundStarted { round: 1, target })
    }

    /// Idle -> Drawing (untimed, unscored)
    pub fn free_draw(&mut self) -> Result<(), GameError> {
        match self.session.state {
            GameState::Idle => {
                self.leave_to(GameState::Drawing);
                Ok(())
            }
            GameState::Drawing => Ok(()),
            state => Err(GameError::InvalidTransition { action: "free draw", state }),
        }
    }

    /// RoundComplete -> Playing (next target) or GameOver after the last round
    pub fn next_round(&mut self, now: Instant) -> Result<GameEvent, GameError> {
        let state = self.session.state;
        if state != GameState::RoundComplete {
            return Err(GameError::InvalidTransition { action: "advance the round", state });
        }
        if self.session.is_last_round() {
            self.leave_to(GameState::GameOver);
            log::info!("Game over, final score {}", self.session.score);
            return Ok(GameEvent::GameOver { score: self.session.score });
        }

        let target = Category::random(&mut self.rng);
        self.session.round += 1;
        self.session.target = Some(target);
        self.clear_canvas();
        self.enter_playing(now);
        log::info!("Round {}/{}: draw a {}", self.session.round, self.session.total_rounds, target);
        Ok(GameEvent::RoundStarted { round: self.session.round, target })
    }

    /// Any state -> Idle; the session is abandoned
    pub fn go_home(&mut self) {
        self.leave_to(GameState::Idle);
        self.session = GameSession::new(self.total_rounds, self.time_limit_secs);
        self.prediction = None;
        self.last_points = None;
        self.invalidate_pending();
    }

    /// Advance the countdown. Only does anything while `Playing`.
    pub fn tick(&mut self, now: Instant) -> Option<GameEvent> {
        let fired = self.timer.as_mut()?.poll(now);
        if fired == 0 {
            return None;
        }
        self.session.time_left = self.session.time_left.saturating_sub(fired);
        if self.session.time_left == 0 {
            self.leave_to(GameState::GameOver);
            log::info!("Time's up, final score {}", self.session.score);
            Some(GameEvent::TimeUp { score: self.session.score })
        } else {
            Some(GameEvent::Tick { time_left: self.session.time_left })
        }
    }

    fn enter_playing(&mut self, now: Instant) {
        self.log_transition(GameState::Playing);
        self.session.state = GameState::Playing;
        self.timer = Some(CountdownTimer::start(now, self.tick_interval));
    }

    /// Every exit from `Playing` goes through here, which drops the timer
    fn leave_to(&mut self, next: GameState) {
        debug_assert_ne!(next, GameState::Playing);
        self.log_transition(next);
        self.session.state = next;
        self.timer = None;
    }

    fn log_transition(&self, next: GameState) {
        if self.session.state != next {
            log::info!("Game state: {} -> {}", self.session.state.as_str(), next.as_str());
        }
    }

    // ------------------------------------------------------------------
    // Canvas
    // ------------------------------------------------------------------

    /// Clear the bitmap; the displayed prediction and in-flight requests go with it
    pub fn clear_canvas(&mut self) {
        self.surface.reset();
        self.prediction = None;
        self.invalidate_pending();
    }

    pub fn handle_pointer(&mut self, event: PointerEvent, rect: &SurfaceRect) -> InputDisposition {
        if !self.session.state.shows_canvas() {
            return InputDisposition::Default;
        }
        self.surface.handle_pointer(event, rect)
    }

    pub fn handle_touch(&mut self, event: &TouchEvent, rect: &SurfaceRect) -> InputDisposition {
        if !self.session.state.shows_canvas() {
            return InputDisposition::Default;
        }
        self.surface.handle_touch(event, rect)
    }

    pub fn set_brush_width(&mut self, width: u32) {
        self.surface.brush_mut().set_width(width);
    }

    pub fn adjust_brush_width(&mut self, delta: i32) {
        self.surface.brush_mut().adjust_width(delta);
    }

    pub fn set_brush_mode(&mut self, mode: BrushMode) {
        self.surface.brush_mut().mode = mode;
    }

    pub fn toggle_erase(&mut self) -> BrushMode {
        let brush = self.surface.brush_mut();
        brush.mode = brush.mode.toggled();
        brush.mode
    }

    /// Save the bitmap as `<dir>/doodlai-drawing.png`
    pub fn download(&self, dir: &Path) -> Result<PathBuf, GameError> {
        let path = dir.join(DOWNLOAD_FILE_NAME);
        self.surface.save_png(&path)?;
        log::info!("Drawing saved to {}", path.display());
        Ok(path)
    }

    // ------------------------------------------------------------------
    // Classification
    // ------------------------------------------------------------------

    /// Check preconditions and snapshot the bitmap for a classification.
    /// Nothing is sent when this fails.
    pub fn begin_analyze(&mut self) -> Result<AnalyzeRequest, GameError> {
        if !self.readiness.is_ready() {
            return Err(GameError::NotReady(self.readiness));
        }
        let image = self
            .surface
            .export_encoded()
            .map_err(|e| GameError::Export(e.to_string()))?;
        self.last_issued += 1;
        self.outstanding += 1;
        Ok(AnalyzeRequest { seq: self.last_issued, image })
    }

    /// Apply the result of request `seq`
    pub fn complete_analyze(
        &mut self,
        seq: u64,
        result: Result<Vec<Prediction>, ClassifyError>,
    ) -> Result<AnalyzeOutcome, GameError> {
        self.outstanding = self.outstanding.saturating_sub(1);
        if seq != self.last_issued || seq <= self.invalidated_through {
            log::debug!("Discarding stale classification #{seq} (latest #{})", self.last_issued);
            return Ok(AnalyzeOutcome::Stale);
        }

        let predictions = result.map_err(|e| {
            log::warn!("Prediction error: {e}");
            GameError::Classification(e)
        })?;
        let Some(top) = predictions.into_iter().next() else {
            return Ok(AnalyzeOutcome::Empty);
        };

        let correct = self.session.state == GameState::Playing
            && self.session.target.is_some_and(|t| t.matches(&top.category));
        let outcome = if correct {
            let points = points_for_probability(top.probability);
            self.session.score += points;
            self.last_points = Some(points);
            self.leave_to(GameState::RoundComplete);
            log::info!("Correct! {} (+{points}, score {})", top.category, self.session.score);
            AnalyzeOutcome::Scored { points }
        } else {
            log::info!("Prediction: {} ({}%)", top.category, top.confidence_percent());
            AnalyzeOutcome::Displayed
        };
        self.prediction = Some(top);
        Ok(outcome)
    }

    /// Begin, classify inline, complete
    pub fn analyze_with<C: Classifier + ?Sized>(&mut self, classifier: &C) -> Result<AnalyzeOutcome, GameError> {
        let request = self.begin_analyze()?;
        let result = classifier.classify(&request.image);
        self.complete_analyze(request.seq, result)
    }

    /// Composite an uploaded image (raw bytes or data-URI text) and start a
    /// classification of it. Fails with `GameError::Decode` before touching
    /// the bitmap when the input is not an image.
    pub fn ingest(&mut self, bytes: &[u8]) -> Result<AnalyzeRequest, GameError> {
        let placement = self.surface.composite_encoded(bytes)?;
        log::info!(
            "Uploaded image placed at ({}, {}) {}x{}",
            placement.x,
            placement.y,
            placement.width,
            placement.height
        );
        self.begin_analyze()
    }

    /// Like `ingest`, but undecodable input is dropped silently (`Ok(None)`)
    pub fn upload(&mut self, bytes: &[u8]) -> Result<Option<AnalyzeRequest>, GameError> {
        match self.ingest(bytes) {
            Ok(request) => Ok(Some(request)),
            Err(GameError::Decode(msg)) => {
                log::warn!("Upload ignored: {msg}");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn upload_with<C: Classifier + ?Sized>(
        &mut self,
        bytes: &[u8],
        classifier: &C,
    ) -> Result<Option<AnalyzeOutcome>, GameError> {
        let Some(request) = self.upload(bytes)? else {
            return Ok(None);
        };
        let result = classifier.classify(&request.image);
        self.complete_analyze(request.seq, result).map(Some)
    }

    fn invalidate_pending(&mut self) {
        self.invalidated_through = self.last_issued;
    }

    /// One-line summary for a status bar
    pub fn status_line(&self) -> String {
        let mut line = format!("{} | {}", self.readiness.label(), self.session.state.as_str());
        if matches!(
            self.session.state,
            GameState::Playing | GameState::RoundComplete | GameState::GameOver
        ) {
            line.push_str(&format!(
                " | Draw: {} | Score {} | Round {}/{} | {}s",
                self.session.target_label(),
                self.session.score,
                self.session.round,
                self.session.total_rounds,
                self.session.time_left
            ));
        }
        let brush = self.surface.brush();
        line.push_str(&format!(" | {} {}px", brush.mode.as_str(), brush.width()));
        if self.is_loading() {
            line.push_str(" | analyzing...");
        } else if let Some(p) = &self.prediction {
            line.push_str(&format!(" | AI: {} {}%", p.category, p.confidence_percent()));
        }
        line
    }
}

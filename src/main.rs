//! DoodlAI native front-end
//!
//! A minifb window around the drawing surface. Mouse draws; keys drive the game:
//!
//! - Enter: start / play again        - F: free draw      - H: home
//! - Space: analyze                   - N: next round     - C: clear
//! - E: toggle eraser                 - [ / ]: brush size - D: download
//! - U: upload the image given on the command line        - R: retry API
//! - Esc: quit
//!
//! The game state and status line are shown in the window title.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use glam::Vec2;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

use doodlai::classifier::{ApiReadiness, Classifier, HttpClassifier, Prediction};
use doodlai::consts::SURFACE_SIZE;
use doodlai::error::{ClassifyError, GameError};
use doodlai::game::{AnalyzeOutcome, AnalyzeRequest, GameController, GameEvent, GameState};
use doodlai::surface::{PointerEvent, SurfaceRect};
use doodlai::Settings;

/// Gap around the canvas inside the window
const MARGIN: usize = 20;
const WINDOW_W: usize = SURFACE_SIZE as usize + 2 * MARGIN;
const WINDOW_H: usize = SURFACE_SIZE as usize + 2 * MARGIN;

/// Results coming back from background network calls
enum Completion {
    Health { seq: u64, readiness: ApiReadiness },
    Classified {
        seq: u64,
        result: Result<Vec<Prediction>, ClassifyError>,
    },
}

/// Turns polled mouse state into pointer down/move/up/leave events
#[derive(Default)]
struct PointerTracker {
    button_was_down: bool,
    stroking: bool,
}

impl PointerTracker {
    fn update(&mut self, pos: Option<Vec2>, down: bool, rect: &SurfaceRect) -> Option<PointerEvent> {
        let inside = pos.filter(|p| rect.contains(*p));
        let pressed = down && !self.button_was_down;
        self.button_was_down = down;

        match (self.stroking, inside) {
            (false, Some(p)) if pressed => {
                self.stroking = true;
                Some(PointerEvent::Down(p))
            }
            (true, _) if !down => {
                self.stroking = false;
                Some(PointerEvent::Up)
            }
            (true, Some(p)) => Some(PointerEvent::Move(p)),
            (true, None) => {
                self.stroking = false;
                Some(PointerEvent::Leave)
            }
            _ => None,
        }
    }
}

/// Window, controller and the channel to background requests
struct App {
    window: Window,
    buffer: Vec<u32>,
    controller: GameController,
    classifier: Arc<HttpClassifier>,
    completions_tx: Sender<Completion>,
    completions_rx: Receiver<Completion>,
    pointer: PointerTracker,
    canvas_rect: SurfaceRect,
    upload_path: Option<PathBuf>,
    title: String,
}

impl App {
    fn new(settings: &Settings, upload_path: Option<PathBuf>) -> Result<Self, minifb::Error> {
        let mut window = Window::new("DoodlAI", WINDOW_W, WINDOW_H, WindowOptions::default())?;
        window.set_target_fps(60);
        let (completions_tx, completions_rx) = mpsc::channel();
        let classifier = HttpClassifier::new(
            settings.api_base_url.clone(),
            Duration::from_secs(settings.request_timeout_secs),
        );

        Ok(Self {
            window,
            buffer: vec![0; WINDOW_W * WINDOW_H],
            controller: GameController::from_settings(settings),
            classifier: Arc::new(classifier),
            completions_tx,
            completions_rx,
            pointer: PointerTracker::default(),
            canvas_rect: SurfaceRect::new(Vec2::splat(MARGIN as f32), Vec2::splat(SURFACE_SIZE as f32)),
            upload_path,
            title: String::new(),
        })
    }

    fn run(&mut self) -> Result<(), minifb::Error> {
        self.spawn_health_probe();
        while self.window.is_open() && !self.window.is_key_down(Key::Escape) {
            self.drain_completions();
            if let Some(event) = self.controller.tick(Instant::now()) {
                self.report_event(event);
            }
            self.handle_mouse();
            self.handle_keys();
            self.present()?;
        }
        Ok(())
    }

    fn spawn_health_probe(&mut self) {
        let seq = self.controller.begin_readiness_check();
        let classifier = Arc::clone(&self.classifier);
        let tx = self.completions_tx.clone();
        std::thread::spawn(move || {
            let readiness = classifier.check_health();
            let _ = tx.send(Completion::Health { seq, readiness });
        });
    }

    fn spawn_classification(&self, request: AnalyzeRequest) {
        let classifier = Arc::clone(&self.classifier);
        let tx = self.completions_tx.clone();
        std::thread::spawn(move || {
            let result = classifier.classify(&request.image);
            let _ = tx.send(Completion::Classified { seq: request.seq, result });
        });
    }

    fn drain_completions(&mut self) {
        while let Ok(completion) = self.completions_rx.try_recv() {
            match completion {
                Completion::Health { seq, readiness } => {
                    self.controller.complete_readiness_check(seq, readiness);
                }
                Completion::Classified { seq, result } => {
                    match self.controller.complete_analyze(seq, result) {
                        Ok(AnalyzeOutcome::Scored { points }) => {
                            log::info!("Great job! You earned {points} points (N for next round)");
                        }
                        Ok(_) => {}
                        Err(e) => self.notify(&e),
                    }
                }
            }
        }
    }

    fn handle_mouse(&mut self) {
        let pos = self
            .window
            .get_mouse_pos(MouseMode::Discard)
            .map(|(x, y)| Vec2::new(x, y));
        let down = self.window.get_mouse_down(MouseButton::Left);
        if let Some(event) = self.pointer.update(pos, down, &self.canvas_rect) {
            self.controller.handle_pointer(event, &self.canvas_rect);
        }
    }

    fn handle_keys(&mut self) {
        let now = Instant::now();
        let pressed = |window: &Window, key| window.is_key_pressed(key, KeyRepeat::No);

        if pressed(&self.window, Key::Enter) {
            match self.controller.start_game(now) {
                Ok(event) => self.report_event(event),
                Err(e) => self.notify(&e),
            }
        }
        if pressed(&self.window, Key::F) {
            if let Err(e) = self.controller.free_draw() {
                self.notify(&e);
            }
        }
        if pressed(&self.window, Key::N) {
            match self.controller.next_round(now) {
                Ok(event) => self.report_event(event),
                Err(e) => self.notify(&e),
            }
        }
        if pressed(&self.window, Key::H) {
            self.controller.go_home();
        }
        if pressed(&self.window, Key::Space) {
            match self.controller.begin_analyze() {
                Ok(request) => self.spawn_classification(request),
                Err(e) => self.notify(&e),
            }
        }
        if pressed(&self.window, Key::C) {
            self.controller.clear_canvas();
        }
        if pressed(&self.window, Key::E) {
            let mode = self.controller.toggle_erase();
            log::info!("Brush mode: {}", mode.as_str());
        }
        if self.window.is_key_pressed(Key::LeftBracket, KeyRepeat::Yes) {
            self.controller.adjust_brush_width(-1);
        }
        if self.window.is_key_pressed(Key::RightBracket, KeyRepeat::Yes) {
            self.controller.adjust_brush_width(1);
        }
        if pressed(&self.window, Key::D) {
            match std::env::current_dir() {
                Ok(dir) => {
                    if let Err(e) = self.controller.download(&dir) {
                        self.notify(&e);
                    }
                }
                Err(e) => self.notify(&GameError::Io(e)),
            }
        }
        if pressed(&self.window, Key::U) {
            self.upload();
        }
        if pressed(&self.window, Key::R) {
            self.spawn_health_probe();
        }
    }

    fn upload(&mut self) {
        let Some(path) = self.upload_path.clone() else {
            log::warn!("No image given on the command line to upload");
            return;
        };
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Could not read {}: {e}", path.display());
                return;
            }
        };
        match self.controller.upload(&bytes) {
            Ok(Some(request)) => self.spawn_classification(request),
            Ok(None) => {}
            Err(e) => self.notify(&e),
        }
    }

    fn report_event(&self, event: GameEvent) {
        match event {
            GameEvent::RoundStarted { round, target } => {
                log::info!("Round {round}: draw a {target}");
            }
            GameEvent::TimeUp { score } | GameEvent::GameOver { score } => {
                log::info!("Game Over! Final Score: {score} (Enter to play again, H for home)");
            }
            GameEvent::Tick { .. } => {}
        }
    }

    /// User-visible notice for a failed action
    fn notify(&self, error: &GameError) {
        log::warn!("{error}");
    }

    fn frame_color(&self) -> u32 {
        match self.controller.state() {
            GameState::Idle => 0x00_95_A5_A6,
            GameState::Drawing => 0x00_34_98_DB,
            GameState::Playing if self.controller.prediction_matches_target() => 0x00_2E_CC_71,
            GameState::Playing => 0x00_2C_3E_50,
            GameState::RoundComplete => 0x00_2E_CC_71,
            GameState::GameOver => 0x00_E7_4C_3C,
        }
    }

    fn present(&mut self) -> Result<(), minifb::Error> {
        let frame_color = self.frame_color();
        self.buffer.fill(frame_color);
        self.controller
            .surface()
            .blit_argb(&mut self.buffer, WINDOW_W, (MARGIN, MARGIN));

        let title = format!("DoodlAI | {}", self.controller.status_line());
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
        self.window.update_with_buffer(&self.buffer, WINDOW_W, WINDOW_H)
    }
}

fn main() {
    env_logger::init();
    log::info!("DoodlAI starting...");

    let settings = Settings::load();
    let upload_path = std::env::args_os().nth(1).map(PathBuf::from);
    log::info!("Classifier at {}", settings.api_base_url);

    let result = App::new(&settings, upload_path).and_then(|mut app| app.run());
    if let Err(e) = result {
        log::error!("Window error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect() -> SurfaceRect {
        SurfaceRect::new(Vec2::splat(20.0), Vec2::splat(280.0))
    }

    #[test]
    fn test_pointer_press_drag_release() {
        let mut tracker = PointerTracker::default();
        let p = Vec2::new(50.0, 50.0);
        assert_eq!(tracker.update(Some(p), false, &rect()), None);
        assert_eq!(tracker.update(Some(p), true, &rect()), Some(PointerEvent::Down(p)));
        let q = Vec2::new(60.0, 70.0);
        assert_eq!(tracker.update(Some(q), true, &rect()), Some(PointerEvent::Move(q)));
        assert_eq!(tracker.update(Some(q), false, &rect()), Some(PointerEvent::Up));
        assert_eq!(tracker.update(Some(q), false, &rect()), None);
    }

    #[test]
    fn test_pointer_leave_ends_stroke_until_next_press() {
        let mut tracker = PointerTracker::default();
        let inside = Vec2::new(50.0, 50.0);
        tracker.update(Some(inside), true, &rect());
        assert_eq!(tracker.update(Some(Vec2::new(5.0, 5.0)), true, &rect()), Some(PointerEvent::Leave));
        assert_eq!(tracker.update(Some(inside), true, &rect()), None);
        assert_eq!(tracker.update(None, false, &rect()), None);
        assert_eq!(tracker.update(Some(inside), true, &rect()), Some(PointerEvent::Down(inside)));
    }

    #[test]
    fn test_press_outside_canvas_is_ignored() {
        let mut tracker = PointerTracker::default();
        assert_eq!(tracker.update(Some(Vec2::new(1.0, 1.0)), true, &rect()), None);
        assert_eq!(tracker.update(Some(Vec2::new(50.0, 50.0)), true, &rect()), None);
    }
}

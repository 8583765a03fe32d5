//! Brush settings applied to new strokes

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_BRUSH_WIDTH, MAX_BRUSH_WIDTH, MIN_BRUSH_WIDTH};

/// Whether strokes lay down ink or paint the background back over it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BrushMode {
    #[default]
    Draw,
    Erase,
}

impl BrushMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrushMode::Draw => "Draw",
            BrushMode::Erase => "Erase",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            BrushMode::Draw => BrushMode::Erase,
            BrushMode::Erase => BrushMode::Draw,
        }
    }
}

/// Current width/mode. Only changed by explicit user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushConfig {
    width: u32,
    pub mode: BrushMode,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_BRUSH_WIDTH,
            mode: BrushMode::Draw,
        }
    }
}

impl BrushConfig {
    /// Create a draw-mode brush; width is clamped into the supported range
    pub fn new(width: u32) -> Self {
        Self {
            width: clamp_width(width),
            mode: BrushMode::Draw,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn set_width(&mut self, width: u32) {
        self.width = clamp_width(width);
    }

    /// Grow/shrink by `delta`, staying in range
    pub fn adjust_width(&mut self, delta: i32) {
        let next = (self.width as i64 + delta as i64).max(0) as u32;
        self.set_width(next);
    }

    pub fn is_erasing(&self) -> bool {
        self.mode == BrushMode::Erase
    }

    /// Paint color for this brush given the surface palette
    pub fn color(&self, foreground: [u8; 3], background: [u8; 3]) -> [u8; 3] {
        match self.mode {
            BrushMode::Draw => foreground,
            BrushMode::Erase => background,
        }
    }
}

#[inline]
fn clamp_width(width: u32) -> u32 {
    width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_is_clamped() {
        assert_eq!(BrushConfig::new(0).width(), 1);
        assert_eq!(BrushConfig::new(99).width(), 30);

        let mut brush = BrushConfig::default();
        assert_eq!(brush.width(), 10);
        brush.adjust_width(-50);
        assert_eq!(brush.width(), 1);
        brush.adjust_width(5);
        assert_eq!(brush.width(), 6);
    }

    #[test]
    fn test_erase_uses_background() {
        let fg = [1, 2, 3];
        let bg = [255, 255, 255];
        let mut brush = BrushConfig::default();
        assert_eq!(brush.color(fg, bg), fg);
        brush.mode = brush.mode.toggled();
        assert!(brush.is_erasing());
        assert_eq!(brush.color(fg, bg), bg);
    }
}

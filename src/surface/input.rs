//! Pointer/touch events in viewport space and their mapping to bitmap space

use glam::Vec2;

/// Mouse/pen events, positions in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up,
    /// Pointer left the surface; ends any stroke like `Up`
    Leave,
}

/// Touch events carrying every active contact; only the first is used
#[derive(Debug, Clone, PartialEq)]
pub enum TouchEvent {
    Start(Vec<Vec2>),
    Move(Vec<Vec2>),
    End,
}

impl TouchEvent {
    /// Translate to the equivalent pointer event (primary contact only).
    /// `None` when a start/move carries no contacts.
    pub fn to_pointer(&self) -> Option<PointerEvent> {
        match self {
            TouchEvent::Start(points) => points.first().map(|p| PointerEvent::Down(*p)),
            TouchEvent::Move(points) => points.first().map(|p| PointerEvent::Move(*p)),
            TouchEvent::End => Some(PointerEvent::Up),
        }
    }
}

/// What the platform should do with the event after the surface saw it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputDisposition {
    /// Let default handling run
    Default,
    /// Suppress scroll/zoom gestures (touch input on the surface)
    PreventDefault,
}

/// On-screen placement of the surface in viewport space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceRect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl SurfaceRect {
    pub fn new(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    /// Surface drawn at the viewport origin with its native size
    pub fn at_origin(size: f32) -> Self {
        Self::new(Vec2::ZERO, Vec2::splat(size))
    }

    /// Viewport point to surface-local point
    #[inline]
    pub fn to_local(&self, viewport: Vec2) -> Vec2 {
        viewport - self.origin
    }

    pub fn contains(&self, viewport: Vec2) -> bool {
        let local = self.to_local(viewport);
        local.x >= 0.0 && local.y >= 0.0 && local.x < self.size.x && local.y < self.size.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_local_subtracts_offset() {
        let rect = SurfaceRect::new(Vec2::new(20.0, 60.0), Vec2::splat(280.0));
        assert_eq!(rect.to_local(Vec2::new(25.0, 70.0)), Vec2::new(5.0, 10.0));
        assert!(rect.contains(Vec2::new(20.0, 60.0)));
        assert!(!rect.contains(Vec2::new(19.0, 100.0)));
        assert!(!rect.contains(Vec2::new(300.0, 340.0)));
    }

    #[test]
    fn test_touch_uses_primary_contact() {
        let touch = TouchEvent::Move(vec![Vec2::new(1.0, 2.0), Vec2::new(50.0, 50.0)]);
        assert_eq!(touch.to_pointer(), Some(PointerEvent::Move(Vec2::new(1.0, 2.0))));
        assert_eq!(TouchEvent::Move(Vec::new()).to_pointer(), None);
        assert_eq!(TouchEvent::End.to_pointer(), Some(PointerEvent::Up));
    }
}

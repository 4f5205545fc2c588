// Pointer bookkeeping for the DOM listeners. Kept free of web-sys so the
// host tests can include it directly.

use arp_core::{Position, Viewport};
use glam::Vec2;

/// What a raw pointer event means for the instrument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerAction {
    Down,
    Move,
    Up,
    Ignore,
}

impl PointerAction {
    /// Presses and drags we own must not also scroll, pan or pull-to-refresh the page.
    #[inline]
    pub fn claims_default(self) -> bool {
        matches!(self, PointerAction::Down | PointerAction::Move)
    }
}

// Applied to <body>. Without `touch-action: none` a touch drag becomes a page
// pan and the browser answers it with `pointercancel`.
pub const GESTURE_SURFACE_STYLES: [(&str, &str); 3] = [
    ("touch-action", "none"),
    ("overscroll-behavior", "none"),
    ("user-select", "none"),
];

/// Tracks which pointer owns the current gesture.
///
/// Only one pointer drives the instrument at a time: the first primary
/// pointer to go down. Other fingers and stray mouse moves are ignored
/// until it is released or cancelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PointerTracker {
    held: Option<i32>,
}

impl PointerTracker {
    pub fn down(&mut self, pointer_id: i32, is_primary: bool) -> PointerAction {
        if !is_primary || self.held.is_some() {
            return PointerAction::Ignore;
        }
        self.held = Some(pointer_id);
        PointerAction::Down
    }

    pub fn moved(&self, pointer_id: i32) -> PointerAction {
        if self.held == Some(pointer_id) {
            PointerAction::Move
        } else {
            PointerAction::Ignore
        }
    }

    /// `pointerup` and `pointercancel` both end the gesture.
    pub fn up(&mut self, pointer_id: i32) -> PointerAction {
        if self.held == Some(pointer_id) {
            self.held = None;
            PointerAction::Up
        } else {
            PointerAction::Ignore
        }
    }

    #[inline]
    pub fn is_held(&self) -> bool {
        self.held.is_some()
    }
}

/// Client coordinates relative to the top-left corner of `origin`.
#[inline]
pub fn client_to_position(client: Vec2, origin: Vec2) -> Option<Position> {
    let p = client - origin;
    p.is_finite().then(|| Position::new(p.x, p.y))
}

/// Viewport from `window.innerWidth/innerHeight`, which come back as loosely typed numbers.
#[inline]
pub fn viewport_from_inner(width: Option<f64>, height: Option<f64>) -> Viewport {
    let sane = |v: Option<f64>| v.filter(|v| v.is_finite() && *v > 0.0).unwrap_or(0.0) as f32;
    Viewport::new(sane(width), sane(height))
}

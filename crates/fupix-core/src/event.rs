#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! DOM events are normalized into these types by the host before they reach
//! any controller. Gesture interpretation (which way the user wants to go)
//! is centralized here so every input modality is classified identically.
//!
//! # Design Notes
//!
//! - Wheel deltas follow DOM sign conventions: positive `delta_y` scrolls down.
//! - Touch deltas are measured from the last touch start (or the last
//!   intercepted swipe), so one long swipe triggers at most one transition.
//! - Keys are normalized from the DOM `key` attribute, not `code`, matching
//!   what layout-aware browsers report for Space and the arrow keys.

use bitflags::bitflags;

/// Minimum vertical travel (px) before a touch move counts as a swipe.
pub const TOUCH_SWIPE_THRESHOLD: f32 = 30.0;

/// Minimum horizontal travel (px) for a gallery swipe.
pub const HORIZONTAL_SWIPE_THRESHOLD: f32 = 50.0;

bitflags! {
    /// Modifier keys held during a key event.
    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Normalized key code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Escape,
    Tab,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    Unidentified(Box<str>),
}

impl KeyCode {
    /// Normalize a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "ArrowUp" | "Up" => Self::Up,
            "ArrowDown" | "Down" => Self::Down,
            "ArrowLeft" | "Left" => Self::Left,
            "ArrowRight" | "Right" => Self::Right,
            "PageUp" => Self::PageUp,
            "PageDown" => Self::PageDown,
            "Enter" => Self::Enter,
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Home" => Self::Home,
            "End" => Self::End,
            "Spacebar" => Self::Char(' '),
            _ => {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Char(c),
                    _ => Self::Unidentified(key.into()),
                }
            }
        }
    }

    /// Whether this key activates a focused control (Enter or Space).
    #[must_use]
    pub fn is_activation(&self) -> bool {
        matches!(self, Self::Enter | Self::Char(' '))
    }
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Builder: attach modifiers.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Canonical input event delivered to gesture-gated controllers.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Wheel scroll with DOM `deltaY`.
    Wheel { delta_y: f32 },
    /// First finger touched down at `y` (client coordinates).
    TouchStart { y: f32 },
    /// First finger moved to `y` (client coordinates).
    TouchMove { y: f32 },
    /// Key pressed.
    Key(KeyEvent),
}

/// The navigation intent of a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollDirection {
    /// Toward later panels (scroll down).
    Forward,
    /// Toward earlier panels (scroll up).
    Backward,
}

impl ScrollDirection {
    /// Classify a wheel delta. Zero is not a gesture.
    #[must_use]
    pub fn from_wheel(delta_y: f32) -> Option<Self> {
        if delta_y > 0.0 {
            Some(Self::Forward)
        } else if delta_y < 0.0 {
            Some(Self::Backward)
        } else {
            None
        }
    }

    /// Classify a key: ArrowDown/Space/PageDown go forward, ArrowUp/PageUp back.
    #[must_use]
    pub fn from_key(code: &KeyCode) -> Option<Self> {
        match code {
            KeyCode::Down | KeyCode::Char(' ') | KeyCode::PageDown => Some(Self::Forward),
            KeyCode::Up | KeyCode::PageUp => Some(Self::Backward),
            _ => None,
        }
    }
}

/// Tracks the reference point for vertical swipe detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchTracker {
    start_y: f32,
    threshold: f32,
}

impl Default for TouchTracker {
    fn default() -> Self {
        Self::new(TOUCH_SWIPE_THRESHOLD)
    }
}

impl TouchTracker {
    #[must_use]
    pub fn new(threshold: f32) -> Self {
        Self {
            start_y: 0.0,
            threshold: threshold.abs(),
        }
    }

    /// Record a touch start.
    pub fn begin(&mut self, y: f32) {
        self.start_y = y;
    }

    /// Move the reference point so the current swipe does not fire twice.
    pub fn rebase(&mut self, y: f32) {
        self.start_y = y;
    }

    /// Direction of the swipe ending at `y`, if it travelled past the threshold.
    ///
    /// Finger moving up (decreasing `y`) scrolls the page forward.
    #[must_use]
    pub fn direction(&self, y: f32) -> Option<ScrollDirection> {
        let delta = self.start_y - y;
        if delta > self.threshold {
            Some(ScrollDirection::Forward)
        } else if delta < -self.threshold {
            Some(ScrollDirection::Backward)
        } else {
            None
        }
    }
}

/// Horizontal swipe intent (gallery navigation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    /// Finger moved right-to-left: show the next item.
    Left,
    /// Finger moved left-to-right: show the previous item.
    Right,
}

/// Classify a completed horizontal swipe from `start_x` to `end_x`.
#[must_use]
pub fn horizontal_swipe(start_x: f32, end_x: f32, threshold: f32) -> Option<SwipeDirection> {
    let diff = start_x - end_x;
    if diff.abs() < threshold {
        None
    } else if diff > 0.0 {
        Some(SwipeDirection::Left)
    } else {
        Some(SwipeDirection::Right)
    }
}

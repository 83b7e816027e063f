//! Input abstraction layer.
//!
//! Normalizes pointer and keyboard events from the host toolkit into an
//! `InputEvent` consumed by the interaction controller. Pointer positions are
//! screen coordinates relative to the canvas element; the host also reports
//! what the pointer went down on, since only it knows where handles are drawn.

use studio_core::{LayerId, Point, ResizeHandle};

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CMD: Modifiers = Modifiers {
        meta: true,
        ..Modifiers::NONE
    };

    /// ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What sits under the pointer when it goes down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// Empty canvas, or anything the host could not classify. The
    /// controller hit-tests these itself.
    Canvas,
    /// The body of a layer.
    Layer(LayerId),
    /// A resize handle of a selected layer.
    Handle(LayerId, ResizeHandle),
    /// The rotation handle of a selected layer.
    RotationHandle(LayerId),
    /// A handle of the active crop rectangle.
    CropHandle(ResizeHandle),
}

/// A keyboard event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// `KeyboardEvent.key` style value (`"z"`, `"Delete"`, `"Escape"`).
    pub key: String,
    pub modifiers: Modifiers,
    /// Focus is in a text-entry control; such events never become actions.
    pub in_text_input: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            in_text_input: false,
        }
    }

    pub fn in_text_input(mut self) -> Self {
        self.in_text_input = true;
        self
    }
}

/// A normalized input event.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        screen: Point,
        target: PointerTarget,
        modifiers: Modifiers,
    },
    PointerMove {
        screen: Point,
    },
    PointerUp {
        screen: Point,
    },
    /// Abort the active gesture (Escape, focus loss).
    Cancel,
    Key(KeyEvent),
}

impl InputEvent {
    pub fn down(x: f64, y: f64, target: PointerTarget) -> Self {
        Self::PointerDown {
            screen: Point::new(x, y),
            target,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::PointerMove {
            screen: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            screen: Point::new(x, y),
        }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key(KeyEvent::new(key, modifiers))
    }

    /// Extract position if this is a pointer event.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { screen, .. }
            | Self::PointerMove { screen }
            | Self::PointerUp { screen } => Some(*screen),
            _ => None,
        }
    }
}

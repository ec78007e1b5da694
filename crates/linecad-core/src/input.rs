//! Input event vocabulary for pointer gestures.
//!
//! Positions are in screen (device) coordinates; modes convert to world
//! coordinates through the camera.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Keys the interaction modes react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Delete,
    Backspace,
}

/// A pointer press or release.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PointerInput {
    /// Position in screen coordinates.
    pub position: Point,
    /// Button that changed state.
    pub button: MouseButton,
    /// Modifier keys held at the time of the event.
    pub modifiers: Modifiers,
}

impl PointerInput {
    /// Create a pointer event with no modifiers held.
    pub fn new(position: Point, button: MouseButton) -> Self {
        Self {
            position,
            button,
            modifiers: Modifiers::default(),
        }
    }

    /// Same event with the shift modifier set.
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}

//! Input events for keyboard and mouse
//!
//! A platform-neutral event model. Hosts translate their native events into
//! these and feed them to the scatter plot; positions are viewport pixels
//! with the origin at the top-left corner.

use serde::{Deserialize, Serialize};

use crate::types::ScreenPoint;

/// Keyboard key codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    // Modifiers
    Shift,
    Control,
    Alt,
    Meta, // Cmd on macOS, Win on Windows

    // Anything else, by platform key code
    Unknown(u32),
}

/// Modifier key state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool, // Cmd on macOS
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    /// Check if any modifier is pressed
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Keyboard event
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyEvent {
    /// The key that was pressed/released
    pub key: Key,
    /// Whether the key was pressed (true) or released (false)
    pub pressed: bool,
    /// Modifier state at time of event
    pub modifiers: Modifiers,
    /// Whether this is a repeat event
    pub is_repeat: bool,
}

impl KeyEvent {
    pub fn pressed(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            pressed: true,
            modifiers,
            is_repeat: false,
        }
    }

    pub fn released(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            pressed: false,
            modifiers,
            is_repeat: false,
        }
    }

    pub fn with_repeat(mut self) -> Self {
        self.is_repeat = true;
        self
    }
}

/// Mouse button
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

/// Mouse event type
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum MouseEvent {
    /// Mouse moved
    Move {
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Button pressed
    Press {
        button: MouseButton,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Button released
    Release {
        button: MouseButton,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Mouse wheel scrolled
    Scroll {
        delta_x: f32,
        delta_y: f32,
        x: f32,
        y: f32,
        modifiers: Modifiers,
    },

    /// Mouse entered the viewport
    Enter { x: f32, y: f32 },

    /// Mouse left the viewport
    Leave,
}

impl MouseEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        MouseEvent::Move {
            x,
            y,
            modifiers: Modifiers::new(),
        }
    }

    pub fn press(button: MouseButton, x: f32, y: f32) -> Self {
        MouseEvent::Press {
            button,
            x,
            y,
            modifiers: Modifiers::new(),
        }
    }

    pub fn release(button: MouseButton, x: f32, y: f32) -> Self {
        MouseEvent::Release {
            button,
            x,
            y,
            modifiers: Modifiers::new(),
        }
    }

    /// Get position for events that have one
    pub fn position(&self) -> Option<ScreenPoint> {
        match self {
            MouseEvent::Move { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            MouseEvent::Press { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            MouseEvent::Release { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            MouseEvent::Scroll { x, y, .. } => Some(ScreenPoint::new(*x, *y)),
            MouseEvent::Enter { x, y } => Some(ScreenPoint::new(*x, *y)),
            MouseEvent::Leave => None,
        }
    }

    /// Get modifiers for events that have them
    pub fn modifiers(&self) -> Option<Modifiers> {
        match self {
            MouseEvent::Move { modifiers, .. } => Some(*modifiers),
            MouseEvent::Press { modifiers, .. } => Some(*modifiers),
            MouseEvent::Release { modifiers, .. } => Some(*modifiers),
            MouseEvent::Scroll { modifiers, .. } => Some(*modifiers),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers() {
        let mods = Modifiers::new().with_shift().with_meta();
        assert!(mods.shift);
        assert!(mods.meta);
        assert!(!mods.ctrl);
        assert!(!mods.alt);
        assert!(mods.any());
        assert!(!Modifiers::new().any());
    }

    #[test]
    fn test_key_event() {
        let event = KeyEvent::pressed(Key::Shift, Modifiers::new().with_shift());
        assert!(event.pressed);
        assert_eq!(event.key, Key::Shift);
        assert!(KeyEvent::released(Key::Control, Modifiers::new()).with_repeat().is_repeat);
    }

    #[test]
    fn test_mouse_event_accessors() {
        let event = MouseEvent::Press {
            button: MouseButton::Left,
            x: 100.0,
            y: 200.0,
            modifiers: Modifiers::new().with_ctrl(),
        };
        assert_eq!(event.position(), Some(ScreenPoint::new(100.0, 200.0)));
        assert!(event.modifiers().unwrap().ctrl);

        assert_eq!(MouseEvent::Leave.position(), None);
        assert_eq!(MouseEvent::Enter { x: 1.0, y: 2.0 }.modifiers(), None);
    }
}

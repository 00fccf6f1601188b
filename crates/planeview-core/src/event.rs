//! Input identifiers and event payloads carried on the event bus.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Whether any modifier is held.
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Keyboard key. Modifier keys get their own variants because the pipeline
/// treats them as modifier state rather than key presses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Shift,
    Control,
    Alt,
    Meta,
    Other(String),
}

impl Key {
    /// Build a key from a DOM-style key name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Shift" => Key::Shift,
            "Control" => Key::Control,
            "Alt" => Key::Alt,
            "Meta" | "Super" => Key::Meta,
            other => Key::Other(other.to_string()),
        }
    }

    /// Whether this key only affects modifier state.
    pub fn is_modifier(&self) -> bool {
        !matches!(self, Key::Other(_))
    }
}

/// A pointer sample after the transform has been applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    /// Position in element (screen) space.
    pub element_position: Point,
    /// Element-space movement since the previous sample.
    pub element_delta: Vec2,
    /// Position in viewport space.
    pub position: Point,
    /// Viewport-space movement since the previous sample.
    pub delta: Vec2,
    /// Whether the pointer lies within the active area.
    pub within_bounds: bool,
    pub modifiers: Modifiers,
}

/// A button press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonEvent {
    pub button: MouseButton,
    pub element_position: Point,
    pub position: Point,
    pub modifiers: Modifiers,
}

/// A wheel scroll. `delta` is in logical pixels, positive y scrolls down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub element_position: Point,
    pub position: Point,
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// Outcome of dispatching an event to scene objects.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchReport<E> {
    pub event: E,
    /// Objects that received the event, in dispatch order.
    pub consumers: Vec<ObjectId>,
    /// The object that stopped propagation, if any.
    pub blocker: Option<ObjectId>,
}

/// The surface was resized.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub size: Size,
    pub fitting_scale: f64,
}

/// A non-modifier key went down or up.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("Shift"), Key::Shift);
        assert_eq!(Key::from_name("Super"), Key::Meta);
        assert_eq!(Key::from_name("a"), Key::Other("a".to_string()));
        assert!(Key::Control.is_modifier());
        assert!(!Key::from_name("Enter").is_modifier());
    }

    #[test]
    fn test_modifiers_any() {
        assert!(!Modifiers::default().any());
        let mods = Modifiers {
            alt: true,
            ..Default::default()
        };
        assert!(mods.any());
    }
}

//! Interface between the engine and the windowing host.

#[cfg(feature = "winit")]
pub mod winit;

use kurbo::{Point, Size, Vec2};

use crate::cursor::CursorKind;
use crate::event::{Key, Modifiers, MouseButton};

/// Services the engine asks of its host.
pub trait Host {
    /// Schedule one call to [`Viewport::frame`](crate::Viewport::frame).
    fn request_frame(&mut self);

    /// Show a cursor over the element.
    fn set_cursor(&mut self, cursor: CursorKind);
}

/// A host that ignores every request. Useful headless and in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {
    fn request_frame(&mut self) {}

    fn set_cursor(&mut self, _cursor: CursorKind) {}
}

/// Host input, already converted to logical element pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    PointerMoved(Point),
    PointerPressed(MouseButton),
    PointerReleased(MouseButton),
    /// Scroll delta in logical pixels, positive y scrolls down.
    Wheel(Vec2),
    KeyDown(Key),
    KeyUp(Key),
    PointerEntered,
    PointerLeft,
    Resized(Size),
    PixelRatio(f64),
    Visibility(bool),
    Modifiers(Modifiers),
}

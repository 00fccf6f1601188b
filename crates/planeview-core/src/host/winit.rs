//! winit adapter: translates window events and forwards host requests.

use kurbo::{Point, Size, Vec2};
use std::sync::Arc;
use winit::event::{ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key as WinitKey, NamedKey};
use winit::window::{CursorIcon, Window};

use super::{Host, HostEvent};
use crate::cursor::CursorKind;
use crate::event::{Key, Modifiers, MouseButton};

/// Logical pixels per scroll line.
const LINE_HEIGHT: f64 = 20.0;

/// Translate a winit window event into viewport input.
///
/// Physical positions are converted with `scale_factor`; wheel deltas are
/// flipped so that positive y scrolls down. Events the viewport does not
/// consume return `None`.
pub fn translate(event: &WindowEvent, scale_factor: f64) -> Option<HostEvent> {
    match event {
        WindowEvent::CursorMoved { position, .. } => {
            let logical = position.to_logical::<f64>(scale_factor);
            Some(HostEvent::PointerMoved(Point::new(logical.x, logical.y)))
        }
        WindowEvent::MouseInput { state, button, .. } => {
            let button = mouse_button(*button);
            Some(match state {
                ElementState::Pressed => HostEvent::PointerPressed(button),
                ElementState::Released => HostEvent::PointerReleased(button),
            })
        }
        WindowEvent::MouseWheel { delta, .. } => {
            let scroll = match delta {
                MouseScrollDelta::LineDelta(x, y) => {
                    Vec2::new(-(*x as f64) * LINE_HEIGHT, -(*y as f64) * LINE_HEIGHT)
                }
                MouseScrollDelta::PixelDelta(pos) => {
                    let logical = pos.to_logical::<f64>(scale_factor);
                    Vec2::new(-logical.x, -logical.y)
                }
            };
            Some(HostEvent::Wheel(scroll))
        }
        WindowEvent::KeyboardInput { event, .. } => {
            let key = key(&event.logical_key)?;
            Some(match event.state {
                ElementState::Pressed => HostEvent::KeyDown(key),
                ElementState::Released => HostEvent::KeyUp(key),
            })
        }
        WindowEvent::ModifiersChanged(modifiers) => {
            let state = modifiers.state();
            Some(HostEvent::Modifiers(Modifiers {
                shift: state.shift_key(),
                ctrl: state.control_key(),
                alt: state.alt_key(),
                meta: state.super_key(),
            }))
        }
        WindowEvent::Resized(size) => {
            let logical = size.to_logical::<f64>(scale_factor);
            Some(HostEvent::Resized(Size::new(logical.width, logical.height)))
        }
        WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
            Some(HostEvent::PixelRatio(*scale_factor))
        }
        WindowEvent::Occluded(occluded) => Some(HostEvent::Visibility(!occluded)),
        WindowEvent::CursorEntered { .. } => Some(HostEvent::PointerEntered),
        WindowEvent::CursorLeft { .. } => Some(HostEvent::PointerLeft),
        _ => None,
    }
}

fn mouse_button(button: winit::event::MouseButton) -> MouseButton {
    match button {
        winit::event::MouseButton::Left => MouseButton::Left,
        winit::event::MouseButton::Right => MouseButton::Right,
        winit::event::MouseButton::Middle => MouseButton::Middle,
        winit::event::MouseButton::Back => MouseButton::Other(3),
        winit::event::MouseButton::Forward => MouseButton::Other(4),
        winit::event::MouseButton::Other(id) => MouseButton::Other(id),
    }
}

fn key(key: &WinitKey) -> Option<Key> {
    match key {
        WinitKey::Named(NamedKey::Shift) => Some(Key::Shift),
        WinitKey::Named(NamedKey::Control) => Some(Key::Control),
        WinitKey::Named(NamedKey::Alt) => Some(Key::Alt),
        WinitKey::Named(NamedKey::Super | NamedKey::Meta) => Some(Key::Meta),
        WinitKey::Named(named) => Some(Key::Other(format!("{named:?}"))),
        WinitKey::Character(c) => Some(Key::Other(c.to_string())),
        _ => None,
    }
}

/// Winit cursor icon for a cursor kind. `None` has no icon; the host hides
/// the cursor instead.
pub fn cursor_icon(kind: CursorKind) -> Option<CursorIcon> {
    match kind {
        CursorKind::None => None,
        CursorKind::NotAllowed => Some(CursorIcon::NotAllowed),
        CursorKind::Help => Some(CursorIcon::Help),
        CursorKind::Grabbing => Some(CursorIcon::Grabbing),
        CursorKind::Grab => Some(CursorIcon::Grab),
        CursorKind::Move => Some(CursorIcon::Move),
        CursorKind::Pointer => Some(CursorIcon::Pointer),
        CursorKind::Crosshair => Some(CursorIcon::Crosshair),
        CursorKind::Default => Some(CursorIcon::Default),
    }
}

/// Host backed by a winit window.
#[derive(Debug, Clone)]
pub struct WinitHost {
    window: Arc<Window>,
}

impl WinitHost {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &Arc<Window> {
        &self.window
    }
}

impl Host for WinitHost {
    fn request_frame(&mut self) {
        self.window.request_redraw();
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        match cursor_icon(cursor) {
            Some(icon) => {
                self.window.set_cursor_visible(true);
                self.window.set_cursor(icon);
            }
            None => self.window.set_cursor_visible(false),
        }
    }
}

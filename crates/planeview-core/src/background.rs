//! The built-in navigation background.

use kurbo::Point;
use peniko::{Brush, Color};

use crate::cursor::CursorKind;
use crate::event::{ButtonEvent, PointerSample, WheelEvent};
use crate::object::{Capabilities, ObjectContext, SceneObject};
use crate::surface::Surface;
use crate::viewport::ViewState;

/// Depth of the background: below anything a client is likely to register.
pub const BACKGROUND_Z_ORDER: i32 = -65536;

/// Fills the active area (or the whole surface when unbounded) and turns
/// drags and wheel scrolls that reach it into navigation.
///
/// It hit-tests everywhere but never blocks clicks or overlap, so it sees
/// every gesture the objects above it let through.
#[derive(Debug, Clone)]
pub struct Background {
    pub color: Color,
    panning: bool,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            color: Color::from_rgb8(0xeb, 0xeb, 0xeb),
            panning: false,
        }
    }
}

impl Background {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            panning: false,
        }
    }

    /// Whether a background drag is currently panning the view.
    pub fn is_panning(&self) -> bool {
        self.panning
    }
}

impl SceneObject for Background {
    fn capabilities(&self) -> Capabilities {
        Capabilities::INTERACTIVE
    }

    fn position(&self) -> Point {
        Point::ZERO
    }

    fn z_order(&self) -> i32 {
        BACKGROUND_Z_ORDER
    }

    fn is_forgettable(&self) -> bool {
        false
    }

    fn hit_test(&self, _point: Point, _within_bounds: bool) -> bool {
        true
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewState) {
        if view.is_bounded() {
            surface.fill_rect(view.active_area(), &Brush::Solid(self.color));
        } else {
            surface.fill_screen(self.color);
        }
    }

    fn block_overlap(&self, _view: &ViewState, _sample: &PointerSample) -> bool {
        false
    }

    fn block_click(&self, _view: &ViewState, _event: &ButtonEvent) -> bool {
        false
    }

    fn on_drag_started(&mut self, ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        if ctx.is_navigable() && !self.panning {
            self.panning = true;
            ctx.suggest_cursor(CursorKind::Move);
        }
    }

    fn on_dragged(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {
        if self.panning {
            // quiet: the pointer stays over the same content while panning
            let pan = ctx.pan_center() + sample.element_delta;
            ctx.set_pan_center(pan, true);
        }
    }

    fn on_drag_ended(&mut self, ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        if self.panning {
            self.panning = false;
            ctx.unsuggest_cursor(CursorKind::Move);
        }
    }

    fn on_wheel(&mut self, ctx: &mut ObjectContext<'_>, event: &WheelEvent) {
        if !ctx.is_navigable() {
            return;
        }
        if event.modifiers.ctrl {
            ctx.scroll_zoom_counter(-event.delta.y);
        } else {
            ctx.scroll_pan(event.delta);
        }
    }
}

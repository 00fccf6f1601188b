//! Scene objects: the trait implemented by everything registered with a
//! viewport, and the context handed to its callbacks.

use kurbo::Point;
use std::any::Any;
use std::ops::{Deref, DerefMut};

use crate::cursor::CursorKind;
use crate::event::{ButtonEvent, PointerSample, WheelEvent};
use crate::schedule::LayerId;
use crate::surface::Surface;
use crate::tick::Tick;
use crate::viewport::ViewState;

/// Identifier assigned to an object when it is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Which registries an object joins when registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub drawable: bool,
    pub mouse_listening: bool,
    pub tickable: bool,
}

impl Capabilities {
    pub const NONE: Capabilities = Capabilities {
        drawable: false,
        mouse_listening: false,
        tickable: false,
    };

    /// Drawn and hit-tested: the common case for interactive objects.
    pub const INTERACTIVE: Capabilities = Capabilities {
        drawable: true,
        mouse_listening: true,
        tickable: false,
    };
}

/// Something that lives in viewport space.
///
/// Every callback has a no-op default, so implementors only override what
/// they react to. Membership (aware, overlapping, held, dragged) is not
/// stored on the object: query it through the [`ObjectContext`].
///
/// Predicates decide how pointer dispatch treats the object. `block_*`
/// stops the event from reaching objects underneath, `ignore_*` skips this
/// object for that event.
#[allow(unused_variables)]
pub trait SceneObject: Any {
    fn capabilities(&self) -> Capabilities;

    /// Position in viewport space.
    fn position(&self) -> Point;

    /// Radius used by the default hit test.
    fn size(&self) -> f64 {
        10.0
    }

    /// Depth at registration time. Change it later through
    /// [`ObjectContext::set_z_order`].
    fn z_order(&self) -> i32 {
        0
    }

    fn layer(&self) -> LayerId {
        LayerId::MAIN
    }

    /// Background objects cannot be forgotten.
    fn is_forgettable(&self) -> bool {
        true
    }

    /// Whether `point` (viewport space) is over this object.
    fn hit_test(&self, point: Point, within_bounds: bool) -> bool {
        let size = self.size();
        (self.position() - point).hypot2() < size * size
    }

    fn draw(&self, surface: &mut dyn Surface, view: &ViewState) {}

    fn block_all_pointer_events(&self, view: &ViewState, sample: &PointerSample) -> bool {
        false
    }

    fn ignore_all_pointer_events(&self, view: &ViewState, sample: &PointerSample) -> bool {
        false
    }

    fn block_overlap(&self, view: &ViewState, sample: &PointerSample) -> bool {
        true
    }

    fn ignore_overlap(&self, view: &ViewState, sample: &PointerSample) -> bool {
        false
    }

    fn block_click(&self, view: &ViewState, event: &ButtonEvent) -> bool {
        true
    }

    fn ignore_click(&self, view: &ViewState, event: &ButtonEvent) -> bool {
        false
    }

    fn block_wheel(&self, view: &ViewState, event: &WheelEvent) -> bool {
        false
    }

    fn ignore_wheel(&self, view: &ViewState, event: &WheelEvent) -> bool {
        false
    }

    fn tick(&mut self, ctx: &mut ObjectContext<'_>, tick: &Tick) {}

    fn on_awareness_started(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_awareness_ended(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_overlap_started(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    /// Called on every pointer sample while the object is aware.
    fn on_overlap_moved(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_overlap_ended(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_pressed(&mut self, ctx: &mut ObjectContext<'_>, event: &ButtonEvent) {}

    fn on_unpressed(&mut self, ctx: &mut ObjectContext<'_>, event: &ButtonEvent) {}

    fn on_mouse_up(&mut self, ctx: &mut ObjectContext<'_>, event: &ButtonEvent) {}

    fn on_clicked(&mut self, ctx: &mut ObjectContext<'_>, event: &ButtonEvent) {}

    fn on_drag_started(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_dragged(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {}

    fn on_drag_ended(&mut self, ctx: &mut ObjectContext<'_>, event: &ButtonEvent) {}

    fn on_wheel(&mut self, ctx: &mut ObjectContext<'_>, event: &WheelEvent) {}

    /// Teardown, after the object has left every registry.
    fn on_forget(&mut self, ctx: &mut ObjectContext<'_>) {}
}

/// Handle given to object callbacks: the view state plus commands scoped to
/// the calling object.
///
/// Derefs to [`ViewState`], so pan/zoom commands, coordinate conversion and
/// global queries are available directly.
pub struct ObjectContext<'a> {
    id: ObjectId,
    state: &'a mut ViewState,
}

impl<'a> ObjectContext<'a> {
    pub(crate) fn new(id: ObjectId, state: &'a mut ViewState) -> Self {
        Self { id, state }
    }

    /// Identifier of the calling object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Suggest a cursor on behalf of this object. Suggestions still
    /// outstanding when the object is forgotten are withdrawn.
    pub fn suggest_cursor(&mut self, kind: CursorKind) {
        self.state.suggest_cursor_for(Some(self.id), kind);
    }

    pub fn unsuggest_cursor(&mut self, kind: CursorKind) {
        self.state.unsuggest_cursor_for(Some(self.id), kind);
    }

    /// Redraw this object's layer on the next frame.
    pub fn request_redraw(&mut self) {
        self.state.request_object_redraw(self.id);
    }

    pub fn set_z_order(&mut self, z: i32) {
        self.state.set_z_order(self.id, z);
    }

    pub fn set_z_sub_order(&mut self, sub_z: i32) {
        self.state.set_z_sub_order(self.id, sub_z);
    }

    /// Forget this object once the current dispatch finishes.
    pub fn forget_self(&mut self) {
        self.state.forget(self.id);
    }

    pub fn is_aware(&self) -> bool {
        self.state.is_aware(self.id)
    }

    pub fn is_overlapping(&self) -> bool {
        self.state.is_overlapping(self.id)
    }

    pub fn is_held(&self) -> bool {
        self.state.is_held(self.id)
    }

    pub fn is_dragged(&self) -> bool {
        self.state.is_dragged(self.id)
    }
}

impl Deref for ObjectContext<'_> {
    type Target = ViewState;

    fn deref(&self) -> &ViewState {
        &*self.state
    }
}

impl DerefMut for ObjectContext<'_> {
    fn deref_mut(&mut self) -> &mut ViewState {
        &mut *self.state
    }
}

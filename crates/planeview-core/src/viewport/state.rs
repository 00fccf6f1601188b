//! View state shared with scene objects and bus listeners.

use kurbo::{Point, Rect, Size, Vec2};
use std::collections::{HashMap, HashSet};
use std::time::Duration;

use super::roster::{Role, Roster};
use crate::config::ViewportConfig;
use crate::cursor::{CursorKind, CursorSuggestions};
use crate::error::ViewportResult;
use crate::event::{Key, Modifiers, MouseButton, ResizeEvent};
use crate::host::Host;
use crate::object::{ObjectId, SceneObject};
use crate::pointer::PointerState;
use crate::registry::DepthKey;
use crate::schedule::{LayerId, RedrawCause, Scheduler};
use crate::tick::TickClock;
use crate::transform::{FittingBasis, Transform, fitting_scale};
use crate::zoom::ZoomModel;

/// Structural change queued during dispatch and applied afterwards.
pub(crate) enum Deferred {
    Register(ObjectId, Box<dyn SceneObject>),
    Forget(ObjectId),
}

/// Everything about a viewport except the objects themselves.
///
/// Scene objects see this through their
/// [`ObjectContext`](crate::ObjectContext), bus listeners receive it
/// directly. Registering and forgetting objects through it is deferred until
/// the current dispatch finishes.
pub struct ViewState {
    pub(crate) config: ViewportConfig,
    pub(crate) transform: Transform,
    pub(crate) zoom: ZoomModel,
    pub(crate) window_size: Option<Size>,
    pub(crate) visible_area: Rect,
    pub(crate) pointer: PointerState,
    cursors: CursorSuggestions,
    object_cursors: HashMap<ObjectId, HashMap<CursorKind, u32>>,
    shown_cursor: CursorKind,
    pub(crate) roster: Roster,
    pub(crate) scheduler: Scheduler,
    pub(crate) clock: TickClock,
    pub(crate) minimized: bool,
    pub(crate) visible: bool,
    pub(crate) down_keys: HashSet<Key>,
    next_id: u64,
    next_seq: u64,
    pub(crate) pending: Vec<Deferred>,
    /// Re-run the pointer pipeline once the current dispatch finishes.
    pub(crate) refresh_pending: bool,
    host: Box<dyn Host>,
}

impl ViewState {
    pub(crate) fn new(config: &ViewportConfig, host: Box<dyn Host>) -> ViewportResult<Self> {
        config.validate()?;
        let zoom = ZoomModel::new(
            config.min_zoom,
            config.max_zoom,
            config.zoom_counter_base,
            config.zoom_sensitivity,
        )?;
        let transform = Transform {
            zoom: zoom.factor(),
            pixel_ratio: config.pixel_ratio,
            ..Default::default()
        };
        Ok(Self {
            config: config.clone(),
            transform,
            zoom,
            window_size: None,
            visible_area: Rect::ZERO,
            pointer: PointerState::default(),
            cursors: CursorSuggestions::default(),
            object_cursors: HashMap::new(),
            shown_cursor: CursorKind::Default,
            roster: Roster::default(),
            scheduler: Scheduler::new(config.lazy_transform.map(Duration::from_millis)),
            clock: TickClock::new(config.target_tickrate),
            // nothing to draw into until the host reports a size
            minimized: true,
            visible: true,
            down_keys: HashSet::new(),
            next_id: 1,
            next_seq: 0,
            pending: Vec::new(),
            refresh_pending: false,
            host,
        })
    }

    // --- queries ---

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn pointer(&self) -> &PointerState {
        &self.pointer
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom.factor()
    }

    pub fn zoom_counter(&self) -> f64 {
        self.zoom.counter()
    }

    pub fn zoom_bounds(&self) -> (f64, f64) {
        self.zoom.bounds()
    }

    /// Offset of the viewport origin from the surface center.
    pub fn pan_center(&self) -> Vec2 {
        self.transform.pan
    }

    pub fn fitted_zoom(&self) -> f64 {
        self.transform.fitted_zoom()
    }

    pub fn fitting_scale(&self) -> f64 {
        self.transform.fitting_scale
    }

    pub fn pixel_ratio(&self) -> f64 {
        self.transform.pixel_ratio
    }

    /// Surface size in logical pixels.
    pub fn surface_size(&self) -> Size {
        self.transform.surface
    }

    pub fn to_viewport_space(&self, screen: Point) -> Point {
        self.transform.to_viewport_space(screen)
    }

    pub fn to_screen_space(&self, point: Point) -> Point {
        self.transform.to_screen_space(point)
    }

    /// Viewport-space rectangle currently on screen.
    pub fn visible_area(&self) -> Rect {
        self.visible_area
    }

    /// Viewport-space rectangle of the nominal content, centered on the origin.
    pub fn active_area(&self) -> Rect {
        Rect::from_center_size(Point::ZERO, self.config.content_dims)
    }

    pub fn is_bounded(&self) -> bool {
        self.config.bounded
    }

    pub fn is_navigable(&self) -> bool {
        self.config.navigable
    }

    pub fn set_navigable(&mut self, navigable: bool) {
        self.config.navigable = navigable;
    }

    /// Whether `point` lies within the active area grown by `padding`.
    pub fn is_in_bounds(&self, point: Point, padding: f64) -> bool {
        let area = self.active_area().inflate(padding, padding);
        point.x >= area.x0 && point.x <= area.x1 && point.y >= area.y0 && point.y <= area.y1
    }

    /// Clamp `point` into the active area grown by `padding`. A negative
    /// padding keeps objects of that radius fully inside.
    pub fn clamp_to_bounds(&self, point: Point, padding: f64) -> Point {
        let area = self.active_area().inflate(padding, padding);
        if area.width() < 0.0 || area.height() < 0.0 {
            return area.center();
        }
        Point::new(point.x.clamp(area.x0, area.x1), point.y.clamp(area.y0, area.y1))
    }

    pub fn is_registered(&self, id: ObjectId) -> bool {
        self.roster.is_registered(id)
    }

    pub fn z_order(&self, id: ObjectId) -> Option<i32> {
        self.roster.depth(id).map(|key| key.z)
    }

    pub fn z_sub_order(&self, id: ObjectId) -> Option<i32> {
        self.roster.depth(id).map(|key| key.sub_z)
    }

    pub fn layer_of(&self, id: ObjectId) -> Option<LayerId> {
        self.roster.layer(id)
    }

    pub fn is_aware(&self, id: ObjectId) -> bool {
        self.roster.contains(Role::Aware, id)
    }

    pub fn is_overlapping(&self, id: ObjectId) -> bool {
        self.roster.contains(Role::Overlapping, id)
    }

    pub fn is_held(&self, id: ObjectId) -> bool {
        self.roster.contains(Role::Held, id)
    }

    pub fn is_dragged(&self, id: ObjectId) -> bool {
        self.roster.contains(Role::Dragged, id)
    }

    /// Aware objects, topmost first.
    pub fn aware_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::Aware)
    }

    /// Overlapping objects, topmost first.
    pub fn overlapping_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::Overlapping)
    }

    pub fn held_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::Held)
    }

    pub fn dragged_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::Dragged)
    }

    /// Drawable objects, bottommost first.
    pub fn drawn_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::Drawn)
    }

    pub fn mouse_listening_ids(&self) -> &[ObjectId] {
        self.roster.ordered(Role::MouseListening)
    }

    pub fn tickable_count(&self) -> usize {
        self.roster.len(Role::Tickable)
    }

    pub fn is_pressed(&self) -> bool {
        self.pointer.pressed.is_some()
    }

    pub fn pressed_button(&self) -> Option<MouseButton> {
        self.pointer.pressed
    }

    pub fn is_dragging(&self) -> bool {
        self.pointer.dragging
    }

    pub fn modifiers(&self) -> Modifiers {
        self.pointer.modifiers
    }

    pub fn is_key_down(&self, key: &Key) -> bool {
        self.down_keys.contains(key)
    }

    /// Cursor currently shown.
    pub fn active_cursor(&self) -> CursorKind {
        self.shown_cursor
    }

    /// Outstanding suggestions of a cursor kind.
    pub fn cursor_count(&self, kind: CursorKind) -> u32 {
        self.cursors.count(kind)
    }

    /// Whether the viewport takes input and draws.
    pub fn is_active(&self) -> bool {
        !self.minimized && self.visible
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    // --- commands ---

    /// Queue an object for registration and return the id it will have.
    pub fn register<T: SceneObject>(&mut self, object: T) -> ObjectId {
        self.register_boxed(Box::new(object))
    }

    pub fn register_boxed(&mut self, object: Box<dyn SceneObject>) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.pending.push(Deferred::Register(id, object));
        id
    }

    /// Queue an object to be forgotten.
    pub fn forget(&mut self, id: ObjectId) {
        if !self.is_forgetting(id) {
            self.pending.push(Deferred::Forget(id));
        }
    }

    /// Whether `id` is queued to be forgotten.
    pub fn is_forgetting(&self, id: ObjectId) -> bool {
        self.pending
            .iter()
            .any(|deferred| matches!(deferred, Deferred::Forget(queued) if *queued == id))
    }

    pub(crate) fn is_queued_for_registration(&self, id: ObjectId) -> bool {
        self.pending
            .iter()
            .any(|deferred| matches!(deferred, Deferred::Register(queued, _) if *queued == id))
    }

    pub(crate) fn next_sequence(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Change an object's z-order, re-sorting every registry it is in.
    pub fn set_z_order(&mut self, id: ObjectId, z: i32) {
        if let Some(key) = self.roster.depth(id) {
            self.reorder(id, DepthKey { z, ..key });
        }
    }

    /// Change an object's z-sub-order, the tie-breaker within one z-order.
    pub fn set_z_sub_order(&mut self, id: ObjectId, sub_z: i32) {
        if let Some(key) = self.roster.depth(id) {
            self.reorder(id, DepthKey { sub_z, ..key });
        }
    }

    fn reorder(&mut self, id: ObjectId, key: DepthKey) {
        if self.roster.depth(id) == Some(key) {
            return;
        }
        self.roster.set_depth(id, key);
        if self.roster.contains(Role::Drawn, id) {
            self.request_object_redraw(id);
        }
        self.refresh_pending = true;
    }

    /// Add a drawing layer. Fixed layers are drawn in screen space.
    pub fn add_layer(&mut self, name: impl Into<String>, fixed: bool) -> LayerId {
        let id = self.scheduler.add_layer(name, fixed);
        let needed = self.scheduler.request_frame();
        self.forward_frame_request(needed);
        id
    }

    pub fn request_redraw_all(&mut self) {
        self.invalidate_all(RedrawCause::Requested);
    }

    pub fn request_layer_redraw(&mut self, layer: LayerId) {
        self.invalidate(layer, RedrawCause::Requested);
    }

    /// Redraw the layer an object is drawn on.
    pub fn request_object_redraw(&mut self, id: ObjectId) {
        match self.roster.layer(id) {
            Some(layer) => self.invalidate(layer, RedrawCause::Object),
            None => log::warn!("Redraw requested by unregistered object {:?}", id),
        }
    }

    /// Suggest a cursor not owned by any object.
    pub fn suggest_cursor(&mut self, kind: CursorKind) {
        self.suggest_cursor_for(None, kind);
    }

    pub fn unsuggest_cursor(&mut self, kind: CursorKind) {
        self.unsuggest_cursor_for(None, kind);
    }

    pub(crate) fn suggest_cursor_for(&mut self, owner: Option<ObjectId>, kind: CursorKind) {
        self.cursors.suggest(kind, 1);
        if let Some(owner) = owner {
            *self
                .object_cursors
                .entry(owner)
                .or_default()
                .entry(kind)
                .or_insert(0) += 1;
        }
        self.sync_cursor();
    }

    pub(crate) fn unsuggest_cursor_for(&mut self, owner: Option<ObjectId>, kind: CursorKind) {
        if !self.cursors.unsuggest(kind, 1) {
            return;
        }
        if let Some(counts) = owner.and_then(|owner| self.object_cursors.get_mut(&owner)) {
            if let Some(count) = counts.get_mut(&kind) {
                *count = count.saturating_sub(1);
                if *count == 0 {
                    counts.remove(&kind);
                }
            }
        }
        self.sync_cursor();
    }

    /// Withdraw every cursor suggestion an object still has outstanding.
    pub(crate) fn withdraw_cursors(&mut self, id: ObjectId) {
        let Some(counts) = self.object_cursors.remove(&id) else {
            return;
        };
        for (kind, count) in counts {
            self.cursors.unsuggest(kind, count);
        }
        self.sync_cursor();
    }

    fn sync_cursor(&mut self) {
        let active = self.cursors.active();
        if active != self.shown_cursor {
            self.shown_cursor = active;
            self.host.set_cursor(active);
        }
    }

    // --- scheduling ---

    pub(crate) fn invalidate(&mut self, layer: LayerId, cause: RedrawCause) {
        let needed = self.scheduler.invalidate(layer, cause);
        self.forward_frame_request(needed);
    }

    pub(crate) fn invalidate_all(&mut self, cause: RedrawCause) {
        let needed = self.scheduler.invalidate_all(cause);
        self.forward_frame_request(needed);
    }

    pub(crate) fn invalidate_navigation(&mut self, cause: RedrawCause) {
        let needed = self.scheduler.invalidate_navigation(cause);
        self.forward_frame_request(needed);
    }

    /// Ask the host for a frame, e.g. to keep the tick loop running.
    pub(crate) fn request_frame(&mut self) {
        let needed = self.scheduler.request_frame();
        self.forward_frame_request(needed);
    }

    /// Inactive viewports drop frame requests; the pending layers stay
    /// marked and are drawn once the viewport is active again.
    fn forward_frame_request(&mut self, needed: bool) {
        if !needed {
            return;
        }
        if self.is_active() {
            self.host.request_frame();
        } else {
            self.scheduler.begin_frame();
        }
    }

    /// Store a resize for the next frame. Always reaches the host, since
    /// the resize may be what reactivates the viewport.
    pub(crate) fn defer_resize(&mut self, size: Size) {
        if self.scheduler.defer_resize(size) {
            self.host.request_frame();
        }
    }

    // --- geometry ---

    pub(crate) fn update_visible_area(&mut self) {
        self.visible_area = self.transform.visible_area();
    }

    fn fitting_basis(&self) -> Size {
        match self.config.fitting_basis {
            FittingBasis::Element => self.transform.surface,
            FittingBasis::Window => self.window_size.unwrap_or(self.transform.surface),
        }
    }

    pub(crate) fn refresh_fitting(&mut self) {
        let basis = self.fitting_basis();
        if basis.width <= 0.0 || basis.height <= 0.0 {
            return;
        }
        self.transform.fitting_scale =
            fitting_scale(basis, self.config.content_dims, self.config.fitting_mode);
    }

    /// Apply a new surface size. Returns the resize event to publish, or
    /// `None` when the surface is too small to be active.
    pub(crate) fn apply_resize(&mut self, size: Size) -> Option<ResizeEvent> {
        let min_extent = self.config.min_active_extent;
        if size.width <= min_extent || size.height <= min_extent {
            if !self.minimized {
                log::debug!("Viewport minimized at {}x{}", size.width, size.height);
                self.minimized = true;
            }
            return None;
        }
        if self.minimized {
            log::debug!("Viewport restored at {}x{}", size.width, size.height);
            self.minimized = false;
        }
        self.transform.surface = size;
        self.refresh_fitting();
        let pan = self.transform.pan;
        self.set_pan_center(pan, true);
        self.update_visible_area();
        self.scheduler.interrupt_lazy();
        self.invalidate_all(RedrawCause::Resize);
        self.refresh_pending = true;
        log::debug!(
            "Resized to {}x{}, fitting scale {:.3}",
            size.width,
            size.height,
            self.transform.fitting_scale
        );
        Some(ResizeEvent {
            size,
            fitting_scale: self.transform.fitting_scale,
        })
    }

    /// Forget any press in progress without notifying objects.
    pub(crate) fn cancel_press(&mut self) {
        if self.pointer.pressed.is_some() {
            log::debug!("Press cancelled by deactivation");
        }
        self.pointer.end_press();
        self.roster.clear(Role::Held);
        self.roster.clear(Role::Dragged);
        self.clock.pause();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;

    fn state(config: ViewportConfig) -> ViewState {
        ViewState::new(&config, Box::new(NullHost)).unwrap()
    }

    #[test]
    fn test_starts_minimized_until_resized() {
        let mut view = state(ViewportConfig::default());
        assert!(!view.is_active());
        let event = view.apply_resize(Size::new(1000.0, 400.0)).unwrap();
        assert!(view.is_active());
        assert!((event.fitting_scale - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_small_resize_minimizes() {
        let mut view = state(ViewportConfig::default());
        view.apply_resize(Size::new(800.0, 600.0));
        assert!(view.apply_resize(Size::new(800.0, 5.0)).is_none());
        assert!(view.is_minimized());
        // the last usable size is kept
        assert_eq!(view.surface_size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_bounds_helpers() {
        let view = state(ViewportConfig::default());
        assert!(view.is_in_bounds(Point::new(250.0, -250.0), 0.0));
        assert!(!view.is_in_bounds(Point::new(251.0, 0.0), 0.0));
        assert!(view.is_in_bounds(Point::new(251.0, 0.0), 5.0));

        let clamped = view.clamp_to_bounds(Point::new(400.0, 10.0), -25.0);
        assert_eq!(clamped, Point::new(225.0, 10.0));
    }

    #[test]
    fn test_cursor_suggestions_per_object() {
        let mut view = state(ViewportConfig::default());
        let owner = ObjectId(7);
        view.suggest_cursor_for(Some(owner), CursorKind::Grab);
        view.suggest_cursor_for(Some(owner), CursorKind::Grab);
        view.suggest_cursor(CursorKind::Pointer);
        assert_eq!(view.active_cursor(), CursorKind::Grab);

        view.withdraw_cursors(owner);
        assert_eq!(view.cursor_count(CursorKind::Grab), 0);
        assert_eq!(view.active_cursor(), CursorKind::Pointer);
    }

    #[test]
    fn test_withdraw_after_global_unsuggest() {
        let mut view = state(ViewportConfig::default());
        let owner = ObjectId(7);
        view.suggest_cursor_for(Some(owner), CursorKind::Grab);
        view.suggest_cursor_for(Some(owner), CursorKind::Grab);
        view.unsuggest_cursor(CursorKind::Grab);
        assert_eq!(view.cursor_count(CursorKind::Grab), 1);

        view.withdraw_cursors(owner);
        assert_eq!(view.cursor_count(CursorKind::Grab), 0);
        assert_eq!(view.active_cursor(), CursorKind::Default);
    }

    #[test]
    fn test_forget_queued_once() {
        let mut view = state(ViewportConfig::default());
        view.forget(ObjectId(3));
        view.forget(ObjectId(3));
        assert_eq!(view.pending.len(), 1);
        assert!(view.is_forgetting(ObjectId(3)));
    }
}

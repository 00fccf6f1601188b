//! The viewport: owns scene objects, routes host input through the pointer
//! pipeline, and renders pending layers.

mod navigation;
mod pipeline;
mod roster;
mod state;

pub use roster::Role;
pub use state::ViewState;

use kurbo::{Affine, Point, Size, Vec2};
use std::any::Any;
use std::collections::HashMap;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

use crate::background::Background;
use crate::bus::EventBus;
use crate::config::ViewportConfig;
use crate::cursor::CursorKind;
use crate::error::ViewportResult;
use crate::event::{Key, KeyEvent, Modifiers, ResizeEvent};
use crate::host::{Host, HostEvent, NullHost};
use crate::object::{ObjectContext, ObjectId, SceneObject};
use crate::registry::DepthKey;
use crate::schedule::{LayerId, RedrawCause};
use crate::surface::Compositor;
use crate::transform::FittingBasis;
use state::Deferred;

/// Rounds of deferred work (registrations, forgets, pointer refreshes)
/// processed after one input before giving up.
const MAX_SETTLE_ROUNDS: usize = 16;

/// A pannable, zoomable 2D view over a set of scene objects.
pub struct Viewport {
    state: ViewState,
    objects: HashMap<ObjectId, Box<dyn SceneObject>>,
    bus: EventBus,
    background: ObjectId,
}

impl Viewport {
    /// Create a viewport. The navigation background is registered
    /// immediately. The viewport stays inactive until the first
    /// [`Viewport::resize`] reports a usable size.
    pub fn new(config: ViewportConfig, host: impl Host + 'static) -> ViewportResult<Self> {
        let mut state = ViewState::new(&config, Box::new(host))?;
        let background = state.register(Background::default());
        let mut viewport = Self {
            state,
            objects: HashMap::new(),
            bus: EventBus::default(),
            background,
        };
        viewport.settle();
        log::debug!("Viewport created with {:?}", config);
        Ok(viewport)
    }

    /// A viewport without a host, for tests and offscreen use.
    pub fn headless(config: ViewportConfig) -> ViewportResult<Self> {
        Self::new(config, NullHost)
    }

    /// Read access to the view state.
    pub fn view(&self) -> &ViewState {
        &self.state
    }

    /// Run `f` against the view state, then apply whatever it queued.
    pub fn with_view<R>(&mut self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let result = f(&mut self.state);
        self.settle();
        result
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Event channels, for subscribing listeners.
    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn background_id(&self) -> ObjectId {
        self.background
    }

    // --- objects ---

    /// Register an object and return its id.
    pub fn register<T: SceneObject>(&mut self, object: T) -> ObjectId {
        let id = self.state.register(object);
        self.settle();
        id
    }

    pub fn register_boxed(&mut self, object: Box<dyn SceneObject>) -> ObjectId {
        let id = self.state.register_boxed(object);
        self.settle();
        id
    }

    /// Forget an object. Returns false for unknown ids and for the
    /// background, which cannot be forgotten.
    pub fn forget(&mut self, id: ObjectId) -> bool {
        if id == self.background {
            log::warn!("The navigation background cannot be forgotten");
            return false;
        }
        if !self.objects.contains_key(&id) && !self.state.is_queued_for_registration(id) {
            log::warn!("Forget requested for unknown object {:?}", id);
            return false;
        }
        self.state.forget(id);
        self.settle();
        true
    }

    /// Forget every object except the background.
    pub fn forget_all(&mut self) {
        let mut ids: Vec<ObjectId> = self
            .objects
            .keys()
            .copied()
            .filter(|id| *id != self.background)
            .collect();
        ids.sort();
        for id in ids {
            self.state.forget(id);
        }
        self.settle();
    }

    /// Borrow a registered object as its concrete type.
    pub fn object<T: SceneObject>(&self, id: ObjectId) -> Option<&T> {
        let object: &dyn SceneObject = &**self.objects.get(&id)?;
        let object: &dyn Any = object;
        object.downcast_ref()
    }

    pub fn object_mut<T: SceneObject>(&mut self, id: ObjectId) -> Option<&mut T> {
        let object: &mut dyn SceneObject = &mut **self.objects.get_mut(&id)?;
        let object: &mut dyn Any = object;
        object.downcast_mut()
    }

    /// Number of registered objects, background included.
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Add a drawing layer. Fixed layers are drawn in screen space.
    pub fn add_layer(&mut self, name: impl Into<String>, fixed: bool) -> LayerId {
        self.state.add_layer(name, fixed)
    }

    pub fn set_z_order(&mut self, id: ObjectId, z: i32) {
        self.with_view(|view| view.set_z_order(id, z));
    }

    pub fn set_z_sub_order(&mut self, id: ObjectId, sub_z: i32) {
        self.with_view(|view| view.set_z_sub_order(id, sub_z));
    }

    pub fn request_redraw_all(&mut self) {
        self.state.request_redraw_all();
    }

    pub fn request_layer_redraw(&mut self, layer: LayerId) {
        self.state.request_layer_redraw(layer);
    }

    pub fn suggest_cursor(&mut self, kind: CursorKind) {
        self.state.suggest_cursor(kind);
    }

    pub fn unsuggest_cursor(&mut self, kind: CursorKind) {
        self.state.unsuggest_cursor(kind);
    }

    // --- navigation ---

    pub fn set_pan_center(&mut self, pan: Vec2, quiet: bool) {
        self.with_view(|view| view.set_pan_center(pan, quiet));
    }

    pub fn scroll_pan(&mut self, delta: Vec2) {
        self.with_view(|view| view.scroll_pan(delta));
    }

    pub fn recenter(&mut self) {
        self.with_view(|view| view.recenter());
    }

    pub fn set_zoom_factor(&mut self, factor: f64) {
        self.with_view(|view| view.set_zoom_factor(factor));
    }

    pub fn set_zoom_factor_at(&mut self, factor: f64, anchor: Option<Point>) {
        self.with_view(|view| view.set_zoom_factor_at(factor, anchor));
    }

    pub fn set_zoom_counter(&mut self, counter: f64) {
        self.with_view(|view| view.set_zoom_counter(counter));
    }

    pub fn set_zoom_counter_at(&mut self, counter: f64, anchor: Option<Point>) {
        self.with_view(|view| view.set_zoom_counter_at(counter, anchor));
    }

    pub fn scroll_zoom_counter(&mut self, delta: f64) {
        self.with_view(|view| view.scroll_zoom_counter(delta));
    }

    pub fn set_zoom_bounds(&mut self, min: f64, max: f64) -> ViewportResult<()> {
        self.with_view(|view| view.set_zoom_bounds(min, max))
    }

    // --- host input ---

    /// Route a translated host event.
    pub fn handle_event(&mut self, event: HostEvent) {
        match event {
            HostEvent::PointerMoved(position) => self.pointer_moved(position),
            HostEvent::PointerPressed(button) => self.pointer_pressed(button),
            HostEvent::PointerReleased(button) => self.pointer_released(button),
            HostEvent::Wheel(delta) => self.wheel(delta),
            HostEvent::KeyDown(key) => self.key_down(key),
            HostEvent::KeyUp(key) => self.key_up(key),
            HostEvent::PointerEntered => self.pointer_entered(),
            HostEvent::PointerLeft => self.pointer_left(),
            HostEvent::Resized(size) => self.resize(size),
            HostEvent::PixelRatio(ratio) => self.set_pixel_ratio(ratio),
            HostEvent::Visibility(visible) => self.set_visible(visible),
            HostEvent::Modifiers(modifiers) => self.set_modifiers(modifiers),
        }
    }

    /// The surface changed size (logical pixels).
    pub fn resize(&mut self, size: Size) {
        if self.state.config.responsive_resize {
            self.apply_resize(size);
        } else {
            self.state.defer_resize(size);
        }
    }

    fn apply_resize(&mut self, size: Size) {
        let was_active = self.state.is_active();
        match self.state.apply_resize(size) {
            Some(event) => {
                self.bus.resize.emit(&mut self.state, &event);
                self.settle();
            }
            None if was_active => self.state.cancel_press(),
            None => {}
        }
    }

    /// Size of the host window, used when fitting against the window.
    pub fn set_window_size(&mut self, size: Size) {
        self.state.window_size = Some(size);
        if self.state.config.fitting_basis != FittingBasis::Window || !self.state.is_active() {
            return;
        }
        self.state.refresh_fitting();
        let pan = self.state.transform.pan;
        self.state.set_pan_center(pan, true);
        self.state.update_visible_area();
        self.state.invalidate_all(RedrawCause::Resize);
        self.state.refresh_pending = true;
        let event = ResizeEvent {
            size: self.state.transform.surface,
            fitting_scale: self.state.transform.fitting_scale,
        };
        self.bus.resize.emit(&mut self.state, &event);
        self.settle();
    }

    /// Device pixels per logical pixel changed.
    pub fn set_pixel_ratio(&mut self, ratio: f64) {
        if !ratio.is_finite() || ratio <= 0.0 {
            log::warn!("Ignoring invalid pixel ratio {}", ratio);
            return;
        }
        self.state.transform.pixel_ratio = ratio;
        self.state.invalidate_all(RedrawCause::Resize);
    }

    /// The host shows or hides the viewport. Hiding cancels any press in
    /// progress without notifying objects.
    pub fn set_visible(&mut self, visible: bool) {
        if self.state.visible == visible {
            return;
        }
        self.state.visible = visible;
        if visible {
            log::debug!("Viewport visible");
            self.state.invalidate_all(RedrawCause::Requested);
        } else {
            log::debug!("Viewport hidden");
            self.state.cancel_press();
        }
    }

    pub fn pointer_entered(&mut self) {
        if self.state.is_active() {
            self.state.pointer.within_element = true;
        }
    }

    pub fn pointer_left(&mut self) {
        self.state.pointer.within_element = false;
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.state.pointer.modifiers = modifiers;
    }

    /// A key went down. Modifier keys only update modifier state; other keys
    /// are reported while the pointer is over the element.
    pub fn key_down(&mut self, key: Key) {
        if self.set_modifier_key(&key, true) {
            return;
        }
        if !self.state.is_active() || !self.state.pointer.within_element {
            return;
        }
        self.state.down_keys.insert(key.clone());
        let event = KeyEvent {
            key,
            modifiers: self.state.pointer.modifiers,
        };
        self.bus.key_down.emit(&mut self.state, &event);
        self.settle();
    }

    pub fn key_up(&mut self, key: Key) {
        if self.set_modifier_key(&key, false) {
            return;
        }
        if !self.state.down_keys.remove(&key) {
            return;
        }
        let event = KeyEvent {
            key,
            modifiers: self.state.pointer.modifiers,
        };
        self.bus.key_up.emit(&mut self.state, &event);
        self.settle();
    }

    fn set_modifier_key(&mut self, key: &Key, down: bool) -> bool {
        let modifiers = &mut self.state.pointer.modifiers;
        match key {
            Key::Shift => modifiers.shift = down,
            Key::Control => modifiers.ctrl = down,
            Key::Alt => modifiers.alt = down,
            Key::Meta => modifiers.meta = down,
            Key::Other(_) => return false,
        }
        true
    }

    // --- frames ---

    /// Frame callback requested through [`Host::request_frame`]: handles a
    /// deferred resize, advances the tick clock and renders pending layers.
    pub fn frame(&mut self, now: Instant, compositor: &mut dyn Compositor) {
        self.state.scheduler.begin_frame();
        if let Some(size) = self.state.scheduler.take_pending_resize() {
            self.apply_resize(size);
        }
        if !self.state.is_active() {
            self.state.clock.pause();
            return;
        }

        if let Some(tick) = self.state.clock.advance(now) {
            self.bus.tick.emit(&mut self.state, &tick);
            for id in self.state.roster.snapshot(Role::Tickable) {
                self.call(id, |object, ctx| object.tick(ctx, &tick));
            }
            self.settle();
        }

        self.state.scheduler.expire_lazy(now);
        self.render(compositor);

        if self.state.tickable_count() > 0
            || !self.bus.tick.is_empty()
            || self.state.scheduler.lazy_waiting()
        {
            self.state.request_frame();
        }
    }

    /// [`Viewport::frame`] at the current time.
    pub fn frame_now(&mut self, compositor: &mut dyn Compositor) {
        self.frame(Instant::now(), compositor);
    }

    fn render(&mut self, compositor: &mut dyn Compositor) {
        let pan = self.state.transform.pan;
        let shared = compositor.is_shared();
        let scheduler = &self.state.scheduler;
        let layers: Vec<LayerId> = if shared {
            // one surface for everything: no offsets, redraw all or nothing
            let stale = scheduler
                .layers()
                .iter()
                .any(|layer| !layer.fixed && layer.committed_pan() != Some(pan));
            if scheduler.any_pending() || stale {
                (0..scheduler.layers().len()).map(LayerId).collect()
            } else {
                Vec::new()
            }
        } else {
            scheduler.pending_layers()
        };

        if shared && !layers.is_empty() {
            compositor.surface(LayerId::MAIN).clear();
        }

        let ratio = self.state.transform.pixel_ratio;
        for layer in layers {
            let fixed = self
                .state
                .scheduler
                .layer(layer)
                .is_some_and(|layer| layer.fixed);
            let surface = compositor.surface(layer);
            if !shared {
                surface.clear();
            }
            let transform = if fixed {
                Affine::scale(ratio)
            } else {
                self.state.transform.device_affine()
            };
            surface.set_transform(transform);
            let clip = self.state.config.bounded && !fixed;
            if clip {
                surface.push_clip(self.state.active_area());
            }
            let mut drawn = 0usize;
            for id in self.state.drawn_ids() {
                if self.state.roster.layer(*id) != Some(layer) {
                    continue;
                }
                if let Some(object) = self.objects.get(id) {
                    object.draw(surface, &self.state);
                    drawn += 1;
                }
            }
            if clip {
                surface.pop_clip();
            }
            log::trace!("Rendered layer {:?} with {} objects", layer, drawn);
            self.state.scheduler.commit(layer, pan);
        }

        for (index, layer) in self.state.scheduler.layers().iter().enumerate() {
            let offset = match layer.committed_pan() {
                Some(committed) if !layer.fixed => (pan - committed) * ratio,
                _ => Vec2::ZERO,
            };
            compositor.set_offset(LayerId(index), offset);
        }
    }

    // --- deferred work ---

    /// Apply queued registrations and forgets, then re-run the pointer
    /// pipeline if anything asked for it.
    fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let pending = std::mem::take(&mut self.state.pending);
            if pending.is_empty() && !self.state.refresh_pending {
                return;
            }
            for deferred in pending {
                match deferred {
                    Deferred::Register(id, object) => self.attach(id, object),
                    Deferred::Forget(id) => self.detach(id),
                }
            }
            if std::mem::take(&mut self.state.refresh_pending) && self.state.is_active() {
                self.update_pointer(None, true);
            }
        }
        log::warn!(
            "Deferred viewport work still pending after {} rounds",
            MAX_SETTLE_ROUNDS
        );
    }

    fn attach(&mut self, id: ObjectId, object: Box<dyn SceneObject>) {
        let caps = object.capabilities();
        let mut layer = object.layer();
        if self.state.scheduler.layer(layer).is_none() {
            log::warn!("Object {:?} asked for unknown layer {:?}, using main", id, layer);
            layer = LayerId::MAIN;
        }
        let key = DepthKey::new(object.z_order(), 0, self.state.next_sequence());
        self.state.roster.insert(id, key, layer, caps);
        self.objects.insert(id, object);
        if caps.drawable {
            self.state.invalidate(layer, RedrawCause::Registered);
        }
        if caps.mouse_listening {
            self.state.refresh_pending = true;
        }
        if caps.tickable {
            self.state.request_frame();
        }
        log::debug!("Registered {:?} at z {} ({:?})", id, key.z, caps);
    }

    fn detach(&mut self, id: ObjectId) {
        let Some(mut object) = self.objects.remove(&id) else {
            log::warn!("Forget requested for unknown object {:?}", id);
            return;
        };
        if !object.is_forgettable() {
            log::warn!("Object {:?} cannot be forgotten", id);
            self.objects.insert(id, object);
            return;
        }
        let layer = self.state.roster.layer(id);
        let roles = self.state.roster.remove_everywhere(id);
        object.on_forget(&mut ObjectContext::new(id, &mut self.state));
        self.state.withdraw_cursors(id);
        if let Some(layer) = layer.filter(|_| roles.contains(&Role::Drawn)) {
            self.state.invalidate(layer, RedrawCause::Forgotten);
        }
        if roles.contains(&Role::MouseListening) {
            self.state.refresh_pending = true;
        }
        log::debug!("Forgot {:?}", id);
    }

    /// Run a callback on a live object. Objects queued to be forgotten are
    /// skipped. Returns whether the callback ran.
    fn call(
        &mut self,
        id: ObjectId,
        f: impl FnOnce(&mut dyn SceneObject, &mut ObjectContext<'_>),
    ) -> bool {
        if self.state.is_forgetting(id) {
            return false;
        }
        let Some(object) = self.objects.get_mut(&id) else {
            return false;
        };
        let mut ctx = ObjectContext::new(id, &mut self.state);
        f(object.as_mut(), &mut ctx);
        true
    }

    /// Evaluate a predicate on a live object; false for unknown ids.
    fn check(&self, id: ObjectId, f: impl FnOnce(&dyn SceneObject, &ViewState) -> bool) -> bool {
        self.objects
            .get(&id)
            .is_some_and(|object| f(object.as_ref(), &self.state))
    }
}

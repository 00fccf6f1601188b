//! Pointer pipeline: awareness, overlap, press/release and wheel dispatch.

use kurbo::{Point, Vec2};
use std::collections::HashSet;

use super::Viewport;
use super::roster::Role;
use crate::event::{ButtonEvent, DispatchReport, MouseButton, PointerSample, WheelEvent};
use crate::object::ObjectId;

impl Viewport {
    /// The pointer moved to `position` (element space).
    pub fn pointer_moved(&mut self, position: Point) {
        if !self.state.is_active() {
            return;
        }
        self.update_pointer(Some(position), false);
        self.settle();
    }

    /// Run one pointer sample through the pipeline. `None` re-evaluates the
    /// current element position, which picks up pan, zoom and registry
    /// changes.
    ///
    /// Drag handling follows element-space movement, so a drag that pans
    /// the view under a still viewport position keeps going. Awareness and
    /// overlap are only recomputed when the viewport-space position moved,
    /// or when `force` is set.
    pub(crate) fn update_pointer(&mut self, element_position: Option<Point>, force: bool) {
        let element = element_position.unwrap_or(self.state.pointer.element_position);
        let position = self.state.transform.to_viewport_space(element);
        let moved = self.state.pointer.move_to(element, position);
        let element_moved = self.state.pointer.element_delta != Vec2::ZERO;
        self.state.pointer.within_bounds =
            !self.state.config.bounded || self.state.is_in_bounds(position, 0.0);
        if !moved && !element_moved && !force {
            return;
        }

        let sample = self.state.pointer.sample();
        self.bus.pre_pointer_move.emit(&mut self.state, &sample);

        if element_moved {
            self.drag_step(&sample);
        }
        if !moved && !force {
            self.bus.post_pointer_move.emit(&mut self.state, &sample);
            return;
        }

        let newly_aware = self.awareness_pass(&sample);
        let newly_overlapping = self.overlap_pass(&sample);

        // started after every ended, movement after every started
        for id in newly_aware {
            if self.state.is_aware(id) {
                self.call(id, |object, ctx| object.on_awareness_started(ctx, &sample));
            }
        }
        for id in newly_overlapping {
            if self.state.is_overlapping(id) {
                self.call(id, |object, ctx| object.on_overlap_started(ctx, &sample));
            }
        }
        for id in self.state.roster.snapshot(Role::Aware) {
            self.call(id, |object, ctx| object.on_overlap_moved(ctx, &sample));
        }

        self.bus.post_pointer_move.emit(&mut self.state, &sample);
    }

    fn drag_step(&mut self, sample: &PointerSample) {
        if self.state.pointer.pressed.is_none() {
            return;
        }
        let threshold = self.state.config.drag_threshold;
        if self.state.pointer.accumulate(threshold) {
            log::trace!("Drag threshold crossed");
        }
        if !self.state.pointer.dragging {
            return;
        }
        for id in self.state.roster.snapshot(Role::Held) {
            if !self.state.is_dragged(id) {
                self.state.roster.add(Role::Dragged, id);
                self.call(id, |object, ctx| object.on_drag_started(ctx, sample));
            }
            self.call(id, |object, ctx| object.on_dragged(ctx, sample));
        }
    }

    /// Broad phase. Returns newly aware objects; ended callbacks fire here.
    fn awareness_pass(&mut self, sample: &PointerSample) -> Vec<ObjectId> {
        let previous = self.state.roster.snapshot(Role::Aware);
        let mut current = HashSet::new();
        let mut newly = Vec::new();

        for id in self.state.roster.snapshot(Role::MouseListening) {
            if self.state.is_forgetting(id) {
                continue;
            }
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            if object.ignore_all_pointer_events(&self.state, sample) {
                continue;
            }
            if !object.hit_test(sample.position, sample.within_bounds) {
                continue;
            }
            let blocks = object.block_all_pointer_events(&self.state, sample);
            current.insert(id);
            if !self.state.is_aware(id) {
                self.state.roster.add(Role::Aware, id);
                newly.push(id);
            }
            if blocks {
                break;
            }
        }

        let mut ended = 0usize;
        for id in previous {
            if !current.contains(&id) {
                self.state.roster.remove(Role::Aware, id);
                self.call(id, |object, ctx| object.on_awareness_ended(ctx, sample));
                ended += 1;
            }
        }
        log::trace!("Awareness: {} started, {} ended", newly.len(), ended);
        newly
    }

    /// Narrow phase over the aware set. Returns newly overlapping objects;
    /// ended callbacks fire here.
    fn overlap_pass(&mut self, sample: &PointerSample) -> Vec<ObjectId> {
        let previous = self.state.roster.snapshot(Role::Overlapping);
        let mut current = HashSet::new();
        let mut newly = Vec::new();

        for id in self.state.roster.snapshot(Role::Aware) {
            if self.state.is_forgetting(id) {
                continue;
            }
            let Some(object) = self.objects.get(&id) else {
                continue;
            };
            if object.ignore_overlap(&self.state, sample) {
                continue;
            }
            let blocks = object.block_overlap(&self.state, sample);
            current.insert(id);
            if !self.state.is_overlapping(id) {
                self.state.roster.add(Role::Overlapping, id);
                newly.push(id);
            }
            if blocks {
                break;
            }
        }

        let mut ended = 0usize;
        for id in previous {
            if !current.contains(&id) {
                self.state.roster.remove(Role::Overlapping, id);
                self.call(id, |object, ctx| object.on_overlap_ended(ctx, sample));
                ended += 1;
            }
        }
        log::trace!("Overlap: {} started, {} ended", newly.len(), ended);
        newly
    }

    fn button_event(&self, button: MouseButton) -> ButtonEvent {
        ButtonEvent {
            button,
            element_position: self.state.pointer.element_position,
            position: self.state.pointer.position,
            modifiers: self.state.pointer.modifiers,
        }
    }

    /// A button went down at the current pointer position. Only one press is
    /// tracked; further buttons are ignored until it is released.
    pub fn pointer_pressed(&mut self, button: MouseButton) {
        if !self.state.is_active() || self.state.is_pressed() {
            return;
        }
        self.state.pointer.begin_press(button);
        let event = self.button_event(button);
        self.bus.pre_mouse_down.emit(&mut self.state, &event);

        let mut consumers = Vec::new();
        let mut blocker = None;
        for id in self.state.roster.snapshot(Role::Overlapping) {
            if self.state.is_forgetting(id) || self.check(id, |object, view| object.ignore_click(view, &event)) {
                continue;
            }
            self.state.roster.add(Role::Held, id);
            self.call(id, |object, ctx| object.on_pressed(ctx, &event));
            consumers.push(id);
            if self.check(id, |object, view| object.block_click(view, &event)) {
                blocker = Some(id);
                break;
            }
        }
        log::trace!("Press {:?}: {} consumers, blocker {:?}", button, consumers.len(), blocker);

        let report = DispatchReport {
            event,
            consumers,
            blocker,
        };
        self.bus.post_mouse_down.emit(&mut self.state, &report);
        self.state.refresh_pending = true;
        self.settle();
    }

    /// A button went up. Releases of a button other than the pressed one are
    /// ignored.
    pub fn pointer_released(&mut self, button: MouseButton) {
        if self.state.pointer.pressed != Some(button) {
            return;
        }
        let event = self.button_event(button);
        self.bus.pre_mouse_up.emit(&mut self.state, &event);

        let is_drag = self.state.pointer.element_drag_distance >= self.state.config.drag_threshold;
        self.state.pointer.pressed = None;

        let mut consumers = Vec::new();
        let mut blocker = None;
        for id in self.state.roster.snapshot(Role::Overlapping) {
            if self.state.is_forgetting(id) || self.check(id, |object, view| object.ignore_click(view, &event)) {
                continue;
            }
            self.call(id, |object, ctx| object.on_mouse_up(ctx, &event));
            consumers.push(id);
            if self.check(id, |object, view| object.block_click(view, &event)) {
                blocker = Some(id);
                break;
            }
        }

        if !is_drag {
            self.bus.pre_click.emit(&mut self.state, &event);
        }
        for id in self.state.roster.snapshot(Role::Held) {
            self.call(id, |object, ctx| {
                object.on_unpressed(ctx, &event);
                if is_drag {
                    object.on_drag_ended(ctx, &event);
                } else {
                    object.on_clicked(ctx, &event);
                }
            });
        }
        log::trace!("Release {:?}: drag {}, {} consumers", button, is_drag, consumers.len());

        self.state.pointer.end_press();
        self.state.roster.clear(Role::Held);
        self.state.roster.clear(Role::Dragged);

        let report = DispatchReport {
            event,
            consumers,
            blocker,
        };
        self.bus.post_mouse_up.emit(&mut self.state, &report);
        if !is_drag {
            self.bus.post_click.emit(&mut self.state, &event);
        }
        self.state.refresh_pending = true;
        self.settle();
    }

    /// Wheel scroll over the element, delta in logical pixels.
    pub fn wheel(&mut self, delta: Vec2) {
        if !self.state.is_active() {
            return;
        }
        let event = WheelEvent {
            element_position: self.state.pointer.element_position,
            position: self.state.pointer.position,
            delta,
            modifiers: self.state.pointer.modifiers,
        };
        self.bus.pre_wheel.emit(&mut self.state, &event);

        let mut consumers = Vec::new();
        let mut blocker = None;
        for id in self.state.roster.snapshot(Role::Aware) {
            if self.state.is_forgetting(id) || self.check(id, |object, view| object.ignore_wheel(view, &event)) {
                continue;
            }
            self.call(id, |object, ctx| object.on_wheel(ctx, &event));
            consumers.push(id);
            if self.check(id, |object, view| object.block_wheel(view, &event)) {
                blocker = Some(id);
                break;
            }
        }

        let report = DispatchReport {
            event,
            consumers,
            blocker,
        };
        self.bus.post_wheel.emit(&mut self.state, &report);
        self.settle();
    }
}

//! Pointer state tracked between samples.

use kurbo::{Point, Vec2};

use crate::event::{Modifiers, MouseButton, PointerSample};

/// Current pointer position, deltas and drag accumulators.
///
/// Element positions are in screen space, plain positions in viewport space.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
    pub element_position: Point,
    pub element_delta: Vec2,
    pub position: Point,
    pub delta: Vec2,
    /// Where the current press started.
    pub press_element_position: Point,
    pub press_position: Point,
    /// Offset from the press position, viewport space.
    pub drag_delta: Vec2,
    /// Offset from the press position, element space.
    pub element_drag_delta: Vec2,
    /// Path length travelled while pressed, viewport space.
    pub drag_distance: f64,
    /// Path length travelled while pressed, element space. Compared against
    /// the drag threshold.
    pub element_drag_distance: f64,
    /// Farthest element-space excursion from the press position.
    pub drag_max_excursion: f64,
    /// Button held down, if any. Only one press is tracked at a time.
    pub pressed: Option<MouseButton>,
    /// Sticky until release once the drag threshold is crossed.
    pub dragging: bool,
    /// Whether the pointer lies within the active area.
    pub within_bounds: bool,
    /// Whether the pointer is over the element at all.
    pub within_element: bool,
    pub modifiers: Modifiers,
}

impl PointerState {
    /// Move to a new sample, updating deltas. Returns whether the viewport
    /// position changed.
    pub fn move_to(&mut self, element_position: Point, position: Point) -> bool {
        self.element_delta = element_position - self.element_position;
        self.delta = position - self.position;
        self.element_position = element_position;
        let moved = position != self.position;
        self.position = position;
        if self.pressed.is_some() {
            self.drag_delta = position - self.press_position;
            self.element_drag_delta = element_position - self.press_element_position;
        }
        moved
    }

    /// Start tracking a press at the current position.
    pub fn begin_press(&mut self, button: MouseButton) {
        self.pressed = Some(button);
        self.press_element_position = self.element_position;
        self.press_position = self.position;
        self.reset_drag();
    }

    /// Add the latest deltas to the drag accumulators. Returns whether the
    /// drag threshold was crossed by this sample.
    pub fn accumulate(&mut self, threshold: f64) -> bool {
        if self.pressed.is_none() {
            return false;
        }
        self.drag_distance += self.delta.hypot();
        self.element_drag_distance += self.element_delta.hypot();
        self.drag_max_excursion = self.drag_max_excursion.max(self.element_drag_delta.hypot());
        if !self.dragging && self.element_drag_distance >= threshold {
            self.dragging = true;
            return true;
        }
        false
    }

    /// Stop tracking the press and reset the accumulators.
    pub fn end_press(&mut self) {
        self.pressed = None;
        self.dragging = false;
        self.reset_drag();
    }

    fn reset_drag(&mut self) {
        self.drag_delta = Vec2::ZERO;
        self.element_drag_delta = Vec2::ZERO;
        self.drag_distance = 0.0;
        self.element_drag_distance = 0.0;
        self.drag_max_excursion = 0.0;
    }

    /// Snapshot for bus listeners.
    pub fn sample(&self) -> PointerSample {
        PointerSample {
            element_position: self.element_position,
            element_delta: self.element_delta,
            position: self.position,
            delta: self.delta,
            within_bounds: self.within_bounds,
            modifiers: self.modifiers,
        }
    }
}

//! Pan and zoom commands.

use kurbo::{Point, Vec2};

use super::state::ViewState;
use crate::error::ViewportResult;
use crate::schedule::RedrawCause;
use crate::zoom::{ZoomAnchorMode, anchored_pan};

impl ViewState {
    /// Move the viewport origin to `pan` (offset from the surface center).
    ///
    /// When bounded, the pan is clamped so the active area cannot leave the
    /// surface by more than the padding. A quiet change does not re-run the
    /// pointer pipeline, which keeps a background drag from feeding back into
    /// itself.
    pub fn set_pan_center(&mut self, pan: Vec2, quiet: bool) {
        let pan = if self.config.bounded {
            self.clamp_pan(pan)
        } else {
            pan
        };
        let changed = pan != self.transform.pan;
        self.transform.pan = pan;
        self.update_visible_area();
        if changed {
            if !quiet {
                self.refresh_pending = true;
            }
            self.invalidate_navigation(RedrawCause::Pan);
        }
    }

    fn clamp_pan(&self, pan: Vec2) -> Vec2 {
        let fitted = self.transform.fitted_zoom();
        let center = self.transform.surface_center();
        let padding = self.config.active_area_padding;
        let dims = self.config.content_dims;
        let limit_x = (dims.width * 0.5 * fitted - center.x + padding.x).max(0.0);
        let limit_y = (dims.height * 0.5 * fitted - center.y + padding.y).max(0.0);
        Vec2::new(pan.x.clamp(-limit_x, limit_x), pan.y.clamp(-limit_y, limit_y))
    }

    /// Pan by a scroll delta, scaled by the pan sensitivity.
    pub fn scroll_pan(&mut self, delta: Vec2) {
        let mut offset = delta * self.config.pan_sensitivity;
        if self.config.inverse_panning {
            offset = -offset;
        }
        let pan = self.transform.pan + offset;
        self.set_pan_center(pan, false);
    }

    /// Put the viewport origin back at the surface center.
    pub fn recenter(&mut self) {
        self.set_pan_center(Vec2::ZERO, false);
    }

    pub fn set_zoom_factor(&mut self, factor: f64) {
        self.set_zoom_factor_at(factor, None);
    }

    /// Set the zoom factor, keeping the content under `anchor` (screen
    /// space) in place. Without an anchor the configured mode decides.
    pub fn set_zoom_factor_at(&mut self, factor: f64, anchor: Option<Point>) {
        if !self.zoom.is_enabled() {
            return;
        }
        let previous = self.zoom.set_factor(factor);
        self.apply_zoom(previous, anchor);
    }

    pub fn set_zoom_counter(&mut self, counter: f64) {
        self.set_zoom_counter_at(counter, None);
    }

    pub fn set_zoom_counter_at(&mut self, counter: f64, anchor: Option<Point>) {
        if !self.zoom.is_enabled() {
            return;
        }
        let previous = self.zoom.set_counter(counter);
        self.apply_zoom(previous, anchor);
    }

    /// Move the zoom counter by `delta`, scaled by the zoom sensitivity.
    pub fn scroll_zoom_counter(&mut self, delta: f64) {
        if !self.zoom.is_enabled() {
            return;
        }
        let previous = self.zoom.scroll(delta);
        self.apply_zoom(previous, None);
    }

    /// Replace the zoom bounds. Fails when `min > max`.
    pub fn set_zoom_bounds(&mut self, min: f64, max: f64) -> ViewportResult<()> {
        let previous = self.zoom.set_bounds(min, max)?;
        self.config.min_zoom = min;
        self.config.max_zoom = max;
        self.apply_zoom(previous, None);
        Ok(())
    }

    fn zoom_anchor(&self) -> Point {
        match self.config.zoom_anchor {
            ZoomAnchorMode::Origin => self.transform.origin(),
            ZoomAnchorMode::Pointer => self.pointer.element_position,
            ZoomAnchorMode::Screen => self.transform.surface_center(),
        }
    }

    fn apply_zoom(&mut self, previous: f64, anchor: Option<Point>) {
        let current = self.zoom.factor();
        self.transform.zoom = current;
        if previous != current {
            let anchor = anchor.unwrap_or_else(|| self.zoom_anchor());
            let pan = anchored_pan(
                self.transform.pan,
                anchor,
                self.transform.surface_center(),
                previous,
                current,
            );
            self.set_pan_center(pan, false);
        }
        self.update_visible_area();
        self.refresh_pending = true;
        self.invalidate_navigation(RedrawCause::Zoom);
    }
}

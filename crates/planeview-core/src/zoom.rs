//! Zoom model: a bounded zoom factor and its logarithmic counter.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{ViewportError, ViewportResult};

/// Default base for the zoom counter. One wheel pixel moves the zoom by 0.75%.
pub const DEFAULT_ZOOM_COUNTER_BASE: f64 = 1.0075;

/// Where a zoom change is anchored when no explicit screen point is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomAnchorMode {
    /// The screen position of the viewport origin.
    Origin,
    /// The current pointer position.
    #[default]
    Pointer,
    /// The center of the surface.
    Screen,
}

impl FromStr for ZoomAnchorMode {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "origin" => Ok(Self::Origin),
            "pointer" => Ok(Self::Pointer),
            "screen" => Ok(Self::Screen),
            other => Err(ViewportError::UnknownZoomAnchor(other.to_string())),
        }
    }
}

/// Zoom factor and zoom counter, kept in lockstep.
///
/// `factor = base ^ counter`. Both are only ever changed together through
/// [`ZoomModel::set_factor`] and [`ZoomModel::set_counter`], and the factor is
/// always within `[min, max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomModel {
    factor: f64,
    counter: f64,
    min: f64,
    max: f64,
    base: f64,
    sensitivity: f64,
}

impl ZoomModel {
    /// Create a zoom model starting at factor 1 (clamped into range).
    pub fn new(min: f64, max: f64, base: f64, sensitivity: f64) -> ViewportResult<Self> {
        validate_range(min, max)?;
        if base.is_nan() || base <= 1.0 || base.is_infinite() {
            return Err(ViewportError::InvalidConfig(format!(
                "zoom counter base must be greater than 1, got {base}"
            )));
        }
        let mut model = Self {
            factor: 1.0,
            counter: 0.0,
            min,
            max,
            base,
            sensitivity,
        };
        model.set_factor(1.0);
        Ok(model)
    }

    /// Current zoom factor.
    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Current zoom counter.
    pub fn counter(&self) -> f64 {
        self.counter
    }

    /// Zoom bounds as `(min, max)`.
    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    /// Zoom is disabled when the bounds collapse to a single value.
    pub fn is_enabled(&self) -> bool {
        self.min != self.max
    }

    /// Convert a zoom factor to its counter.
    pub fn factor_to_counter(&self, factor: f64) -> f64 {
        factor.ln() / self.base.ln()
    }

    /// Convert a zoom counter to its factor.
    pub fn counter_to_factor(&self, counter: f64) -> f64 {
        self.base.powf(counter)
    }

    /// Set the zoom factor (clamped). Returns the previous factor.
    pub fn set_factor(&mut self, factor: f64) -> f64 {
        let previous = self.factor;
        self.factor = factor.clamp(self.min, self.max);
        self.counter = self.factor_to_counter(self.factor);
        previous
    }

    /// Set the zoom counter (clamped). Returns the previous factor.
    pub fn set_counter(&mut self, counter: f64) -> f64 {
        let previous = self.factor;
        let min_counter = self.factor_to_counter(self.min);
        let max_counter = self.factor_to_counter(self.max);
        self.counter = counter.clamp(min_counter, max_counter);
        // powf can land a hair outside the bounds at the extremes
        self.factor = self.counter_to_factor(self.counter).clamp(self.min, self.max);
        previous
    }

    /// Move the counter by `delta` scaled by the zoom sensitivity.
    /// Returns the previous factor.
    pub fn scroll(&mut self, delta: f64) -> f64 {
        self.set_counter(self.counter + delta * self.sensitivity)
    }

    /// Replace the zoom bounds, re-clamping the current factor.
    pub fn set_bounds(&mut self, min: f64, max: f64) -> ViewportResult<f64> {
        validate_range(min, max)?;
        self.min = min;
        self.max = max;
        Ok(self.set_factor(self.factor))
    }
}

fn validate_range(min: f64, max: f64) -> ViewportResult<()> {
    if min > max {
        return Err(ViewportError::InvalidZoomRange { min, max });
    }
    if min.is_nan() || min <= 0.0 || !max.is_finite() {
        return Err(ViewportError::InvalidConfig(format!(
            "zoom bounds must be positive and finite, got [{min}, {max}]"
        )));
    }
    Ok(())
}

/// Pan center after a zoom change so that the content under `anchor` stays put.
///
/// `anchor` is in screen space, `center` is the surface center, and the zoom
/// values are user zoom factors (the fitting scale cancels out).
pub fn anchored_pan(pan: Vec2, anchor: Point, center: Point, old_zoom: f64, new_zoom: f64) -> Vec2 {
    let offset = anchor - (center + pan);
    pan - offset / old_zoom * (new_zoom - old_zoom)
}

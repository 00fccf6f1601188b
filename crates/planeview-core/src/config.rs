//! Viewport configuration.

use kurbo::{Size, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::{ViewportError, ViewportResult};
use crate::transform::{FittingBasis, FittingMode};
use crate::zoom::{DEFAULT_ZOOM_COUNTER_BASE, ZoomAnchorMode};

/// Configuration for a [`Viewport`](crate::Viewport).
///
/// Every field has a default, so a JSON document only needs to name the
/// fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Lower zoom bound.
    pub min_zoom: f64,
    /// Upper zoom bound. Equal bounds disable zooming.
    pub max_zoom: f64,
    /// Whether the background pans and zooms on drag and wheel.
    pub navigable: bool,
    /// Multiplier applied to zoom counter scroll deltas.
    pub zoom_sensitivity: f64,
    /// Multiplier applied to scroll pan deltas.
    pub pan_sensitivity: f64,
    /// Scroll pan moves the content against the wheel direction.
    pub inverse_panning: bool,
    /// Anchor used by zoom commands that carry no explicit point.
    pub zoom_anchor: ZoomAnchorMode,
    /// Base of the zoom counter (`factor = base ^ counter`).
    pub zoom_counter_base: f64,
    /// Nominal content size the fitting scale is computed against.
    pub content_dims: Size,
    /// Clamp panning to the active area and clip drawing to it.
    pub bounded: bool,
    /// Extra pan allowance around the active area, in screen pixels.
    pub active_area_padding: Vec2,
    pub fitting_mode: FittingMode,
    pub fitting_basis: FittingBasis,
    /// Initial device pixel ratio.
    pub pixel_ratio: f64,
    /// Element-space distance a press must travel to become a drag.
    pub drag_threshold: f64,
    /// Ticks per second.
    pub target_tickrate: u32,
    /// Handle resizes immediately instead of on the next frame.
    pub responsive_resize: bool,
    /// Surfaces with an extent at or below this are treated as minimized.
    pub min_active_extent: f64,
    /// Delay in milliseconds before a panned layer is re-rendered. `None`
    /// re-renders on every pan.
    pub lazy_transform: Option<u64>,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.25,
            max_zoom: 2.0,
            navigable: true,
            zoom_sensitivity: 1.0,
            pan_sensitivity: 0.5,
            inverse_panning: true,
            zoom_anchor: ZoomAnchorMode::Pointer,
            zoom_counter_base: DEFAULT_ZOOM_COUNTER_BASE,
            content_dims: Size::new(500.0, 500.0),
            bounded: false,
            active_area_padding: Vec2::new(100.0, 100.0),
            fitting_mode: FittingMode::Shrink,
            fitting_basis: FittingBasis::Element,
            pixel_ratio: 1.0,
            drag_threshold: 4.0,
            target_tickrate: 60,
            responsive_resize: true,
            min_active_extent: 5.0,
            lazy_transform: None,
        }
    }
}

impl ViewportConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> ViewportResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> ViewportResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> ViewportResult<()> {
        if self.min_zoom > self.max_zoom {
            return Err(ViewportError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if self.min_zoom.is_nan() || self.min_zoom <= 0.0 || !self.max_zoom.is_finite() {
            return Err(ViewportError::InvalidConfig(format!(
                "zoom bounds must be positive and finite, got [{}, {}]",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.zoom_counter_base.is_nan()
            || self.zoom_counter_base <= 1.0
            || self.zoom_counter_base.is_infinite()
        {
            return Err(ViewportError::InvalidConfig(format!(
                "zoom counter base must be greater than 1, got {}",
                self.zoom_counter_base
            )));
        }
        if !is_positive(self.content_dims.width) || !is_positive(self.content_dims.height) {
            return Err(ViewportError::InvalidConfig(format!(
                "content dimensions must be positive, got {}x{}",
                self.content_dims.width, self.content_dims.height
            )));
        }
        if !is_positive(self.pixel_ratio) {
            return Err(ViewportError::InvalidConfig(format!(
                "pixel ratio must be positive, got {}",
                self.pixel_ratio
            )));
        }
        if self.target_tickrate == 0 {
            return Err(ViewportError::InvalidConfig(
                "target tick rate must be at least 1".to_string(),
            ));
        }
        if self.drag_threshold.is_nan() || self.drag_threshold < 0.0 {
            return Err(ViewportError::InvalidConfig(format!(
                "drag threshold must not be negative, got {}",
                self.drag_threshold
            )));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

//! Transform model for converting between screen space and viewport space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ViewportError;

/// How the nominal content size is fitted into the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingMode {
    /// The whole content fits inside the surface (smaller scale axis wins).
    #[default]
    Shrink,
    /// The content covers the whole surface (larger scale axis wins).
    Fill,
    /// No automatic fitting; the fitting scale stays at 1.
    None,
}

impl FromStr for FittingMode {
    type Err = ViewportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shrink" => Ok(Self::Shrink),
            "fill" => Ok(Self::Fill),
            "none" => Ok(Self::None),
            other => Err(ViewportError::UnknownFittingMode(other.to_string())),
        }
    }
}

/// Which dimensions the fitting scale is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FittingBasis {
    /// The drawing surface itself.
    #[default]
    Element,
    /// The host window, as last reported through `Viewport::set_window_size`.
    Window,
}

/// Compute the fitting scale for a basis size and a nominal content size.
pub fn fitting_scale(basis: Size, content: Size, mode: FittingMode) -> f64 {
    let scale_x = basis.width / content.width;
    let scale_y = basis.height / content.height;
    match mode {
        FittingMode::Shrink => scale_x.min(scale_y),
        FittingMode::Fill => scale_x.max(scale_y),
        FittingMode::None => 1.0,
    }
}

/// Pan/zoom/fit state of a viewport.
///
/// Screen space is measured in logical element pixels relative to the
/// surface's top-left corner. Viewport space is the coordinate system scene
/// objects live in; its origin sits at the surface center offset by `pan`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Offset of the viewport origin from the surface center, in screen pixels.
    pub pan: Vec2,
    /// User zoom factor (kept in sync with the zoom model).
    pub zoom: f64,
    /// Automatic scale that fits the nominal content into the surface.
    pub fitting_scale: f64,
    /// Device pixels per logical pixel.
    pub pixel_ratio: f64,
    /// Surface size in logical pixels.
    pub surface: Size,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            fitting_scale: 1.0,
            pixel_ratio: 1.0,
            surface: Size::ZERO,
        }
    }
}

impl Transform {
    /// Center of the surface in screen space.
    pub fn surface_center(&self) -> Point {
        Point::new(self.surface.width * 0.5, self.surface.height * 0.5)
    }

    /// Screen position of the viewport origin.
    pub fn origin(&self) -> Point {
        self.surface_center() + self.pan
    }

    /// Effective scale: fitting scale times user zoom.
    pub fn fitted_zoom(&self) -> f64 {
        self.fitting_scale * self.zoom
    }

    /// Convert a screen point to viewport space.
    pub fn to_viewport_space(&self, screen: Point) -> Point {
        let offset = screen - self.origin();
        (offset / self.fitted_zoom()).to_point()
    }

    /// Convert a viewport-space point to screen space.
    pub fn to_screen_space(&self, point: Point) -> Point {
        self.origin() + point.to_vec2() * self.fitted_zoom()
    }

    /// Convert a screen-space distance to a viewport-space distance.
    pub fn screen_distance_to_viewport(&self, distance: f64) -> f64 {
        distance / self.fitted_zoom()
    }

    /// Affine mapping viewport space to screen space.
    pub fn affine(&self) -> Affine {
        Affine::translate(self.origin().to_vec2()) * Affine::scale(self.fitted_zoom())
    }

    /// Affine mapping screen space to viewport space.
    pub fn inverse_affine(&self) -> Affine {
        Affine::scale(1.0 / self.fitted_zoom()) * Affine::translate(-self.origin().to_vec2())
    }

    /// Affine mapping viewport space to device pixels, used for drawing.
    pub fn device_affine(&self) -> Affine {
        Affine::scale(self.pixel_ratio) * self.affine()
    }

    /// The region of viewport space currently covered by the surface.
    pub fn visible_area(&self) -> Rect {
        let min = self.to_viewport_space(Point::ZERO);
        let max = self.to_viewport_space(Point::new(self.surface.width, self.surface.height));
        Rect::from_points(min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_transform() -> Transform {
        Transform {
            pan: Vec2::new(30.0, -20.0),
            zoom: 1.5,
            fitting_scale: 0.8,
            pixel_ratio: 2.0,
            surface: Size::new(800.0, 600.0),
        }
    }

    #[test]
    fn test_identity_maps_center_to_origin() {
        let transform = Transform {
            surface: Size::new(200.0, 100.0),
            ..Default::default()
        };
        let origin = transform.to_viewport_space(Point::new(100.0, 50.0));
        assert!(origin.x.abs() < f64::EPSILON);
        assert!(origin.y.abs() < f64::EPSILON);
    }

    #[test]
    fn test_to_viewport_space_with_pan_and_zoom() {
        let transform = sample_transform();
        // origin = (400 + 30, 300 - 20) = (430, 280); fitted zoom = 1.2
        let point = transform.to_viewport_space(Point::new(442.0, 268.0));
        assert!((point.x - 10.0).abs() < 1e-10);
        assert!((point.y + 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let transform = sample_transform();
        for original in [
            Point::new(123.0, 456.0),
            Point::new(-50.5, 0.25),
            Point::new(800.0, 600.0),
        ] {
            let back = transform.to_screen_space(transform.to_viewport_space(original));
            assert!((back.x - original.x).abs() < 1e-9);
            assert!((back.y - original.y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_affine_matches_point_conversion() {
        let transform = sample_transform();
        let point = Point::new(17.0, -3.0);
        let via_affine = transform.affine() * point;
        let direct = transform.to_screen_space(point);
        assert!((via_affine - direct).hypot() < 1e-9);

        let back = transform.inverse_affine() * via_affine;
        assert!((back - point).hypot() < 1e-9);
    }

    #[test]
    fn test_device_affine_scales_by_pixel_ratio() {
        let transform = sample_transform();
        let point = Point::new(5.0, 5.0);
        let logical = transform.to_screen_space(point);
        let device = transform.device_affine() * point;
        assert!((device.x - logical.x * 2.0).abs() < 1e-9);
        assert!((device.y - logical.y * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fitting_scale_modes() {
        let basis = Size::new(1000.0, 400.0);
        let content = Size::new(500.0, 500.0);
        assert!((fitting_scale(basis, content, FittingMode::Shrink) - 0.8).abs() < f64::EPSILON);
        assert!((fitting_scale(basis, content, FittingMode::Fill) - 2.0).abs() < f64::EPSILON);
        assert!((fitting_scale(basis, content, FittingMode::None) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_visible_area() {
        let transform = Transform {
            zoom: 2.0,
            surface: Size::new(200.0, 100.0),
            ..Default::default()
        };
        let area = transform.visible_area();
        assert!((area.x0 + 50.0).abs() < 1e-10);
        assert!((area.y0 + 25.0).abs() < 1e-10);
        assert!((area.x1 - 50.0).abs() < 1e-10);
        assert!((area.y1 - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_fitting_mode_from_str() {
        assert_eq!("fill".parse::<FittingMode>().unwrap(), FittingMode::Fill);
        assert!(matches!(
            "stretch".parse::<FittingMode>(),
            Err(ViewportError::UnknownFittingMode(name)) if name == "stretch"
        ));
    }
}

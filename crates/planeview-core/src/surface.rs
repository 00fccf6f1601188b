//! Drawing surface abstraction.
//!
//! The engine only ever draws through these traits; `planeview-render`
//! provides the implementations.

use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape, Vec2};
use peniko::{Brush, Color};

use crate::schedule::LayerId;

/// Path tolerance used when flattening convenience shapes.
const SHAPE_TOLERANCE: f64 = 0.1;

/// A 2D drawing target.
pub trait Surface {
    /// Discard everything drawn so far.
    fn clear(&mut self);

    /// Set the transform applied to subsequent path operations.
    fn set_transform(&mut self, transform: Affine);

    /// Clip subsequent drawing to `rect` (in the current transform's space).
    fn push_clip(&mut self, rect: Rect);

    /// Remove the innermost clip.
    fn pop_clip(&mut self);

    /// Fill a path.
    fn fill(&mut self, path: &BezPath, brush: &Brush);

    /// Stroke a path with the given width.
    fn stroke(&mut self, path: &BezPath, width: f64, brush: &Brush);

    /// Fill the whole surface regardless of the current transform.
    fn fill_screen(&mut self, color: Color);

    fn fill_circle(&mut self, center: Point, radius: f64, brush: &Brush) {
        self.fill(&Circle::new(center, radius).to_path(SHAPE_TOLERANCE), brush);
    }

    fn stroke_circle(&mut self, center: Point, radius: f64, width: f64, brush: &Brush) {
        self.stroke(&Circle::new(center, radius).to_path(SHAPE_TOLERANCE), width, brush);
    }

    fn fill_rect(&mut self, rect: Rect, brush: &Brush) {
        self.fill(&rect.to_path(SHAPE_TOLERANCE), brush);
    }
}

/// A set of surfaces, one per layer, presented together.
///
/// A compositor that hands out the same surface for every layer is
/// "shared": the scheduler then redraws all layers together whenever any
/// of them is pending.
pub trait Compositor {
    /// Surface for `layer`.
    fn surface(&mut self, layer: LayerId) -> &mut dyn Surface;

    /// Presentation offset for `layer`, in device pixels. Used by lazy
    /// transforms to shift a layer without redrawing it.
    fn set_offset(&mut self, layer: LayerId, offset: Vec2);

    fn is_shared(&self) -> bool {
        false
    }
}

impl<S: Surface> Compositor for S {
    fn surface(&mut self, _layer: LayerId) -> &mut dyn Surface {
        self
    }

    fn set_offset(&mut self, _layer: LayerId, _offset: Vec2) {}

    fn is_shared(&self) -> bool {
        true
    }
}

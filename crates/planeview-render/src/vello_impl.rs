//! Vello-backed surfaces.

use kurbo::{Affine, BezPath, Point, Rect, Size, Stroke, Vec2};
use peniko::{BlendMode, Brush, Color, Fill};
use planeview_core::{Compositor, LayerId, Surface};
use vello::Scene;

use crate::error::{RenderError, RenderResult};

/// A surface that encodes drawing into a Vello [`Scene`].
pub struct VelloSurface {
    scene: Scene,
    transform: Affine,
    clip_depth: usize,
    /// Target size in device pixels, used by `fill_screen`.
    size: Size,
}

impl Default for VelloSurface {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

impl VelloSurface {
    /// Create a surface for a target of `size` device pixels.
    pub fn new(size: Size) -> Self {
        Self {
            scene: Scene::new(),
            transform: Affine::IDENTITY,
            clip_depth: 0,
            size,
        }
    }

    pub fn set_size(&mut self, size: Size) {
        self.size = size;
    }

    /// Get the scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take the scene, leaving an empty one. Fails if a clip is still open.
    pub fn take_scene(&mut self) -> RenderResult<Scene> {
        if self.clip_depth != 0 {
            return Err(RenderError::Surface(format!(
                "{} clip layer(s) still open",
                self.clip_depth
            )));
        }
        Ok(std::mem::take(&mut self.scene))
    }
}

impl Surface for VelloSurface {
    fn clear(&mut self) {
        self.scene.reset();
        self.transform = Affine::IDENTITY;
        self.clip_depth = 0;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn push_clip(&mut self, rect: Rect) {
        self.scene
            .push_layer(BlendMode::default(), 1.0, self.transform, &rect);
        self.clip_depth += 1;
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without a matching push_clip");
            return;
        }
        self.scene.pop_layer();
        self.clip_depth -= 1;
    }

    fn fill(&mut self, path: &BezPath, brush: &Brush) {
        self.scene.fill(Fill::NonZero, self.transform, brush, None, path);
    }

    fn stroke(&mut self, path: &BezPath, width: f64, brush: &Brush) {
        self.scene
            .stroke(&Stroke::new(width), self.transform, brush, None, path);
    }

    fn fill_screen(&mut self, color: Color) {
        let rect = Rect::from_origin_size(Point::ZERO, self.size);
        self.scene
            .fill(Fill::NonZero, Affine::IDENTITY, color, None, &rect);
    }
}

/// One Vello surface per layer, flattened into a single scene for
/// presentation with each layer's offset applied.
#[derive(Default)]
pub struct VelloCompositor {
    layers: Vec<VelloSurface>,
    offsets: Vec<Vec2>,
    size: Size,
}

impl VelloCompositor {
    pub fn new(size: Size) -> Self {
        Self {
            layers: Vec::new(),
            offsets: Vec::new(),
            size,
        }
    }

    /// Update the target size (device pixels) of every layer.
    pub fn resize(&mut self, size: Size) {
        self.size = size;
        for layer in &mut self.layers {
            layer.set_size(size);
        }
    }

    fn ensure(&mut self, layer: LayerId) {
        while self.layers.len() <= layer.0 {
            self.layers.push(VelloSurface::new(self.size));
            self.offsets.push(Vec2::ZERO);
        }
    }

    /// Build the scene to present: every layer in order, translated by its
    /// offset.
    pub fn compose(&self) -> Scene {
        let mut scene = Scene::new();
        for (layer, offset) in self.layers.iter().zip(&self.offsets) {
            let transform = (*offset != Vec2::ZERO).then(|| Affine::translate(*offset));
            scene.append(layer.scene(), transform);
        }
        scene
    }
}

impl Compositor for VelloCompositor {
    fn surface(&mut self, layer: LayerId) -> &mut dyn Surface {
        self.ensure(layer);
        &mut self.layers[layer.0]
    }

    fn set_offset(&mut self, layer: LayerId, offset: Vec2) {
        self.ensure(layer);
        self.offsets[layer.0] = offset;
    }
}

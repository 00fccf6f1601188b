//! Display-list surfaces for headless rendering and inspection.

use kurbo::{Affine, BezPath, Rect, Vec2};
use peniko::{Brush, Color};
use planeview_core::{Compositor, LayerId, Surface};

use crate::error::{RenderError, RenderResult};

/// One recorded drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    SetTransform(Affine),
    PushClip(Rect),
    PopClip,
    Fill { path: BezPath, brush: Brush },
    Stroke { path: BezPath, width: f64, brush: Brush },
    FillScreen(Color),
}

/// A surface that records what is drawn instead of rasterizing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    clip_depth: usize,
    clears: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands recorded since the last clear, including the clear itself.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// How many times the surface has been cleared, i.e. rendered.
    pub fn clear_count(&self) -> usize {
        self.clears
    }

    /// Number of fill and stroke operations in the current list.
    pub fn paint_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| {
                matches!(
                    command,
                    DrawCommand::Fill { .. } | DrawCommand::Stroke { .. } | DrawCommand::FillScreen(_)
                )
            })
            .count()
    }

    /// Transform set most recently.
    pub fn current_transform(&self) -> Option<Affine> {
        self.commands.iter().rev().find_map(|command| match command {
            DrawCommand::SetTransform(transform) => Some(*transform),
            _ => None,
        })
    }

    /// Check that every pushed clip was popped.
    pub fn validate(&self) -> RenderResult<()> {
        if self.clip_depth == 0 {
            Ok(())
        } else {
            Err(RenderError::Surface(format!(
                "{} clip(s) still pushed",
                self.clip_depth
            )))
        }
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
        self.clip_depth = 0;
        self.clears += 1;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.commands.push(DrawCommand::SetTransform(transform));
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clip_depth += 1;
        self.commands.push(DrawCommand::PushClip(rect));
    }

    fn pop_clip(&mut self) {
        if self.clip_depth == 0 {
            log::warn!("pop_clip without a matching push_clip");
            return;
        }
        self.clip_depth -= 1;
        self.commands.push(DrawCommand::PopClip);
    }

    fn fill(&mut self, path: &BezPath, brush: &Brush) {
        self.commands.push(DrawCommand::Fill {
            path: path.clone(),
            brush: brush.clone(),
        });
    }

    fn stroke(&mut self, path: &BezPath, width: f64, brush: &Brush) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            width,
            brush: brush.clone(),
        });
    }

    fn fill_screen(&mut self, color: Color) {
        self.commands.push(DrawCommand::FillScreen(color));
    }
}

/// One recording surface per layer, each with a presentation offset.
#[derive(Debug, Clone, Default)]
pub struct LayerStack {
    layers: Vec<RecordingSurface>,
    offsets: Vec<Vec2>,
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, layer: LayerId) {
        if self.layers.len() <= layer.0 {
            self.layers.resize_with(layer.0 + 1, RecordingSurface::default);
            self.offsets.resize(layer.0 + 1, Vec2::ZERO);
        }
    }

    pub fn layer(&self, layer: LayerId) -> Option<&RecordingSurface> {
        self.layers.get(layer.0)
    }

    /// Offset the layer is presented at, in device pixels.
    pub fn offset(&self, layer: LayerId) -> Vec2 {
        self.offsets.get(layer.0).copied().unwrap_or(Vec2::ZERO)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Check every layer for unbalanced clips.
    pub fn validate(&self) -> RenderResult<()> {
        for (index, layer) in self.layers.iter().enumerate() {
            layer
                .validate()
                .map_err(|err| RenderError::RenderFailed(format!("layer {index}: {err}")))?;
        }
        Ok(())
    }
}

impl Compositor for LayerStack {
    fn surface(&mut self, layer: LayerId) -> &mut dyn Surface {
        self.ensure(layer);
        &mut self.layers[layer.0]
    }

    fn set_offset(&mut self, layer: LayerId, offset: Vec2) {
        self.ensure(layer);
        self.offsets[layer.0] = offset;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_records_commands() {
        let mut surface = RecordingSurface::new();
        surface.clear();
        surface.set_transform(Affine::scale(2.0));
        surface.fill_circle(Point::new(1.0, 1.0), 3.0, &Brush::Solid(Color::WHITE));
        surface.fill_screen(Color::BLACK);

        assert_eq!(surface.clear_count(), 1);
        assert_eq!(surface.paint_count(), 2);
        assert_eq!(surface.current_transform(), Some(Affine::scale(2.0)));
    }

    #[test]
    fn test_unbalanced_clip_is_reported() {
        let mut surface = RecordingSurface::new();
        surface.push_clip(Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(matches!(surface.validate(), Err(RenderError::Surface(_))));
        surface.pop_clip();
        assert!(surface.validate().is_ok());
        surface.pop_clip();
        assert!(surface.validate().is_ok());
    }

    #[test]
    fn test_layer_stack_grows_on_demand() {
        let mut stack = LayerStack::new();
        stack.set_offset(LayerId(2), Vec2::new(3.0, 4.0));
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.offset(LayerId(2)), Vec2::new(3.0, 4.0));
        assert!(!stack.is_shared());
        stack.surface(LayerId(1)).push_clip(Rect::new(0.0, 0.0, 1.0, 1.0));
        assert!(matches!(stack.validate(), Err(RenderError::RenderFailed(_))));
    }
}

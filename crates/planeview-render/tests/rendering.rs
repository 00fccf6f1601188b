//! Rendering a headless viewport into recording surfaces.

use kurbo::{Point, Size, Vec2};
use peniko::{Brush, Color};
use planeview_core::{
    Capabilities, LayerId, SceneObject, Surface, ViewState, Viewport, ViewportConfig,
};
use planeview_render::{DrawCommand, LayerStack, RecordingSurface};

struct Dot {
    position: Point,
}

impl SceneObject for Dot {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            drawable: true,
            ..Capabilities::NONE
        }
    }

    fn position(&self) -> Point {
        self.position
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &ViewState) {
        surface.fill_circle(self.position, self.size(), &Brush::Solid(Color::BLACK));
    }
}

fn viewport(config: ViewportConfig) -> Viewport {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut viewport = Viewport::headless(config).expect("valid config");
    viewport.resize(Size::new(800.0, 600.0));
    viewport
}

#[test]
fn test_frame_draws_background_then_objects() {
    let mut viewport = viewport(ViewportConfig::default());
    viewport.register(Dot {
        position: Point::new(10.0, 10.0),
    });

    let mut surface = RecordingSurface::new();
    viewport.frame_now(&mut surface);

    let commands = surface.commands();
    assert_eq!(commands[0], DrawCommand::Clear);
    assert_eq!(
        commands[1],
        DrawCommand::SetTransform(viewport.view().transform().device_affine())
    );
    assert!(matches!(commands[2], DrawCommand::FillScreen(_)));
    assert!(matches!(commands[3], DrawCommand::Fill { .. }));
    assert_eq!(surface.paint_count(), 2);
    assert!(surface.validate().is_ok());
}

#[test]
fn test_bounded_frame_is_clipped_to_active_area() {
    let config = ViewportConfig {
        bounded: true,
        ..Default::default()
    };
    let mut viewport = viewport(config);
    let mut surface = RecordingSurface::new();
    viewport.frame_now(&mut surface);

    let active = viewport.view().active_area();
    let commands = surface.commands();
    assert_eq!(commands[2], DrawCommand::PushClip(active));
    assert_eq!(commands.last(), Some(&DrawCommand::PopClip));
    assert!(surface.validate().is_ok());
}

#[test]
fn test_idle_frame_draws_nothing() {
    let mut viewport = viewport(ViewportConfig::default());
    let mut surface = RecordingSurface::new();
    viewport.frame_now(&mut surface);
    viewport.frame_now(&mut surface);
    assert_eq!(surface.clear_count(), 1);

    viewport.request_redraw_all();
    viewport.frame_now(&mut surface);
    assert_eq!(surface.clear_count(), 2);
}

#[test]
fn test_lazy_pan_is_presented_as_device_offset() {
    let config = ViewportConfig {
        lazy_transform: Some(10_000),
        pixel_ratio: 2.0,
        ..Default::default()
    };
    let mut viewport = viewport(config);
    let hud = viewport.add_layer("hud", true);
    let mut stack = LayerStack::new();
    viewport.frame_now(&mut stack);

    viewport.set_pan_center(Vec2::new(15.0, -5.0), false);
    viewport.frame_now(&mut stack);

    let main = stack.layer(LayerId::MAIN).expect("main layer");
    assert_eq!(main.clear_count(), 1);
    assert_eq!(stack.offset(LayerId::MAIN), Vec2::new(30.0, -10.0));
    assert_eq!(stack.offset(hud), Vec2::ZERO);
    assert!(stack.validate().is_ok());
}

#[test]
fn test_shared_surface_ignores_lazy_pan() {
    let config = ViewportConfig {
        lazy_transform: Some(10_000),
        ..Default::default()
    };
    let mut viewport = viewport(config);
    let mut surface = RecordingSurface::new();
    viewport.frame_now(&mut surface);

    viewport.set_pan_center(Vec2::new(15.0, 0.0), false);
    viewport.frame_now(&mut surface);

    // a single surface cannot be offset, so the pan is drawn immediately
    assert_eq!(surface.clear_count(), 2);
    assert_eq!(
        surface.current_transform(),
        Some(viewport.view().transform().device_affine())
    );
}

//! Shared fixtures: a journaling scene object, a counting host and
//! recording surfaces.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};
use peniko::{Brush, Color};
use planeview_core::{
    ButtonEvent, Capabilities, Compositor, CursorKind, Host, LayerId, ObjectContext,
    PointerSample, SceneObject, Surface, Tick, ViewState, Viewport, ViewportConfig, WheelEvent,
};

pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// Entries of `journal` that start with `prefix`.
pub fn entries(journal: &Journal, prefix: &str) -> Vec<String> {
    journal
        .borrow()
        .iter()
        .filter(|entry| entry.starts_with(prefix))
        .cloned()
        .collect()
}

pub fn count(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| e.as_str() == entry).count()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A scene object that writes `name:callback` into a journal for every
/// callback it receives.
pub struct Probe {
    pub name: String,
    pub position: Point,
    pub size: f64,
    pub z: i32,
    pub caps: Capabilities,
    pub block_all: bool,
    pub block_overlap: bool,
    pub block_click: bool,
    pub block_wheel: bool,
    pub ignore_click: bool,
    pub hover_cursor: Option<CursorKind>,
    pub forget_on_click: bool,
    /// Pan the view along with the pointer while dragged, quietly.
    pub pan_on_drag: bool,
    pub layer: LayerId,
    journal: Journal,
}

impl Probe {
    pub fn new(name: &str, position: Point, size: f64, journal: &Journal) -> Self {
        Self {
            name: name.to_string(),
            position,
            size,
            z: 0,
            caps: Capabilities::INTERACTIVE,
            block_all: false,
            block_overlap: true,
            block_click: true,
            block_wheel: false,
            ignore_click: false,
            hover_cursor: None,
            forget_on_click: false,
            pan_on_drag: false,
            layer: LayerId::MAIN,
            journal: journal.clone(),
        }
    }

    pub fn with_z(mut self, z: i32) -> Self {
        self.z = z;
        self
    }

    pub fn tickable(mut self) -> Self {
        self.caps.tickable = true;
        self
    }

    fn log(&self, callback: &str) {
        self.journal
            .borrow_mut()
            .push(format!("{}:{}", self.name, callback));
    }
}

impl SceneObject for Probe {
    fn capabilities(&self) -> Capabilities {
        self.caps
    }

    fn position(&self) -> Point {
        self.position
    }

    fn size(&self) -> f64 {
        self.size
    }

    fn z_order(&self) -> i32 {
        self.z
    }

    fn layer(&self) -> LayerId {
        self.layer
    }

    fn draw(&self, surface: &mut dyn Surface, _view: &ViewState) {
        surface.fill_circle(self.position, self.size, &Brush::Solid(Color::BLACK));
    }

    fn block_all_pointer_events(&self, _view: &ViewState, _sample: &PointerSample) -> bool {
        self.block_all
    }

    fn block_overlap(&self, _view: &ViewState, _sample: &PointerSample) -> bool {
        self.block_overlap
    }

    fn block_click(&self, _view: &ViewState, _event: &ButtonEvent) -> bool {
        self.block_click
    }

    fn ignore_click(&self, _view: &ViewState, _event: &ButtonEvent) -> bool {
        self.ignore_click
    }

    fn block_wheel(&self, _view: &ViewState, _event: &WheelEvent) -> bool {
        self.block_wheel
    }

    fn tick(&mut self, _ctx: &mut ObjectContext<'_>, tick: &Tick) {
        self.log(&format!("tick{}", tick.multiplier));
    }

    fn on_awareness_started(&mut self, _ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        self.log("awareness_started");
    }

    fn on_awareness_ended(&mut self, _ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        self.log("awareness_ended");
    }

    fn on_overlap_started(&mut self, ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        self.log("overlap_started");
        if let Some(cursor) = self.hover_cursor {
            ctx.suggest_cursor(cursor);
        }
    }

    fn on_overlap_moved(&mut self, _ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        self.log("overlap_moved");
    }

    fn on_overlap_ended(&mut self, ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        self.log("overlap_ended");
        if let Some(cursor) = self.hover_cursor {
            ctx.unsuggest_cursor(cursor);
        }
    }

    fn on_pressed(&mut self, ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        assert!(ctx.is_held());
        self.log("pressed");
    }

    fn on_unpressed(&mut self, _ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        self.log("unpressed");
    }

    fn on_mouse_up(&mut self, _ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        self.log("mouse_up");
    }

    fn on_clicked(&mut self, ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        self.log("clicked");
        if self.forget_on_click {
            ctx.forget_self();
        }
    }

    fn on_drag_started(&mut self, ctx: &mut ObjectContext<'_>, _sample: &PointerSample) {
        assert!(ctx.is_dragged());
        self.log("drag_started");
    }

    fn on_dragged(&mut self, ctx: &mut ObjectContext<'_>, sample: &PointerSample) {
        self.log("dragged");
        if self.pan_on_drag {
            let pan = ctx.pan_center() + sample.element_delta;
            ctx.set_pan_center(pan, true);
        }
    }

    fn on_drag_ended(&mut self, _ctx: &mut ObjectContext<'_>, _event: &ButtonEvent) {
        self.log("drag_ended");
    }

    fn on_wheel(&mut self, _ctx: &mut ObjectContext<'_>, _event: &WheelEvent) {
        self.log("wheel");
    }

    fn on_forget(&mut self, _ctx: &mut ObjectContext<'_>) {
        self.log("forget");
    }
}

/// What the engine asked of its host.
#[derive(Debug, Default)]
pub struct HostLog {
    pub frames: usize,
    pub cursors: Vec<CursorKind>,
}

#[derive(Clone, Default)]
pub struct CountingHost(pub Rc<RefCell<HostLog>>);

impl Host for CountingHost {
    fn request_frame(&mut self) {
        self.0.borrow_mut().frames += 1;
    }

    fn set_cursor(&mut self, cursor: CursorKind) {
        self.0.borrow_mut().cursors.push(cursor);
    }
}

/// Surface that counts clears and paints.
#[derive(Debug, Default)]
pub struct TestSurface {
    pub clears: usize,
    pub paints: usize,
    pub clips: Vec<Rect>,
    pub transform: Affine,
}

impl Surface for TestSurface {
    fn clear(&mut self) {
        self.clears += 1;
        self.paints = 0;
    }

    fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    fn push_clip(&mut self, rect: Rect) {
        self.clips.push(rect);
    }

    fn pop_clip(&mut self) {}

    fn fill(&mut self, _path: &BezPath, _brush: &Brush) {
        self.paints += 1;
    }

    fn stroke(&mut self, _path: &BezPath, _width: f64, _brush: &Brush) {
        self.paints += 1;
    }

    fn fill_screen(&mut self, _color: Color) {
        self.paints += 1;
    }
}

/// Per-layer test surfaces with offsets.
#[derive(Debug, Default)]
pub struct TestStack {
    pub layers: Vec<TestSurface>,
    pub offsets: Vec<Vec2>,
}

impl TestStack {
    fn ensure(&mut self, layer: LayerId) {
        while self.layers.len() <= layer.0 {
            self.layers.push(TestSurface::default());
            self.offsets.push(Vec2::ZERO);
        }
    }
}

impl Compositor for TestStack {
    fn surface(&mut self, layer: LayerId) -> &mut dyn Surface {
        self.ensure(layer);
        &mut self.layers[layer.0]
    }

    fn set_offset(&mut self, layer: LayerId, offset: Vec2) {
        self.ensure(layer);
        self.offsets[layer.0] = offset;
    }
}

/// Element size used by the fixtures. With the default 500x500 content and
/// shrink fitting, the fitting scale is 1.2 and element (400, 300) maps to
/// the viewport origin.
pub const SURFACE: Size = Size::new(800.0, 600.0);

pub const CENTER: Point = Point::new(400.0, 300.0);

/// A resized, active viewport with a counting host.
pub fn viewport(config: ViewportConfig) -> (Viewport, CountingHost) {
    init_logging();
    let host = CountingHost::default();
    let mut viewport = Viewport::new(config, host.clone()).expect("valid config");
    viewport.resize(SURFACE);
    viewport.pointer_entered();
    (viewport, host)
}

/// Element position of a viewport-space point.
pub fn screen(viewport: &Viewport, point: Point) -> Point {
    viewport.view().to_screen_space(point)
}

//! Frames, redraw scheduling, ticking, activation and keyboard input.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use common::{CENTER, CountingHost, Probe, SURFACE, TestStack, TestSurface, count, journal, viewport};
use kurbo::{Affine, Point, Size, Vec2};
use planeview_core::{Instant, Key, LayerId, MouseButton, Viewport, ViewportConfig};

fn frames(host: &CountingHost) -> usize {
    host.0.borrow().frames
}

#[test]
fn test_redraw_requests_coalesce_into_one_frame() {
    let (mut viewport, host) = viewport(ViewportConfig::default());
    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);
    let before = frames(&host);

    viewport.request_redraw_all();
    viewport.request_layer_redraw(LayerId::MAIN);
    viewport.set_pan_center(Vec2::new(5.0, 0.0), false);
    viewport.set_zoom_factor(1.5);
    assert_eq!(frames(&host), before + 1);

    viewport.frame_now(&mut stack);
    assert_eq!(stack.layers[0].clears, 2);

    // nothing pending: no render and no keep-alive request
    viewport.frame_now(&mut stack);
    assert_eq!(stack.layers[0].clears, 2);
    assert_eq!(frames(&host), before + 1);
}

#[test]
fn test_render_uses_device_transform_and_clips_when_bounded() {
    let config = ViewportConfig {
        bounded: true,
        pixel_ratio: 2.0,
        ..Default::default()
    };
    let (mut viewport, _host) = viewport(config);
    let log = journal();
    viewport.register(Probe::new("a", Point::ZERO, 10.0, &log));
    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);

    let main = &stack.layers[0];
    assert_eq!(main.transform, viewport.view().transform().device_affine());
    assert_eq!(main.clips, vec![viewport.view().active_area()]);
    // background and probe
    assert_eq!(main.paints, 2);
}

#[test]
fn test_shared_surface_redraws_everything_once() {
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let hud = viewport.add_layer("hud", true);
    let log = journal();
    let mut overlay = Probe::new("overlay", Point::new(20.0, 20.0), 5.0, &log);
    overlay.layer = hud;
    viewport.register(overlay);

    let mut surface = TestSurface::default();
    viewport.frame_now(&mut surface);
    assert_eq!(surface.clears, 1);
    assert_eq!(surface.paints, 2);
    // the fixed layer is drawn last, in screen space
    assert_eq!(surface.transform, Affine::scale(1.0));
}

#[test]
fn test_pan_leaves_fixed_layers_alone() {
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let hud = viewport.add_layer("hud", true);
    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);
    assert_eq!(stack.layers[hud.0].clears, 1);

    viewport.set_pan_center(Vec2::new(30.0, 0.0), false);
    viewport.frame_now(&mut stack);

    assert_eq!(stack.layers[0].clears, 2);
    assert_eq!(stack.layers[hud.0].clears, 1);
}

#[test]
fn test_lazy_pan_offsets_layers_until_delay_expires() {
    let config = ViewportConfig {
        lazy_transform: Some(100),
        ..Default::default()
    };
    let (mut viewport, host) = viewport(config);
    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);
    assert_eq!(stack.layers[0].clears, 1);

    viewport.set_pan_center(Vec2::new(30.0, 0.0), false);
    let now = Instant::now();
    viewport.frame(now, &mut stack);
    assert_eq!(stack.layers[0].clears, 1);
    assert_eq!(stack.offsets[0], Vec2::new(30.0, 0.0));
    assert!(viewport.view().scheduler().lazy_waiting());
    let waiting = frames(&host);

    viewport.frame(now + Duration::from_millis(200), &mut stack);
    assert_eq!(stack.layers[0].clears, 2);
    assert_eq!(stack.offsets[0], Vec2::ZERO);
    assert!(!viewport.view().scheduler().lazy_waiting());
    assert_eq!(frames(&host), waiting);
}

#[test]
fn test_ticks_carry_whole_intervals() {
    let config = ViewportConfig {
        target_tickrate: 50,
        ..Default::default()
    };
    let (mut viewport, host) = viewport(config);
    let log = journal();
    viewport.register(Probe::new("t", Point::ZERO, 1.0, &log).tickable());
    assert_eq!(viewport.view().tickable_count(), 1);

    let ticks = Rc::new(RefCell::new(0u32));
    let sink = ticks.clone();
    viewport.bus_mut().tick.subscribe(move |_view, tick| {
        *sink.borrow_mut() += tick.multiplier;
    });

    let mut stack = TestStack::default();
    let start = Instant::now();
    viewport.frame(start, &mut stack);
    assert_eq!(count(&log, "t:tick2"), 0);

    let before = frames(&host);
    viewport.frame(start + Duration::from_millis(45), &mut stack);
    assert_eq!(count(&log, "t:tick2"), 1);
    assert_eq!(*ticks.borrow(), 2);
    // tickables keep the frame loop alive
    assert_eq!(frames(&host), before + 1);
}

#[test]
fn test_minimized_viewport_drops_input_and_frames() {
    let log = journal();
    let (mut viewport, host) = viewport(ViewportConfig::default());
    viewport.register(Probe::new("a", Point::ZERO, 10.0, &log));
    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);

    viewport.resize(Size::new(800.0, 3.0));
    assert!(viewport.view().is_minimized());
    assert!(!viewport.view().is_active());

    let before = frames(&host);
    viewport.pointer_moved(CENTER);
    viewport.pointer_pressed(MouseButton::Left);
    viewport.request_redraw_all();
    assert_eq!(viewport.view().pointer().element_position, Point::ZERO);
    assert!(!viewport.view().is_pressed());
    assert_eq!(frames(&host), before);
    assert_eq!(count(&log, "a:pressed"), 0);

    viewport.resize(SURFACE);
    assert!(viewport.view().is_active());
    assert_eq!(frames(&host), before + 1);
    viewport.frame_now(&mut stack);
    assert_eq!(stack.layers[0].clears, 2);
}

#[test]
fn test_deactivation_cancels_press_silently() {
    let log = journal();
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let a = viewport.register(Probe::new("a", Point::ZERO, 10.0, &log));
    viewport.pointer_moved(CENTER);
    viewport.pointer_pressed(MouseButton::Left);
    assert!(viewport.view().is_held(a));

    viewport.set_visible(false);
    assert!(!viewport.view().is_pressed());
    assert!(!viewport.view().is_held(a));

    viewport.pointer_released(MouseButton::Left);
    assert_eq!(count(&log, "a:unpressed"), 0);
    assert_eq!(count(&log, "a:clicked"), 0);
}

#[test]
fn test_deferred_resize_applies_on_next_frame() {
    common::init_logging();
    let host = CountingHost::default();
    let config = ViewportConfig {
        responsive_resize: false,
        ..Default::default()
    };
    let mut viewport = Viewport::new(config, host.clone()).expect("valid config");
    assert!(viewport.view().is_minimized());

    viewport.resize(SURFACE);
    assert!(viewport.view().is_minimized());
    assert_eq!(frames(&host), 1);

    let mut stack = TestStack::default();
    viewport.frame_now(&mut stack);
    assert!(viewport.view().is_active());
    assert_eq!(viewport.view().surface_size(), SURFACE);
    assert_eq!(viewport.view().fitting_scale(), 1.2);
    assert_eq!(stack.layers[0].clears, 1);
}

#[test]
fn test_resize_listeners_see_fitting_scale() {
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    viewport.bus_mut().resize.subscribe(move |_view, event| {
        sink.borrow_mut().push(event.fitting_scale);
    });

    viewport.resize(Size::new(1000.0, 1000.0));
    assert_eq!(*seen.borrow(), vec![2.0]);
}

#[test]
fn test_keys_reported_only_over_element() {
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let seen = Rc::new(RefCell::new(Vec::new()));
    let down = seen.clone();
    viewport.bus_mut().key_down.subscribe(move |_view, event| {
        down.borrow_mut().push(format!("down {:?} shift={}", event.key, event.modifiers.shift));
    });
    let up = seen.clone();
    viewport.bus_mut().key_up.subscribe(move |_view, event| {
        up.borrow_mut().push(format!("up {:?}", event.key));
    });

    viewport.key_down(Key::Shift);
    assert!(viewport.view().modifiers().shift);
    viewport.key_down(Key::from_name("a"));
    assert!(viewport.view().is_key_down(&Key::from_name("a")));

    viewport.pointer_left();
    viewport.key_down(Key::from_name("b"));
    viewport.key_up(Key::from_name("b"));
    viewport.key_up(Key::from_name("a"));
    viewport.key_up(Key::Shift);
    assert!(!viewport.view().modifiers().shift);

    assert_eq!(
        *seen.borrow(),
        vec![
            format!("down {:?} shift=true", Key::from_name("a")),
            format!("up {:?}", Key::from_name("a")),
        ]
    );
}

#[test]
fn test_forget_rules() {
    let log = journal();
    let (mut viewport, _host) = viewport(ViewportConfig::default());
    let a = viewport.register(Probe::new("a", Point::ZERO, 10.0, &log));
    let background = viewport.background_id();

    assert!(!viewport.forget(background));
    assert!(viewport.view().is_registered(background));

    assert!(viewport.forget(a));
    assert!(!viewport.forget(a));
    assert_eq!(count(&log, "a:forget"), 1);

    viewport.register(Probe::new("b", Point::ZERO, 10.0, &log));
    viewport.forget_all();
    assert_eq!(viewport.object_count(), 1);
    assert!(viewport.object::<Probe>(background).is_none());
}

#[test]
fn test_config_from_json_drives_viewport() {
    let config = ViewportConfig::from_json(r#"{ "bounded": true, "min_zoom": 0.5 }"#)
        .expect("valid json");
    let (viewport, _host) = viewport(config);
    assert!(viewport.view().is_bounded());
    assert_eq!(viewport.view().zoom_bounds(), (0.5, 2.0));
}

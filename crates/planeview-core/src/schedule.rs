//! Redraw and resize scheduling.

use kurbo::{Size, Vec2};
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Identifier of a drawing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LayerId(pub usize);

impl LayerId {
    /// The layer every viewport starts with.
    pub const MAIN: LayerId = LayerId(0);
}

/// Why a layer was invalidated. Kept for debugging redraw storms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RedrawCause {
    Registered,
    Forgotten,
    Object,
    Pan,
    Zoom,
    Resize,
    Requested,
    LazyReset,
}

/// A drawing layer.
#[derive(Debug, Clone)]
pub struct Layer {
    pub name: String,
    /// Fixed layers are drawn in screen space and ignore navigation.
    pub fixed: bool,
    pending: bool,
    causes: Vec<RedrawCause>,
    committed_pan: Option<Vec2>,
}

impl Layer {
    fn new(name: impl Into<String>, fixed: bool) -> Self {
        Self {
            name: name.into(),
            fixed,
            // a new layer has never been drawn
            pending: true,
            causes: Vec::new(),
            committed_pan: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Causes accumulated since the last render.
    pub fn causes(&self) -> &[RedrawCause] {
        &self.causes
    }

    /// Pan the layer was last rendered at.
    pub fn committed_pan(&self) -> Option<Vec2> {
        self.committed_pan
    }

    fn invalidate(&mut self, cause: RedrawCause) {
        self.pending = true;
        if !self.causes.contains(&cause) {
            self.causes.push(cause);
        }
    }
}

/// Tracks which layers need redrawing and whether a frame has been asked
/// for. Requests between two frames coalesce into one.
#[derive(Debug, Clone)]
pub struct Scheduler {
    layers: Vec<Layer>,
    frame_requested: bool,
    pending_resize: Option<Size>,
    lazy_delay: Option<Duration>,
    /// A lazy pan happened since the last frame and has no timestamp yet.
    pan_unstamped: bool,
    last_pan_change: Option<Instant>,
}

impl Scheduler {
    /// Create a scheduler with the main layer. `lazy_delay` enables lazy
    /// transforms.
    pub fn new(lazy_delay: Option<Duration>) -> Self {
        Self {
            layers: vec![Layer::new("main", false)],
            frame_requested: false,
            pending_resize: None,
            lazy_delay,
            pan_unstamped: false,
            last_pan_change: None,
        }
    }

    /// Add a layer. Layers draw in the order they were added.
    pub fn add_layer(&mut self, name: impl Into<String>, fixed: bool) -> LayerId {
        self.layers.push(Layer::new(name, fixed));
        LayerId(self.layers.len() - 1)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    /// Ask for a frame. Returns true when the host must be told, false when a
    /// frame is already on its way.
    pub fn request_frame(&mut self) -> bool {
        !std::mem::replace(&mut self.frame_requested, true)
    }

    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    /// Mark the start of a frame callback; later requests need a new frame.
    pub fn begin_frame(&mut self) {
        self.frame_requested = false;
    }

    /// Invalidate one layer. Returns true when the host must be asked for a
    /// frame.
    pub fn invalidate(&mut self, layer: LayerId, cause: RedrawCause) -> bool {
        match self.layers.get_mut(layer.0) {
            Some(layer) => layer.invalidate(cause),
            None => {
                log::warn!("Redraw requested for unknown layer {:?}", layer);
                return false;
            }
        }
        self.request_frame()
    }

    /// Invalidate every layer.
    pub fn invalidate_all(&mut self, cause: RedrawCause) -> bool {
        for layer in &mut self.layers {
            layer.invalidate(cause);
        }
        self.request_frame()
    }

    fn invalidate_moving(&mut self, cause: RedrawCause) {
        for layer in self.layers.iter_mut().filter(|layer| !layer.fixed) {
            layer.invalidate(cause);
        }
    }

    /// Invalidate the layers that follow navigation.
    ///
    /// With lazy transforms enabled, a pan only restarts the delay and the
    /// layers are presented with an offset until it expires. Anything else
    /// cancels the wait and re-renders.
    ///
    /// The delay starts at the timestamp of the next frame, so it is
    /// measured on the host's frame clock.
    pub fn invalidate_navigation(&mut self, cause: RedrawCause) -> bool {
        if cause == RedrawCause::Pan && self.lazy_delay.is_some() {
            self.pan_unstamped = true;
        } else {
            self.pan_unstamped = false;
            self.last_pan_change = None;
            self.invalidate_moving(cause);
        }
        self.request_frame()
    }

    /// Re-render lazily panned layers once the delay has passed. Returns
    /// whether it did. A pan made since the last frame is stamped with `now`.
    pub fn expire_lazy(&mut self, now: Instant) -> bool {
        if std::mem::take(&mut self.pan_unstamped) {
            self.last_pan_change = Some(now);
            return false;
        }
        let (Some(changed), Some(delay)) = (self.last_pan_change, self.lazy_delay) else {
            return false;
        };
        if now.saturating_duration_since(changed) < delay {
            return false;
        }
        log::debug!("Lazy transform delay expired, re-rendering");
        self.last_pan_change = None;
        self.invalidate_moving(RedrawCause::LazyReset);
        true
    }

    /// Stop waiting and re-render now.
    pub fn interrupt_lazy(&mut self) {
        let unstamped = std::mem::take(&mut self.pan_unstamped);
        if self.last_pan_change.take().is_some() || unstamped {
            self.invalidate_moving(RedrawCause::LazyReset);
        }
    }

    /// Whether a lazy pan is waiting for its delay.
    pub fn lazy_waiting(&self) -> bool {
        self.pan_unstamped || self.last_pan_change.is_some()
    }

    /// Store a resize to be handled on the next frame.
    pub fn defer_resize(&mut self, size: Size) -> bool {
        self.pending_resize = Some(size);
        self.request_frame()
    }

    pub fn take_pending_resize(&mut self) -> Option<Size> {
        self.pending_resize.take()
    }

    /// Whether any layer needs rendering.
    pub fn any_pending(&self) -> bool {
        self.layers.iter().any(|layer| layer.pending)
    }

    /// Layers needing a render.
    pub fn pending_layers(&self) -> Vec<LayerId> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, layer)| layer.pending)
            .map(|(index, _)| LayerId(index))
            .collect()
    }

    /// Record that `layer` was rendered at `pan`.
    pub fn commit(&mut self, layer: LayerId, pan: Vec2) {
        if let Some(layer) = self.layers.get_mut(layer.0) {
            layer.pending = false;
            layer.causes.clear();
            layer.committed_pan = Some(pan);
        }
    }
}

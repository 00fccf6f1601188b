//! Planeview Core Library
//!
//! A pan/zoom viewport engine for 2D scenes: coordinate transforms, ordered
//! object registries, pointer dispatch, redraw scheduling and a fixed-rate
//! tick loop. Drawing goes through the [`Surface`] trait; backends live in
//! `planeview-render`.

pub mod background;
pub mod bus;
pub mod config;
pub mod cursor;
pub mod error;
pub mod event;
pub mod host;
pub mod object;
pub mod pointer;
pub mod registry;
pub mod schedule;
pub mod surface;
pub mod tick;
pub mod transform;
pub mod viewport;
pub mod zoom;

pub use background::Background;
pub use bus::{Channel, EventBus, ListenerId};
pub use config::ViewportConfig;
pub use cursor::{CursorKind, CursorSuggestions};
pub use error::{ViewportError, ViewportResult};
pub use event::{ButtonEvent, DispatchReport, Key, KeyEvent, Modifiers, MouseButton, PointerSample, ResizeEvent, WheelEvent};
pub use host::{Host, HostEvent, NullHost};
pub use object::{Capabilities, ObjectContext, ObjectId, SceneObject};
pub use pointer::PointerState;
pub use registry::{DepthKey, Registry};
pub use schedule::{LayerId, RedrawCause, Scheduler};
pub use surface::{Compositor, Surface};
pub use tick::{Tick, TickClock};
pub use transform::{FittingBasis, FittingMode, Transform};
pub use viewport::{Role, ViewState, Viewport};
pub use zoom::{ZoomAnchorMode, ZoomModel};

/// Timestamp type accepted by [`Viewport::frame`].
#[cfg(target_arch = "wasm32")]
pub use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
pub use std::time::Instant;

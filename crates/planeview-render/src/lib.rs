//! Planeview Render Library
//!
//! Drawing surfaces for the planeview engine. [`RecordingSurface`] keeps a
//! display list and needs no GPU; the default `vello-renderer` feature adds
//! a Vello scene backend.

mod error;
pub mod recording;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use error::{RenderError, RenderResult};
pub use recording::{DrawCommand, LayerStack, RecordingSurface};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::{VelloCompositor, VelloSurface};

//! Error types for viewport configuration.

use thiserror::Error;

/// Viewport errors.
///
/// Everything the engine does at runtime is synchronous local computation,
/// so the only failures are configuration mistakes. They are reported at the
/// point of use and never retried.
#[derive(Debug, Error)]
pub enum ViewportError {
    #[error("Invalid zoom range: minimum {min} is greater than maximum {max}")]
    InvalidZoomRange { min: f64, max: f64 },
    #[error("Unknown zoom anchor mode: {0}")]
    UnknownZoomAnchor(String),
    #[error("Unknown fitting mode: {0}")]
    UnknownFittingMode(String),
    #[error("Unknown cursor kind: {0}")]
    UnknownCursor(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for viewport operations.
pub type ViewportResult<T> = Result<T, ViewportError>;

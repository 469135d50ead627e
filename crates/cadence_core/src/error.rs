//! Error types

use thiserror::Error;

/// Errors surfaced by the animation runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CadenceError {
    /// The operation is not supported by this object
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// The tween id no longer refers to a live tween
    #[error("Tween no longer exists")]
    UnknownTween,

    /// A timeline-only operation was invoked on a single-target tween
    #[error("Operation requires a timeline")]
    NotATimeline,

    /// A tween-only operation was invoked on a timeline
    #[error("Operation requires a single-target tween")]
    NotATween,
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, CadenceError>;

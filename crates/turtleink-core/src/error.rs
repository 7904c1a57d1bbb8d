//! Error types shared by windows and drawing implements.

use thiserror::Error;

/// Errors reported by window and implement commands.
///
/// All of these are programmer errors rather than transient failures,
/// so nothing in the engine retries them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurtleError {
    /// A size, bound, or drawing attribute is out of range.
    #[error("Invalid geometry: {0}")]
    Geometry(String),
    /// A window config could not be parsed.
    #[error("Invalid config: {0}")]
    Config(String),
    /// The window (or the window an implement belongs to) was disposed.
    #[error("Window has been disposed")]
    Disposed,
    /// An implement could not be attached to its window.
    #[error("Attachment failed: {0}")]
    Attachment(String),
    /// A writer panicked while holding the window lock.
    #[error("Window state poisoned by a panicked writer")]
    Poisoned,
}

/// Result type for window and implement commands.
pub type TurtleResult<T> = Result<T, TurtleError>;

/// Shorthand for building a [`TurtleError::Geometry`].
pub(crate) fn geometry(message: impl Into<String>) -> TurtleError {
    TurtleError::Geometry(message.into())
}

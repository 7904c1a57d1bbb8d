//! Window construction options.

use crate::error::{TurtleError, TurtleResult, geometry};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default window title.
pub const DEFAULT_TITLE: &str = "Turtle Graphics";

/// Options for creating a [`Window`](crate::Window).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Screen position of the window's top-left corner.
    pub position: (i32, i32),
    /// Canvas size in pixels.
    pub size: (u32, u32),
    /// Smallest size the window may take.
    pub min_size: Option<(u32, u32)>,
    /// Largest size the window may take.
    pub max_size: Option<(u32, u32)>,
    /// Window title.
    pub title: String,
    /// Whether the user may resize the window.
    pub resizable: bool,
    /// Time an animated step waits before the next one (0 = just yield).
    pub frame_interval_ms: u64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            position: (50, 50),
            size: (700, 700),
            min_size: None,
            max_size: None,
            title: DEFAULT_TITLE.to_string(),
            resizable: true,
            frame_interval_ms: 0,
        }
    }
}

impl WindowConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> TurtleResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TurtleError::Config(format!("window config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the window position.
    pub fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = (x, y);
        self
    }

    /// Set the canvas size.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    /// Set the minimum size.
    pub fn with_min_size(mut self, width: u32, height: u32) -> Self {
        self.min_size = Some((width, height));
        self
    }

    /// Set the maximum size.
    pub fn with_max_size(mut self, width: u32, height: u32) -> Self {
        self.max_size = Some((width, height));
        self
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set whether the window is resizable.
    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    /// Set the pause between animation frames.
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Pause between animation frames.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Check that size and bounds are consistent.
    pub fn validate(&self) -> TurtleResult<()> {
        check_dimensions("size", self.size)?;
        if let Some(min) = self.min_size {
            check_dimensions("min size", min)?;
        }
        if let Some(max) = self.max_size {
            check_dimensions("max size", max)?;
        }
        check_bounds(self.size, self.min_size, self.max_size)
    }
}

/// Reject degenerate (zero) dimensions.
pub(crate) fn check_dimensions(what: &str, (width, height): (u32, u32)) -> TurtleResult<()> {
    if width == 0 || height == 0 {
        return Err(geometry(format!("{} {}x{} has a zero dimension", what, width, height)));
    }
    Ok(())
}

/// Check that `min <= size <= max` and `min <= max` on both axes.
pub(crate) fn check_bounds(
    size: (u32, u32),
    min: Option<(u32, u32)>,
    max: Option<(u32, u32)>,
) -> TurtleResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min.0 > max.0 || min.1 > max.1 {
            return Err(geometry(format!(
                "min size {}x{} exceeds max size {}x{}",
                min.0, min.1, max.0, max.1
            )));
        }
    }
    if let Some(min) = min {
        if size.0 < min.0 || size.1 < min.1 {
            return Err(geometry(format!(
                "size {}x{} is below min size {}x{}",
                size.0, size.1, min.0, min.1
            )));
        }
    }
    if let Some(max) = max {
        if size.0 > max.0 || size.1 > max.1 {
            return Err(geometry(format!(
                "size {}x{} is above max size {}x{}",
                size.0, size.1, max.0, max.1
            )));
        }
    }
    Ok(())
}

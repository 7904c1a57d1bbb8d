//! TurtleInk Core Library
//!
//! Windows, turtles and pens for educational 2D drawing. World coordinates
//! put the origin at the center of the canvas with y pointing up; every
//! primitive reaches the [`Surface`] in device coordinates.

pub mod animation;
pub mod config;
pub mod error;
pub mod implements;
pub mod recording;
pub mod surface;
pub mod transform;
pub mod window;

pub use animation::{DEFAULT_SPEED, FrameClock, FrameTicker, MAX_SPEED, SegmentSteps, Step, step_count};
pub use config::WindowConfig;
pub use error::{TurtleError, TurtleResult};
pub use implements::{DrawMode, Implement, Pen, PenOptions, Turtle, TurtleOptions};
pub use recording::{RecordingSurface, SurfaceEvent};
pub use surface::{
    Cursor, CursorKind, ImplementId, LineStyle, Oval, Polygon, Primitive, Rectangle, Segment, Surface,
};
pub use transform::CanvasTransform;
pub use window::{ImplementKind, Window, WindowGeometry};

#[cfg(test)]
mod concurrency_tests;

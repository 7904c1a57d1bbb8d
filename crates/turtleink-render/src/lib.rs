//! TurtleInk Render Library
//!
//! Canvas surfaces for TurtleInk windows. Geometry conversion and the
//! retained display list are always available; the vello scene surface is
//! behind the default `vello-renderer` feature.

mod display;
mod renderer;

#[cfg(feature = "vello-renderer")]
mod vello_impl;

pub use display::DisplayList;
pub use renderer::{
    CURSOR_SIZE, RenderError, RenderResult, cursor_path, oval_ellipse, polygon_path, segment_line,
    stroke_for, validate,
};

#[cfg(feature = "vello-renderer")]
pub use vello_impl::SceneSurface;

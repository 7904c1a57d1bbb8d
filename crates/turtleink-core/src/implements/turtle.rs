//! Heading-driven turtle.

use super::{DrawState, Implement, check_finite};
use crate::animation::DEFAULT_SPEED;
use crate::error::TurtleResult;
use crate::surface::ImplementId;
use crate::window::{ImplementKind, Window};
use kurbo::{Point, Vec2};
use peniko::Color;

/// Whether moving the turtle leaves a line behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawMode {
    /// `forward`/`backward` draw a line.
    #[default]
    Draw,
    /// `forward`/`backward` only reposition.
    MoveOnly,
}

/// Construction options for a [`Turtle`]. Also what [`Turtle::reset`] returns to.
#[derive(Debug, Clone)]
pub struct TurtleOptions {
    pub position: Point,
    /// Degrees counter-clockwise from east.
    pub heading: f64,
    pub color: Color,
    pub speed: u32,
}

impl Default for TurtleOptions {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            heading: 0.0,
            color: Color::from_rgba8(255, 0, 0, 255),
            speed: DEFAULT_SPEED,
        }
    }
}

/// Normalize an angle in degrees to `[0, 360)`.
pub(crate) fn normalize_heading(degrees: f64) -> f64 {
    let heading = degrees.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.
    if heading >= 360.0 { 0.0 } else { heading }
}

/// A graphics turtle.
///
/// The turtle is attached to its window for life. Once the window is
/// disposed every command fails with [`TurtleError::Disposed`](crate::TurtleError::Disposed).
#[derive(Debug)]
pub struct Turtle {
    state: DrawState,
    heading: f64,
    mode: DrawMode,
    origin: TurtleOptions,
}

impl Turtle {
    /// Attach a red turtle at the origin, facing east.
    pub fn new(window: &Window) -> TurtleResult<Self> {
        Self::with_options(window, TurtleOptions::default())
    }

    /// Attach a turtle with the given starting state.
    pub fn with_options(window: &Window, options: TurtleOptions) -> TurtleResult<Self> {
        check_finite("heading", &[options.heading])?;
        let state = DrawState::attach(
            window,
            ImplementKind::Turtle,
            options.position,
            options.color,
            options.color,
            options.speed,
        )?;
        let heading = normalize_heading(options.heading);
        let turtle = Self {
            state,
            heading,
            mode: DrawMode::Draw,
            origin: options,
        };
        turtle.state.refresh_cursor(turtle.heading)?;
        Ok(turtle)
    }

    pub fn x(&self) -> f64 {
        self.state.position.x
    }

    pub fn y(&self) -> f64 {
        self.state.position.y
    }

    /// Heading in degrees, in `[0, 360)`, counter-clockwise from east.
    pub fn heading(&self) -> f64 {
        self.heading
    }

    /// Point the turtle in an absolute direction.
    pub fn set_heading(&mut self, degrees: f64) -> TurtleResult<()> {
        check_finite("heading", &[degrees])?;
        self.state.ensure_live()?;
        self.heading = normalize_heading(degrees);
        self.state.mark = true;
        self.state.refresh_cursor(self.heading)
    }

    pub fn color(&self) -> Color {
        self.state.edge
    }

    /// Set the line color. Lines already drawn, or being drawn, keep theirs.
    pub fn set_color(&mut self, color: Color) -> TurtleResult<()> {
        self.state.set_colors(color, color, self.heading)
    }

    pub fn draw_mode(&self) -> DrawMode {
        self.mode
    }

    pub fn set_draw_mode(&mut self, mode: DrawMode) -> TurtleResult<()> {
        self.state.ensure_live()?;
        self.mode = mode;
        self.state.mark = true;
        Ok(())
    }

    /// Move along the heading, drawing if the draw mode is [`DrawMode::Draw`].
    /// Negative distances move backward.
    pub fn forward(&mut self, distance: f64) -> TurtleResult<()> {
        check_finite("distance", &[distance])?;
        let target = self.state.position + self.direction() * distance;
        self.advance(target)
    }

    /// Move against the heading, drawing if the draw mode is [`DrawMode::Draw`].
    pub fn backward(&mut self, distance: f64) -> TurtleResult<()> {
        check_finite("distance", &[distance])?;
        let target = self.state.position - self.direction() * distance;
        self.advance(target)
    }

    /// Turn counter-clockwise. Never draws or animates.
    pub fn left(&mut self, degrees: f64) -> TurtleResult<()> {
        check_finite("angle", &[degrees])?;
        self.set_heading(self.heading + degrees)
    }

    /// Turn clockwise. Never draws or animates.
    pub fn right(&mut self, degrees: f64) -> TurtleResult<()> {
        check_finite("angle", &[degrees])?;
        self.set_heading(self.heading - degrees)
    }

    fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.heading.to_radians())
    }

    fn advance(&mut self, target: Point) -> TurtleResult<()> {
        match self.mode {
            DrawMode::Draw => self.state.trace_segment(target, self.heading),
            DrawMode::MoveOnly => self.state.jump_to(target, self.heading),
        }
    }
}

impl Implement for Turtle {
    fn id(&self) -> ImplementId {
        self.state.id()
    }

    fn kind(&self) -> ImplementKind {
        self.state.kind()
    }

    fn position(&self) -> Point {
        self.state.position
    }

    fn speed(&self) -> u32 {
        self.state.speed
    }

    fn set_speed(&mut self, speed: u32) -> TurtleResult<()> {
        self.state.set_speed(speed, self.heading)
    }

    fn stroke_width(&self) -> f64 {
        self.state.width
    }

    fn set_stroke_width(&mut self, width: f64) -> TurtleResult<()> {
        self.state.set_width(width)
    }

    fn dash(&self) -> &[f64] {
        &self.state.dash
    }

    fn set_dash(&mut self, dash: &[f64]) -> TurtleResult<()> {
        self.state.set_dash(dash)
    }

    fn is_visible(&self) -> bool {
        self.state.visible
    }

    fn set_visible(&mut self, visible: bool) -> TurtleResult<()> {
        self.state.set_visible(visible, self.heading)
    }

    /// Reposition without drawing, whatever the draw mode.
    fn move_to(&mut self, x: f64, y: f64) -> TurtleResult<()> {
        self.state.jump_to(Point::new(x, y), self.heading)
    }

    fn clear(&mut self) -> TurtleResult<bool> {
        self.state.clear()
    }

    fn reset(&mut self) -> TurtleResult<()> {
        self.state.ensure_live()?;
        let origin = self.origin.clone();
        self.heading = normalize_heading(origin.heading);
        self.mode = DrawMode::Draw;
        self.state
            .restore(origin.position, origin.color, origin.color, origin.speed, self.heading)
    }

    fn flush(&mut self) -> TurtleResult<()> {
        self.state.flush(self.heading)
    }

    fn mark(&self) -> bool {
        self.state.mark
    }

    fn set_mark(&mut self, mark: bool) {
        self.state.mark = mark;
    }
}

//! Heading-free pen with solid fills.

use super::{DrawState, Implement, check_finite};
use crate::animation::DEFAULT_SPEED;
use crate::error::TurtleResult;
use crate::surface::{ImplementId, Oval, Polygon, Primitive, Rectangle};
use crate::window::{ImplementKind, Window, WindowState};
use kurbo::{Point, Rect};
use peniko::Color;

/// Pens have no heading; cursors are drawn unrotated.
const NO_HEADING: f64 = 0.0;

/// Construction options for a [`Pen`]. Also what [`Pen::reset`] returns to.
#[derive(Debug, Clone)]
pub struct PenOptions {
    pub position: Point,
    /// Color of lines and outlines.
    pub edge_color: Color,
    /// Color of solid interiors.
    pub fill_color: Color,
    pub speed: u32,
}

impl Default for PenOptions {
    fn default() -> Self {
        Self {
            position: Point::ZERO,
            edge_color: Color::from_rgba8(0, 0, 0, 255),
            fill_color: Color::from_rgba8(255, 0, 0, 255),
            speed: DEFAULT_SPEED,
        }
    }
}

/// A graphics pen.
///
/// While [`Pen::is_solid`] is true the pen records every point it draws a
/// line to. Turning solid off, moving, or changing color commits those points
/// as one filled polygon, closed back to the first vertex.
#[derive(Debug)]
pub struct Pen {
    state: DrawState,
    solid: bool,
    /// Vertices of the open fill, in world coordinates.
    fill_path: Vec<Point>,
    /// Window clear epoch the fill path was started in.
    fill_epoch: u64,
    origin: PenOptions,
}

impl Pen {
    /// Attach a black pen with red fill at the origin.
    pub fn new(window: &Window) -> TurtleResult<Self> {
        Self::with_options(window, PenOptions::default())
    }

    /// Attach a pen with the given starting state.
    pub fn with_options(window: &Window, options: PenOptions) -> TurtleResult<Self> {
        let state = DrawState::attach(
            window,
            ImplementKind::Pen,
            options.position,
            options.edge_color,
            options.fill_color,
            options.speed,
        )?;
        let pen = Self {
            state,
            solid: false,
            fill_path: Vec::new(),
            fill_epoch: 0,
            origin: options,
        };
        pen.state.refresh_cursor(NO_HEADING)?;
        Ok(pen)
    }

    pub fn x(&self) -> f64 {
        self.state.position.x
    }

    pub fn y(&self) -> f64 {
        self.state.position.y
    }

    pub fn edge_color(&self) -> Color {
        self.state.edge
    }

    pub fn fill_color(&self) -> Color {
        self.state.fill
    }

    /// Set the line color. An open fill is committed first.
    pub fn set_edge_color(&mut self, color: Color) -> TurtleResult<()> {
        let fill = self.state.fill;
        self.recolor(color, fill)
    }

    /// Set the fill color. An open fill is committed with the old color first.
    pub fn set_fill_color(&mut self, color: Color) -> TurtleResult<()> {
        let edge = self.state.edge;
        self.recolor(edge, color)
    }

    fn recolor(&mut self, edge: Color, fill: Color) -> TurtleResult<()> {
        if self.solid {
            self.end_fill()?;
            self.state.set_colors(edge, fill, NO_HEADING)?;
            self.begin_fill()
        } else {
            self.state.set_colors(edge, fill, NO_HEADING)
        }
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Start or finish a solid fill.
    ///
    /// Turning solid on starts a fill path at the current position. Turning
    /// it off commits the path as a filled polygon in the current fill color.
    /// Setting the current value again does nothing.
    pub fn set_solid(&mut self, solid: bool) -> TurtleResult<()> {
        self.state.ensure_live()?;
        match (self.solid, solid) {
            (false, true) => self.begin_fill(),
            (true, false) => self.end_fill(),
            _ => Ok(()),
        }
    }

    /// Vertices of the open fill. Empty when not solid, and after a window
    /// clear erased the fill.
    pub fn fill_path(&self) -> Vec<Point> {
        let epoch = self.state.window().with_live(|state| state.clear_epoch());
        match epoch {
            Ok(epoch) if self.solid && epoch == self.fill_epoch => self.fill_path.clone(),
            _ => Vec::new(),
        }
    }

    /// Draw a line by `(dx, dy)` from the current position.
    pub fn draw_line(&mut self, dx: f64, dy: f64) -> TurtleResult<()> {
        check_finite("offset", &[dx, dy])?;
        let target = Point::new(self.state.position.x + dx, self.state.position.y + dy);
        self.draw_to(target.x, target.y)
    }

    /// Draw a line from the current position to `(x, y)`.
    pub fn draw_to(&mut self, x: f64, y: f64) -> TurtleResult<()> {
        check_finite("position", &[x, y])?;
        self.sync_fill_path()?;
        let target = Point::new(x, y);
        if self.solid {
            self.fill_path.push(target);
        }
        self.state.trace_segment(target, NO_HEADING)
    }

    /// Draw an ellipse with the given radii centered on the pen.
    ///
    /// Filled with the fill color while solid, but never part of the fill
    /// path. The pen does not move.
    pub fn draw_oval(&mut self, x_radius: f64, y_radius: f64) -> TurtleResult<()> {
        check_finite("radius", &[x_radius, y_radius])?;
        let center = self.state.position;
        let bounds = Rect::new(
            center.x - x_radius,
            center.y - y_radius,
            center.x + x_radius,
            center.y + y_radius,
        );
        self.draw_shape(bounds, |owner, bounds, style, fill| {
            Primitive::Oval(Oval { owner, bounds, style, fill })
        })
    }

    /// Draw a rectangle whose bottom-left corner is the pen position.
    ///
    /// Filled with the fill color while solid, but never part of the fill
    /// path. The pen does not move.
    pub fn draw_rectangle(&mut self, width: f64, height: f64) -> TurtleResult<()> {
        check_finite("size", &[width, height])?;
        let corner = self.state.position;
        let bounds = Rect::new(corner.x, corner.y, corner.x + width, corner.y + height);
        self.draw_shape(bounds, |owner, bounds, style, fill| {
            Primitive::Rectangle(Rectangle { owner, bounds, style, fill })
        })
    }

    fn draw_shape(
        &mut self,
        world_bounds: Rect,
        build: impl FnOnce(ImplementId, Rect, crate::surface::LineStyle, Option<Color>) -> Primitive,
    ) -> TurtleResult<()> {
        let style = self.state.line_style();
        let fill = self.solid.then_some(self.state.fill);
        let owner = self.state.id();
        let at = self.state.position;
        let state = &self.state;
        state.window().with_live(|window| {
            let bounds = window.transform().rect_to_canvas(world_bounds);
            window.draw(&build(owner, bounds, style, fill));
            state.show_cursor(window, at, NO_HEADING, false);
            if state.animated() {
                window.repaint();
            }
        })?;
        self.state.mark = true;
        Ok(())
    }

    /// Start a fill path at the current position.
    fn begin_fill(&mut self) -> TurtleResult<()> {
        let epoch = self.state.window().with_live(|state| state.clear_epoch())?;
        self.solid = true;
        self.fill_path = vec![self.state.position];
        self.fill_epoch = epoch;
        self.state.mark = true;
        Ok(())
    }

    /// Commit the fill path and leave solid mode.
    fn end_fill(&mut self) -> TurtleResult<()> {
        let path = std::mem::take(&mut self.fill_path);
        self.solid = false;
        let epoch = self.fill_epoch;
        let state = &self.state;
        state
            .window()
            .with_live(|window| commit_fill(state, window, path, epoch))?;
        self.state.mark = true;
        Ok(())
    }

    /// Restart the fill path if a window clear erased it.
    fn sync_fill_path(&mut self) -> TurtleResult<()> {
        let epoch = self.state.window().with_live(|state| state.clear_epoch())?;
        if self.solid && epoch != self.fill_epoch {
            log::debug!(
                "Pen {} fill path erased by a canvas clear; restarting at {:?}",
                self.state.id(),
                self.state.position
            );
            self.fill_path = vec![self.state.position];
            self.fill_epoch = epoch;
        }
        Ok(())
    }
}

/// Draw `path` as a closed, filled polygon, then stroke its edges over the
/// interior in the current line style. The closing edge is fill only.
fn commit_fill(state: &DrawState, window: &mut WindowState, path: Vec<Point>, epoch: u64) {
    if epoch != window.clear_epoch() {
        log::debug!("Pen {} fill discarded; canvas was cleared", state.id());
        return;
    }
    match path.len() {
        0 | 1 => {
            log::debug!("Pen {} fill never left its start; nothing committed", state.id());
            return;
        }
        2 => {
            log::warn!("Pen {} fill is a single line with no area; nothing committed", state.id());
            return;
        }
        _ => {}
    }
    let transform = *window.transform();
    let mut vertices: Vec<Point> = path.iter().map(|p| transform.to_canvas(*p)).collect();
    vertices.push(vertices[0]);
    log::debug!("Pen {} committed fill with {} vertices", state.id(), path.len());
    window.note_tool(state.speed, state.visible);
    window.draw(&Primitive::Polygon(Polygon {
        owner: state.id(),
        vertices,
        fill: state.fill,
    }));

    let style = state.line_style();
    let mut travelled = 0.0;
    for edge in path.windows(2) {
        window.draw_segment(state.id(), edge[0], edge[1], &style, travelled);
        travelled += edge[0].distance(edge[1]);
    }
    if state.animated() {
        window.repaint();
    }
}

impl Implement for Pen {
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
        self.state.set_speed(speed, NO_HEADING)
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
        self.state.set_visible(visible, NO_HEADING)
    }

    /// Reposition without drawing.
    ///
    /// An open fill is committed first. The pen stays solid and a new fill
    /// path starts at the new position.
    fn move_to(&mut self, x: f64, y: f64) -> TurtleResult<()> {
        check_finite("position", &[x, y])?;
        if self.solid {
            self.end_fill()?;
            self.state.jump_to(Point::new(x, y), NO_HEADING)?;
            self.begin_fill()
        } else {
            self.state.jump_to(Point::new(x, y), NO_HEADING)
        }
    }

    /// Erase this pen's marks and its open fill.
    fn clear(&mut self) -> TurtleResult<bool> {
        let layered = self.state.clear()?;
        if self.solid {
            self.begin_fill()?;
        }
        Ok(layered)
    }

    /// Discard any open fill and return to the construction-time state.
    fn reset(&mut self) -> TurtleResult<()> {
        self.state.ensure_live()?;
        self.solid = false;
        self.fill_path.clear();
        let origin = self.origin.clone();
        self.state.restore(
            origin.position,
            origin.edge_color,
            origin.fill_color,
            origin.speed,
            NO_HEADING,
        )
    }

    fn flush(&mut self) -> TurtleResult<()> {
        self.state.flush(NO_HEADING)
    }

    fn mark(&self) -> bool {
        self.state.mark
    }

    fn set_mark(&mut self, mark: bool) {
        self.state.mark = mark;
    }
}

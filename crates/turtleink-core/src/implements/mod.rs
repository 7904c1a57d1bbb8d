//! Drawing implements: turtles and pens.

mod pen;
mod turtle;

pub use pen::{Pen, PenOptions};
pub use turtle::{DrawMode, Turtle, TurtleOptions};

use crate::animation::SegmentSteps;
use crate::error::{TurtleResult, geometry};
use crate::surface::{Cursor, CursorKind, ImplementId, LineStyle};
use crate::window::{ImplementKind, Window, WindowShared, WindowState};
use kurbo::Point;
use peniko::Color;
use std::sync::Arc;

/// Default stroke width in pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 1.0;

/// Operations every implement supports.
pub trait Implement {
    /// Identifier the window knows this implement by.
    fn id(&self) -> ImplementId;

    /// Turtle or pen.
    fn kind(&self) -> ImplementKind;

    /// Current position in world coordinates.
    fn position(&self) -> Point;

    /// Animation speed; 0 draws instantly without repainting.
    fn speed(&self) -> u32;

    /// Set the animation speed. Leaving speed 0 flushes the window.
    fn set_speed(&mut self, speed: u32) -> TurtleResult<()>;

    fn stroke_width(&self) -> f64;

    /// Set the stroke width for later drawing calls.
    fn set_stroke_width(&mut self, width: f64) -> TurtleResult<()>;

    /// Dash pattern; empty means solid.
    fn dash(&self) -> &[f64];

    /// Set the dash pattern for later drawing calls.
    fn set_dash(&mut self, dash: &[f64]) -> TurtleResult<()>;

    fn is_visible(&self) -> bool;

    /// Show or hide the cursor. Drawing still works while hidden.
    fn set_visible(&mut self, visible: bool) -> TurtleResult<()>;

    /// Pick up the implement and place it at `(x, y)` without drawing.
    fn move_to(&mut self, x: f64, y: f64) -> TurtleResult<()>;

    /// Erase this implement's marks.
    ///
    /// On a surface without per-implement layers this erases the whole canvas
    /// (logged as a warning) and returns `Ok(false)`.
    fn clear(&mut self) -> TurtleResult<bool>;

    /// Return to the construction-time position and attributes. Marks
    /// already drawn stay on the canvas.
    fn reset(&mut self) -> TurtleResult<()>;

    /// Flush the owning window, showing this implement's cursor.
    fn flush(&mut self) -> TurtleResult<()>;

    /// Whether this implement drew, moved or changed an attribute since the
    /// mark was last cleared.
    fn mark(&self) -> bool;

    fn set_mark(&mut self, mark: bool);
}

pub(crate) fn check_finite(what: &str, values: &[f64]) -> TurtleResult<()> {
    if values.iter().all(|value| value.is_finite()) {
        Ok(())
    } else {
        Err(geometry(format!("{} must be finite, got {:?}", what, values)))
    }
}

fn check_dash(dash: &[f64]) -> TurtleResult<()> {
    if dash.iter().all(|length| length.is_finite() && *length > 0.0) {
        Ok(())
    } else {
        Err(geometry(format!("dash lengths must be positive, got {:?}", dash)))
    }
}

/// State and behavior shared by turtles and pens.
///
/// Each implement owns its `DrawState` exclusively; the only thing shared
/// with other implements is the window handle.
#[derive(Debug)]
pub(crate) struct DrawState {
    id: ImplementId,
    kind: ImplementKind,
    window: Arc<WindowShared>,
    pub(crate) position: Point,
    pub(crate) edge: Color,
    pub(crate) fill: Color,
    pub(crate) width: f64,
    pub(crate) dash: Vec<f64>,
    pub(crate) visible: bool,
    pub(crate) speed: u32,
    pub(crate) mark: bool,
}

impl DrawState {
    pub(crate) fn attach(
        window: &Window,
        kind: ImplementKind,
        position: Point,
        edge: Color,
        fill: Color,
        speed: u32,
    ) -> TurtleResult<Self> {
        check_finite("position", &[position.x, position.y])?;
        let shared = Arc::clone(window.shared());
        let id = shared.register(kind)?;
        Ok(Self {
            id,
            kind,
            window: shared,
            position,
            edge,
            fill,
            width: DEFAULT_STROKE_WIDTH,
            dash: Vec::new(),
            visible: true,
            speed,
            mark: false,
        })
    }

    pub(crate) fn id(&self) -> ImplementId {
        self.id
    }

    pub(crate) fn kind(&self) -> ImplementKind {
        self.kind
    }

    pub(crate) fn window(&self) -> &WindowShared {
        &self.window
    }

    pub(crate) fn animated(&self) -> bool {
        self.speed > 0
    }

    /// Stroke attributes as they are right now.
    pub(crate) fn line_style(&self) -> LineStyle {
        LineStyle {
            color: self.edge,
            width: self.width,
            dash: self.dash.clone(),
        }
    }

    /// Fail with `Disposed` if the window is gone.
    pub(crate) fn ensure_live(&self) -> TurtleResult<()> {
        self.window.with_live(|_| ())
    }

    fn cursor_kind(&self) -> CursorKind {
        match self.kind {
            ImplementKind::Turtle => CursorKind::Turtle,
            ImplementKind::Pen => CursorKind::Stylus,
        }
    }

    /// Push the cursor for `at` to the surface. Suppressed at speed 0 unless
    /// `force` is set.
    pub(crate) fn show_cursor(&self, state: &mut WindowState, at: Point, heading: f64, force: bool) {
        state.note_tool(self.speed, self.visible);
        if !self.animated() && !force {
            return;
        }
        let cursor = self.visible.then(|| Cursor {
            kind: self.cursor_kind(),
            position: state.transform().to_canvas(at),
            heading,
            edge: self.edge,
            fill: self.fill,
        });
        state.update_cursor(self.id, cursor.as_ref());
    }

    /// Refresh the cursor in place, e.g. after a turn or color change.
    /// Animated implements repaint so the change shows right away.
    pub(crate) fn refresh_cursor(&self, heading: f64) -> TurtleResult<()> {
        let at = self.position;
        self.window.with_live(|state| {
            self.show_cursor(state, at, heading, false);
            if self.animated() {
                state.repaint();
            }
        })
    }

    /// Draw a line from the current position to `end`, animating at the
    /// current speed, and leave the implement at `end`.
    ///
    /// Color, width and dash are captured once, before the first step. At
    /// speed 0 the whole segment is one primitive with no repaint. Otherwise
    /// every step is drawn and repainted under the window lock, then the lock
    /// is released while the window ticks. If the window is disposed between
    /// steps the remaining steps are skipped and `Disposed` is returned once.
    pub(crate) fn trace_segment(&mut self, end: Point, heading: f64) -> TurtleResult<()> {
        let style = self.line_style();
        let id = self.id;

        if !self.animated() {
            let start = self.position;
            let speed = self.speed;
            let visible = self.visible;
            self.window.with_live(|state| {
                state.note_tool(speed, visible);
                state.draw_segment(id, start, end, &style, 0.0);
            })?;
            self.position = end;
            self.mark = true;
            return Ok(());
        }

        for step in SegmentSteps::new(self.position, end, self.speed) {
            self.window.with_live(|state| {
                state.draw_segment(id, step.from, step.to, &style, step.travelled);
                self.show_cursor(state, step.to, heading, false);
                state.repaint();
            })?;
            self.position = step.to;
            self.mark = true;
            self.window.tick();
        }
        Ok(())
    }

    /// Reposition without drawing. Never animated, but an animated
    /// implement repaints once so its cursor shows at the new spot.
    pub(crate) fn jump_to(&mut self, target: Point, heading: f64) -> TurtleResult<()> {
        check_finite("position", &[target.x, target.y])?;
        self.window.with_live(|state| {
            self.show_cursor(state, target, heading, false);
            if self.animated() {
                state.repaint();
            }
        })?;
        self.position = target;
        self.mark = true;
        Ok(())
    }

    pub(crate) fn set_speed(&mut self, speed: u32, heading: f64) -> TurtleResult<()> {
        self.ensure_live()?;
        let resumed = self.speed == 0 && speed > 0;
        self.speed = speed;
        self.mark = true;
        let at = self.position;
        self.window.with_live(|state| {
            if resumed {
                self.show_cursor(state, at, heading, false);
                state.flush();
            }
        })
    }

    pub(crate) fn set_width(&mut self, width: f64) -> TurtleResult<()> {
        if !width.is_finite() || width < 0.0 {
            return Err(geometry(format!("stroke width must be >= 0, got {}", width)));
        }
        self.ensure_live()?;
        self.width = width;
        self.mark = true;
        Ok(())
    }

    pub(crate) fn set_dash(&mut self, dash: &[f64]) -> TurtleResult<()> {
        check_dash(dash)?;
        self.ensure_live()?;
        self.dash = dash.to_vec();
        self.mark = true;
        Ok(())
    }

    pub(crate) fn set_visible(&mut self, visible: bool, heading: f64) -> TurtleResult<()> {
        self.ensure_live()?;
        self.visible = visible;
        self.mark = true;
        self.refresh_cursor(heading)
    }

    pub(crate) fn set_colors(&mut self, edge: Color, fill: Color, heading: f64) -> TurtleResult<()> {
        self.ensure_live()?;
        self.edge = edge;
        self.fill = fill;
        self.mark = true;
        self.refresh_cursor(heading)
    }

    /// Erase this implement's marks; see [`Implement::clear`].
    pub(crate) fn clear(&mut self) -> TurtleResult<bool> {
        let id = self.id;
        let layered = self.window.with_live(|state| state.clear_layer(id))?;
        self.mark = true;
        Ok(layered)
    }

    /// Restore construction-time attributes and position.
    pub(crate) fn restore(
        &mut self,
        position: Point,
        edge: Color,
        fill: Color,
        speed: u32,
        heading: f64,
    ) -> TurtleResult<()> {
        self.ensure_live()?;
        self.edge = edge;
        self.fill = fill;
        self.speed = speed;
        self.width = DEFAULT_STROKE_WIDTH;
        self.dash.clear();
        self.visible = true;
        self.jump_to(position, heading)
    }

    pub(crate) fn flush(&mut self, heading: f64) -> TurtleResult<()> {
        let at = self.position;
        self.window.with_live(|state| {
            self.show_cursor(state, at, heading, true);
            state.flush();
        })?;
        self.mark = true;
        Ok(())
    }
}

impl Drop for DrawState {
    fn drop(&mut self) {
        self.window.unregister(self.id);
    }
}

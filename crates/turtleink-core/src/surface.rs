//! Canvas surface contract and the primitives the engine emits.
//!
//! The engine never touches pixels. Every drawing command resolves into
//! one of the primitives below, already converted to device coordinates,
//! and is handed to a [`Surface`] implementation that does the painting.

use crate::window::WindowGeometry;
use kurbo::{Point, Rect, Size};
use peniko::Color;
use uuid::Uuid;

/// Identifier of a turtle or pen attached to a window.
pub type ImplementId = Uuid;

/// Stroke attributes captured when a drawing call starts.
#[derive(Debug, Clone)]
pub struct LineStyle {
    /// Stroke color.
    pub color: Color,
    /// Stroke width in pixels.
    pub width: f64,
    /// Alternating on/off lengths; empty means a solid line.
    pub dash: Vec<f64>,
}

impl LineStyle {
    /// Whether the stroke is dashed.
    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

/// A straight line segment.
#[derive(Debug, Clone)]
pub struct Segment {
    pub owner: ImplementId,
    pub start: Point,
    pub end: Point,
    pub style: LineStyle,
    /// Distance into the dash pattern at `start`, so consecutive animation
    /// steps continue the pattern instead of restarting it.
    pub dash_offset: f64,
}

/// An axis-aligned ellipse inscribed in `bounds`.
#[derive(Debug, Clone)]
pub struct Oval {
    pub owner: ImplementId,
    pub bounds: Rect,
    pub style: LineStyle,
    pub fill: Option<Color>,
}

/// An axis-aligned rectangle.
#[derive(Debug, Clone)]
pub struct Rectangle {
    pub owner: ImplementId,
    pub bounds: Rect,
    pub style: LineStyle,
    pub fill: Option<Color>,
}

/// A filled polygon. The vertex list repeats the first vertex at the end.
#[derive(Debug, Clone)]
pub struct Polygon {
    pub owner: ImplementId,
    pub vertices: Vec<Point>,
    pub fill: Color,
}

/// Any primitive a surface can be asked to draw.
#[derive(Debug, Clone)]
pub enum Primitive {
    Segment(Segment),
    Oval(Oval),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl Primitive {
    /// The implement that issued this primitive.
    pub fn owner(&self) -> ImplementId {
        match self {
            Primitive::Segment(segment) => segment.owner,
            Primitive::Oval(oval) => oval.owner,
            Primitive::Rectangle(rectangle) => rectangle.owner,
            Primitive::Polygon(polygon) => polygon.owner,
        }
    }

    pub fn as_segment(&self) -> Option<&Segment> {
        match self {
            Primitive::Segment(segment) => Some(segment),
            _ => None,
        }
    }

    pub fn as_polygon(&self) -> Option<&Polygon> {
        match self {
            Primitive::Polygon(polygon) => Some(polygon),
            _ => None,
        }
    }
}

/// Cursor glyph shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorKind {
    /// Oriented turtle glyph.
    Turtle,
    /// Unoriented stylus pointing at the pen position.
    Stylus,
}

/// Where and how an implement's cursor should be shown.
#[derive(Debug, Clone)]
pub struct Cursor {
    pub kind: CursorKind,
    /// Device-space position.
    pub position: Point,
    /// Degrees counter-clockwise from east (always 0 for a stylus).
    pub heading: f64,
    pub edge: Color,
    pub fill: Color,
}

/// The drawable a window paints on.
///
/// Calls arrive one at a time through the window lock, so an implementation
/// never sees two primitives interleave. Only the drawing methods, `clear`
/// and `repaint` are required; the host-window hooks default to no-ops for
/// surfaces that have no real window behind them.
pub trait Surface: Send {
    /// Stroke a line segment.
    fn draw_segment(&mut self, segment: &Segment);

    /// Stroke (and optionally fill) an ellipse.
    fn draw_oval(&mut self, oval: &Oval);

    /// Stroke (and optionally fill) a rectangle.
    fn draw_rectangle(&mut self, rectangle: &Rectangle);

    /// Fill a closed polygon.
    fn draw_polygon(&mut self, polygon: &Polygon);

    /// Erase everything on the canvas.
    fn clear(&mut self);

    /// Request that the current contents be shown.
    fn repaint(&mut self);

    /// Make every pending primitive visible now.
    fn flush(&mut self) {
        self.repaint();
    }

    /// Erase only the marks drawn by `owner`.
    ///
    /// Returns `false` when the surface keeps no per-implement layers, in
    /// which case the caller falls back to a full [`Surface::clear`].
    fn clear_layer(&mut self, _owner: ImplementId) -> bool {
        false
    }

    /// Show, move, or hide (`None`) an implement's cursor.
    fn update_cursor(&mut self, _owner: ImplementId, _cursor: Option<&Cursor>) {}

    /// The canvas changed size. Painted marks keep their device pixels.
    fn resize(&mut self, _size: Size) {}

    /// Window position, title or bounds changed.
    fn apply_geometry(&mut self, _geometry: &WindowGeometry) {}

    /// Minimize or restore the host window.
    fn set_iconified(&mut self, _iconified: bool) {}

    /// Emit an audible alert.
    fn beep(&mut self) {}

    /// The window was disposed; release any host resources.
    fn release(&mut self) {}

    /// Dispatch a primitive to the matching drawing method.
    fn draw(&mut self, primitive: &Primitive) {
        match primitive {
            Primitive::Segment(segment) => self.draw_segment(segment),
            Primitive::Oval(oval) => self.draw_oval(oval),
            Primitive::Rectangle(rectangle) => self.draw_rectangle(rectangle),
            Primitive::Polygon(polygon) => self.draw_polygon(polygon),
        }
    }
}

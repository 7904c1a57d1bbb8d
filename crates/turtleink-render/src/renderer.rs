//! Turning engine primitives into kurbo geometry.

use kurbo::{Affine, BezPath, Ellipse, Line, Point, Rect, Stroke};
use thiserror::Error;
use turtleink_core::{Cursor, CursorKind, LineStyle, Oval, Polygon, Primitive, Rectangle, Segment};

/// Renderer errors.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("Surface state lock poisoned")]
    Poisoned,
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Length of the turtle glyph from tail to tip, in pixels.
pub const CURSOR_SIZE: f64 = 16.0;

fn check_point(what: &str, point: Point) -> RenderResult<()> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(RenderError::InvalidGeometry(format!("{} is not finite: {:?}", what, point)))
    }
}

fn check_rect(rect: Rect) -> RenderResult<()> {
    check_point("corner", Point::new(rect.x0, rect.y0))?;
    check_point("corner", Point::new(rect.x1, rect.y1))
}

/// Reject primitives a surface cannot paint.
pub fn validate(primitive: &Primitive) -> RenderResult<()> {
    match primitive {
        Primitive::Segment(segment) => {
            check_point("segment start", segment.start)?;
            check_point("segment end", segment.end)
        }
        Primitive::Oval(Oval { bounds, .. }) | Primitive::Rectangle(Rectangle { bounds, .. }) => {
            check_rect(*bounds)
        }
        Primitive::Polygon(polygon) => {
            if polygon.vertices.len() < 4 {
                return Err(RenderError::InvalidGeometry(format!(
                    "polygon needs at least 3 distinct vertices, got {}",
                    polygon.vertices.len().saturating_sub(1)
                )));
            }
            polygon
                .vertices
                .iter()
                .try_for_each(|vertex| check_point("polygon vertex", *vertex))
        }
    }
}

/// Stroke for a line style, starting `dash_offset` pixels into the pattern.
pub fn stroke_for(style: &LineStyle, dash_offset: f64) -> Stroke {
    let stroke = Stroke::new(style.width);
    if style.is_dashed() {
        stroke.with_dashes(dash_offset, style.dash.iter().copied())
    } else {
        stroke
    }
}

pub fn segment_line(segment: &Segment) -> Line {
    Line::new(segment.start, segment.end)
}

pub fn oval_ellipse(oval: &Oval) -> Ellipse {
    Ellipse::from_rect(oval.bounds)
}

/// Closed path through the polygon's vertices.
pub fn polygon_path(polygon: &Polygon) -> BezPath {
    let mut path = BezPath::new();
    let mut vertices = polygon.vertices.iter();
    if let Some(first) = vertices.next() {
        path.move_to(*first);
        for vertex in vertices {
            path.line_to(*vertex);
        }
        path.close_path();
    }
    path
}

/// Cursor glyph in device space.
///
/// A turtle is an arrowhead whose tip points along the heading. A stylus is
/// a small unrotated nib whose tip touches the pen position.
pub fn cursor_path(cursor: &Cursor) -> BezPath {
    let s = CURSOR_SIZE;
    let mut path = BezPath::new();
    let placement = match cursor.kind {
        CursorKind::Turtle => {
            path.move_to((s * 0.625, 0.0));
            path.line_to((-s * 0.375, s * 0.375));
            path.line_to((-s * 0.125, 0.0));
            path.line_to((-s * 0.375, -s * 0.375));
            path.close_path();
            // Device y points down, so a counter-clockwise heading rotates
            // the other way on screen.
            Affine::translate(cursor.position.to_vec2())
                * Affine::rotate(-cursor.heading.to_radians())
        }
        CursorKind::Stylus => {
            path.move_to((0.0, 0.0));
            path.line_to((s * 0.25, -s * 0.75));
            path.line_to((s * 0.5, -s * 0.5));
            path.close_path();
            Affine::translate(cursor.position.to_vec2())
        }
    };
    placement * path
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;
    use peniko::Color;
    use uuid::Uuid;

    fn style(dash: Vec<f64>) -> LineStyle {
        LineStyle {
            color: Color::from_rgba8(0, 0, 0, 255),
            width: 2.0,
            dash,
        }
    }

    #[test]
    fn test_solid_stroke_has_no_dashes() {
        let stroke = stroke_for(&style(Vec::new()), 5.0);
        assert_eq!(stroke.width, 2.0);
        assert!(stroke.dash_pattern.is_empty());
    }

    #[test]
    fn test_dashed_stroke_keeps_offset() {
        let stroke = stroke_for(&style(vec![4.0, 2.0]), 6.0);
        assert_eq!(&stroke.dash_pattern[..], &[4.0, 2.0]);
        assert_eq!(stroke.dash_offset, 6.0);
    }

    #[test]
    fn test_polygon_path_is_closed() {
        let polygon = Polygon {
            owner: Uuid::new_v4(),
            vertices: vec![
                Point::new(200.0, 200.0),
                Point::new(210.0, 200.0),
                Point::new(210.0, 190.0),
                Point::new(200.0, 200.0),
            ],
            fill: Color::from_rgba8(255, 0, 0, 255),
        };
        let path = polygon_path(&polygon);
        assert!(matches!(path.elements().last(), Some(kurbo::PathEl::ClosePath)));
        assert_eq!(path.bounding_box(), Rect::new(200.0, 190.0, 210.0, 200.0));
        assert_eq!(validate(&Primitive::Polygon(polygon)), Ok(()));
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let polygon = Polygon {
            owner: Uuid::new_v4(),
            vertices: vec![Point::ZERO, Point::new(1.0, 0.0), Point::ZERO],
            fill: Color::from_rgba8(255, 0, 0, 255),
        };
        assert!(matches!(
            validate(&Primitive::Polygon(polygon)),
            Err(RenderError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_non_finite_segment_rejected() {
        let segment = Segment {
            owner: Uuid::new_v4(),
            start: Point::ZERO,
            end: Point::new(f64::NAN, 1.0),
            style: style(Vec::new()),
            dash_offset: 0.0,
        };
        assert!(validate(&Primitive::Segment(segment)).is_err());
    }

    #[test]
    fn test_oval_fills_its_bounds() {
        let oval = Oval {
            owner: Uuid::new_v4(),
            bounds: Rect::new(10.0, 20.0, 50.0, 40.0),
            style: style(Vec::new()),
            fill: None,
        };
        let ellipse = oval_ellipse(&oval);
        let radii = ellipse.radii();
        assert!(ellipse.center().distance(Point::new(30.0, 30.0)) < 1e-9);
        assert!((radii.x - 20.0).abs() < 1e-9);
        assert!((radii.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_turtle_cursor_points_along_heading() {
        let cursor = Cursor {
            kind: CursorKind::Turtle,
            position: Point::new(100.0, 100.0),
            heading: 90.0,
            edge: Color::from_rgba8(0, 0, 0, 255),
            fill: Color::from_rgba8(255, 0, 0, 255),
        };
        let bounds = cursor_path(&cursor).bounding_box();
        assert!((bounds.y0 - (100.0 - CURSOR_SIZE * 0.625)).abs() < 1e-9);
        assert!((bounds.center().x - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_stylus_tip_touches_position() {
        let cursor = Cursor {
            kind: CursorKind::Stylus,
            position: Point::new(50.0, 60.0),
            heading: 0.0,
            edge: Color::from_rgba8(0, 0, 0, 255),
            fill: Color::from_rgba8(255, 0, 0, 255),
        };
        let bounds = cursor_path(&cursor).bounding_box();
        assert_eq!(bounds.x0, 50.0);
        assert_eq!(bounds.y1, 60.0);
    }
}

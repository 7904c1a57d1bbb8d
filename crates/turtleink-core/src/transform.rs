//! Coordinate transform between world space and canvas space.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Maps world coordinates to canvas device coordinates.
///
/// World space has its origin at the center of the canvas with y growing
/// upward. Device space has its origin at the top-left corner with y growing
/// downward. Nothing is clamped: points outside the canvas map to device
/// coordinates outside the visible area.
///
/// Device coordinates are only valid for the canvas size they were computed
/// with. After [`CanvasTransform::on_resize`] callers must convert again.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    /// Canvas size in device pixels.
    size: Size,
}

impl CanvasTransform {
    /// Create a transform for a canvas of the given size.
    pub fn new(size: Size) -> Self {
        Self { size }
    }

    /// Current canvas size.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Device-space point the world origin maps to.
    pub fn center(&self) -> Point {
        Point::new(self.size.width / 2.0, self.size.height / 2.0)
    }

    /// Get the affine transform from world to device coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.center().to_vec2()) * Affine::scale_non_uniform(1.0, -1.0)
    }

    /// Get the inverse transform, from device to world coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale_non_uniform(1.0, -1.0) * Affine::translate(-self.center().to_vec2())
    }

    /// Convert a world point to device coordinates.
    pub fn to_canvas(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a device point to world coordinates.
    pub fn to_world(&self, device_point: Point) -> Point {
        self.inverse_transform() * device_point
    }

    /// Convert a world-space rectangle to a normalized device rectangle.
    pub fn rect_to_canvas(&self, world_rect: Rect) -> Rect {
        Rect::from_points(
            self.to_canvas(Point::new(world_rect.x0, world_rect.y0)),
            self.to_canvas(Point::new(world_rect.x1, world_rect.y1)),
        )
    }

    /// Recompute the mapping for a new canvas size.
    ///
    /// Returns how far the world origin moved in device space, which is the
    /// offset already-painted marks would need to stay aligned.
    pub fn on_resize(&mut self, size: Size) -> Vec2 {
        let before = self.center();
        self.size = size;
        self.center() - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_center() {
        let transform = CanvasTransform::new(Size::new(400.0, 300.0));
        let device = transform.to_canvas(Point::ZERO);
        assert!((device.x - 200.0).abs() < f64::EPSILON);
        assert!((device.y - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_y_axis_is_flipped() {
        let transform = CanvasTransform::new(Size::new(400.0, 400.0));
        let device = transform.to_canvas(Point::new(10.0, 50.0));
        assert!((device.x - 210.0).abs() < f64::EPSILON);
        assert!((device.y - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let transform = CanvasTransform::new(Size::new(640.0, 480.0));
        let original = Point::new(-123.5, 456.25);
        let back = transform.to_world(transform.to_canvas(original));
        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_no_clamping_outside_canvas() {
        let transform = CanvasTransform::new(Size::new(100.0, 100.0));
        let device = transform.to_canvas(Point::new(500.0, -500.0));
        assert!((device.x - 550.0).abs() < f64::EPSILON);
        assert!((device.y - 550.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_resize_shifts_center() {
        let mut transform = CanvasTransform::new(Size::new(400.0, 400.0));
        let shift = transform.on_resize(Size::new(600.0, 300.0));
        assert!((shift.x - 100.0).abs() < f64::EPSILON);
        assert!((shift.y + 50.0).abs() < f64::EPSILON);

        let device = transform.to_canvas(Point::ZERO);
        assert!((device.x - 300.0).abs() < f64::EPSILON);
        assert!((device.y - 150.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rect_to_canvas_is_normalized() {
        let transform = CanvasTransform::new(Size::new(200.0, 200.0));
        let rect = transform.rect_to_canvas(Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!((rect.x0 - 100.0).abs() < f64::EPSILON);
        assert!((rect.y0 - 90.0).abs() < f64::EPSILON);
        assert!((rect.x1 - 120.0).abs() < f64::EPSILON);
        assert!((rect.y1 - 100.0).abs() < f64::EPSILON);
    }
}

//! Geometry primitives in display or capture coordinates
//!
//! Screen convention: origin top-left, x grows right, y grows down.

use serde::{Deserialize, Serialize};

/// A point in 2D space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f32,
    pub y: f32,
}

impl Point2D {
    pub const ORIGIN: Point2D = Point2D { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }

    pub fn distance(&self, other: &Point2D) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn lerp(&self, other: &Point2D, t: f32) -> Point2D {
        Point2D {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Width and height of a surface (display viewport or capture frame)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f32,
    pub height: f32,
}

impl Size2D {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Both extents strictly positive and finite
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn min_side(&self) -> f32 {
        self.width.min(self.height)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of `size` centered on `center`
    pub fn centered(center: Point2D, width: f32, height: f32) -> Self {
        Self::new(center.x - width / 2.0, center.y - height / 2.0, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point2D {
        Point2D::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Strict containment: points on the border are outside
    pub fn contains_strict(&self, p: Point2D) -> bool {
        p.x > self.x && p.x < self.right() && p.y > self.y && p.y < self.bottom()
    }

    /// Inclusive containment, used for button hit testing
    pub fn contains(&self, p: Point2D) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// A local coordinate frame: origin plus heading.
///
/// Heading is in radians, measured clockwise from "up" on screen, so a
/// heading of zero points toward negative y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Frame2D {
    pub origin: Point2D,
    pub heading: f32,
}

impl Frame2D {
    pub fn new(origin: Point2D, heading: f32) -> Self {
        Self { origin, heading }
    }

    /// Unit vector along the heading
    pub fn direction(&self) -> (f32, f32) {
        (self.heading.sin(), -self.heading.cos())
    }

    /// Point `distance` along the heading
    pub fn forward(&self, distance: f32) -> Point2D {
        let (dx, dy) = self.direction();
        self.origin.offset(dx * distance, dy * distance)
    }

    /// Move the origin `distance` along the heading, keeping the heading
    pub fn advanced(&self, distance: f32) -> Frame2D {
        Frame2D::new(self.forward(distance), self.heading)
    }

    /// Rotate clockwise by `angle` radians about the origin
    pub fn rotated(&self, angle: f32) -> Frame2D {
        Frame2D::new(self.origin, self.heading + angle)
    }

    /// Map a point given in this frame's local coordinates (x right, y up the heading)
    pub fn to_world(&self, local: Point2D) -> Point2D {
        let (s, c) = self.heading.sin_cos();
        // local x axis is the heading rotated by +90 degrees
        let world_x = local.x * c + local.y * s;
        let world_y = local.x * s - local.y * c;
        self.origin.offset(world_x, world_y)
    }
}

/// Linear remap of `value` from [in_min, in_max] to [out_min, out_max]
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    if (in_max - in_min).abs() < f32::EPSILON {
        return out_min;
    }
    out_min + (value - in_min) * (out_max - out_min) / (in_max - in_min)
}

/// Linear interpolation between two scalars
#[inline]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains_strict_excludes_border() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains_strict(Point2D::new(20.0, 20.0)));
        assert!(!r.contains_strict(Point2D::new(10.0, 20.0)));
        assert!(!r.contains_strict(Point2D::new(20.0, 30.0)));
        assert!(r.contains(Point2D::new(10.0, 30.0)));
    }

    #[test]
    fn test_frame_forward_points_up_at_zero_heading() {
        let f = Frame2D::new(Point2D::new(100.0, 100.0), 0.0);
        let tip = f.forward(10.0);
        assert!((tip.x - 100.0).abs() < 1e-4);
        assert!((tip.y - 90.0).abs() < 1e-4);
    }

    #[test]
    fn test_frame_rotation_is_clockwise() {
        let f = Frame2D::new(Point2D::ORIGIN, 0.0).rotated(std::f32::consts::FRAC_PI_2);
        let tip = f.forward(1.0);
        assert!((tip.x - 1.0).abs() < 1e-4);
        assert!(tip.y.abs() < 1e-4);
    }

    #[test]
    fn test_to_world_matches_forward() {
        let f = Frame2D::new(Point2D::new(5.0, 5.0), 0.7);
        let a = f.forward(3.0);
        let b = f.to_world(Point2D::new(0.0, 3.0));
        assert!(a.distance(&b) < 1e-4);
    }

    #[test]
    fn test_map_range() {
        assert_eq!(map_range(15.0, 5.0, 25.0, 0.0, 1.0), 0.5);
        assert_eq!(map_range(3.0, 2.0, 2.0, 7.0, 9.0), 7.0);
    }
}

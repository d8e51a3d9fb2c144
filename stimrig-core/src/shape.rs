use serde::{Deserialize, Serialize};

/// Object outline used for hit testing. Shapes without an analytic test fall
/// back to the bounding circle of the horizontal extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Rectangle,
    Ellipse,
    Cross,
    Polygon,
    Ring,
    Wedge,
}

impl Shape {
    /// Numeric code stored in the per-object channel array so the renderer
    /// and the hit test agree on the outline.
    pub fn code(self) -> f32 {
        match self {
            Shape::Rectangle => 0.0,
            Shape::Ellipse => 1.0,
            Shape::Cross => 2.0,
            Shape::Polygon => 3.0,
            Shape::Ring => 4.0,
            Shape::Wedge => 5.0,
        }
    }

    pub fn from_code(code: f32) -> Shape {
        match code as i64 {
            0 => Shape::Rectangle,
            1 => Shape::Ellipse,
            2 => Shape::Cross,
            3 => Shape::Polygon,
            4 => Shape::Ring,
            _ => Shape::Wedge,
        }
    }

    /// `(dx, dy)` is the pointer position relative to the object center, in
    /// the same pixel space as `width`/`height`. Rotation is in radians.
    pub fn contains(self, dx: f32, dy: f32, width: f32, height: f32, rotation: f32) -> bool {
        // rotate the pointer into the object frame
        let (sin, cos) = rotation.sin_cos();
        let x = dx * cos + dy * sin;
        let y = -dx * sin + dy * cos;

        match self {
            Shape::Rectangle => x.abs() < width / 2.0 && y.abs() < height / 2.0,
            Shape::Ellipse => {
                let sx = width / 2.0;
                let sy = height / 2.0;
                if sx <= 0.0 || sy <= 0.0 {
                    return false;
                }
                (x / sx).powi(2) + (y / sy).powi(2) < 1.0
            }
            _ => x * x + y * y < (width / 2.0).powi(2),
        }
    }
}

impl Default for Shape {
    fn default() -> Self {
        Shape::Rectangle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_edges() {
        assert!(Shape::Rectangle.contains(49.0, 49.0, 100.0, 100.0, 0.0));
        assert!(!Shape::Rectangle.contains(51.0, 0.0, 100.0, 100.0, 0.0));
    }

    #[test]
    fn rotated_rectangle() {
        // a thin bar rotated 90 degrees: what was out of reach horizontally
        // is now inside
        let r = std::f32::consts::FRAC_PI_2;
        assert!(!Shape::Rectangle.contains(0.0, 40.0, 100.0, 10.0, 0.0));
        assert!(Shape::Rectangle.contains(0.0, 40.0, 100.0, 10.0, r));
    }

    #[test]
    fn ellipse_inside_corner_outside() {
        assert!(Shape::Ellipse.contains(0.0, 0.0, 100.0, 50.0, 0.0));
        assert!(!Shape::Ellipse.contains(49.0, 24.0, 100.0, 50.0, 0.0));
    }

    #[test]
    fn ring_uses_bounding_circle() {
        assert!(Shape::Ring.contains(30.0, 30.0, 100.0, 100.0, 0.0));
        assert!(!Shape::Ring.contains(40.0, 40.0, 100.0, 100.0, 0.0));
    }
}

//! Affine transforms used by the paint-tree interpreter.

use std::ops::{Mul, MulAssign};

pub use font_types::{BoundingBox, Point};

/// A 2x3 affine transformation matrix.
///
/// For a point `(x, y)` the transformed position is
/// `x' = xx * x + xy * y + dx`
/// `y' = yx * x + yy * y + dy`.
///
/// Composition is standard matrix multiplication: `a * b` means "apply `b`,
/// then `a`" (`a ∘ b`). [`Transform::then`], used throughout the
/// interpreter, composes in the opposite, left-to-right order: `a.then(b)`
/// means "apply `a`, then `b`" (`b ∘ a`).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Transform {
    pub xx: f32,
    pub yx: f32,
    pub xy: f32,
    pub yy: f32,
    pub dx: f32,
    pub dy: f32,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        xx: 1.0,
        yx: 0.0,
        xy: 0.0,
        yy: 1.0,
        dx: 0.0,
        dy: 0.0,
    };

    pub fn translation(dx: f32, dy: f32) -> Self {
        Self {
            dx,
            dy,
            ..Self::IDENTITY
        }
    }

    pub fn scale(sx: f32, sy: f32) -> Self {
        Self {
            xx: sx,
            yy: sy,
            ..Self::IDENTITY
        }
    }

    pub fn scale_around_center(sx: f32, sy: f32, center: Option<Point<f32>>) -> Self {
        let mut t = Self::scale(sx, sy);
        if let Some(center) = center {
            t.dx = center.x - sx * center.x;
            t.dy = center.y - sy * center.y;
        }
        t
    }

    pub fn rotation(angle_degrees: f32, center: Option<Point<f32>>) -> Self {
        let radians = angle_degrees.to_radians();
        let (sin_v, cos_v) = (radians.sin(), radians.cos());
        let mut t = Self {
            xx: cos_v,
            xy: -sin_v,
            yx: sin_v,
            yy: cos_v,
            ..Self::IDENTITY
        };
        if let Some(center) = center {
            t.dx = sin_v * center.y + (1.0 - cos_v) * center.x;
            t.dy = -sin_v * center.x + (1.0 - cos_v) * center.y;
        }
        t
    }

    /// `skew(x_skew_angle, y_skew_angle)`, sign flipped on the x component to
    /// match the COLRv1 specification's sense of a positive x-skew angle.
    pub fn skew(x_skew_angle_degrees: f32, y_skew_angle_degrees: f32, center: Option<Point<f32>>) -> Self {
        let tan_x = x_skew_angle_degrees.to_radians().tan();
        let tan_y = y_skew_angle_degrees.to_radians().tan();
        let mut t = Self {
            xy: -tan_x,
            yx: tan_y,
            ..Self::IDENTITY
        };
        if let Some(center) = center {
            t.dx = tan_x * center.y;
            t.dy = -tan_y * center.x;
        }
        t
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Applies this transform to a point.
    pub fn apply(&self, p: Point<f32>) -> Point<f32> {
        Point::new(
            self.xx * p.x + self.xy * p.y + self.dx,
            self.yx * p.x + self.yy * p.y + self.dy,
        )
    }

    /// Returns `self` followed by `rhs`, i.e. `rhs ∘ self`.
    pub fn then(self, rhs: Transform) -> Transform {
        rhs * self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Transform {
    type Output = Transform;

    /// `self * rhs` composes so that applying the result is equivalent to
    /// applying `rhs` first and `self` second (`self ∘ rhs`).
    fn mul(self, rhs: Transform) -> Transform {
        fn dot(a: f32, b: f32, c: f32, d: f32) -> f32 {
            a * b + c * d
        }
        Transform {
            xx: dot(self.xx, rhs.xx, self.xy, rhs.yx),
            xy: dot(self.xx, rhs.xy, self.xy, rhs.yy),
            dx: dot(self.xx, rhs.dx, self.xy, rhs.dy) + self.dx,
            yx: dot(self.yx, rhs.xx, self.yy, rhs.yx),
            yy: dot(self.yx, rhs.xy, self.yy, rhs.yy),
            dy: dot(self.yx, rhs.dx, self.yy, rhs.dy) + self.dy,
        }
    }
}

impl MulAssign for Transform {
    fn mul_assign(&mut self, rhs: Transform) {
        *self = *self * rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_noop() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(Transform::IDENTITY.apply(p), p);
    }

    #[test]
    fn translate_then_scale_composes_in_order() {
        let t = Transform::translation(1.0, 0.0).then(Transform::scale(2.0, 2.0));
        // (0,0) -> translate -> (1,0) -> scale -> (2,0)
        assert_eq!(t.apply(Point::new(0.0, 0.0)), Point::new(2.0, 0.0));
    }

    #[test]
    fn rotate_around_center_fixes_center() {
        let center = Point::new(5.0, 5.0);
        let t = Transform::rotation(90.0, Some(center));
        let p = t.apply(center);
        assert!((p.x - center.x).abs() < 1e-4);
        assert!((p.y - center.y).abs() < 1e-4);
    }
}

//! 2D vector value type
//!
//! Every geometric quantity in the models goes through `Vector2`. Arithmetic
//! is delegated to `glam`, but the degenerate cases are pinned down here:
//! dividing by zero and normalizing a zero vector both yield `Vector2::ZERO`.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Unit vector at `radians` from the +x axis
    #[inline]
    pub fn from_angle(radians: f32) -> Self {
        Vec2::from_angle(radians).into()
    }

    #[inline]
    pub fn mag(self) -> f32 {
        Vec2::from(self).length()
    }

    #[inline]
    pub fn mag_sq(self) -> f32 {
        Vec2::from(self).length_squared()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    #[inline]
    pub fn normalize(self) -> Self {
        Vec2::from(self).normalize_or_zero().into()
    }

    #[inline]
    pub fn dist(self, other: Self) -> f32 {
        Vec2::from(self).distance(other.into())
    }

    #[inline]
    pub fn dot(self, other: Self) -> f32 {
        Vec2::from(self).dot(other.into())
    }

    /// Counter-clockwise perpendicular
    #[inline]
    pub fn perp(self) -> Self {
        Vec2::from(self).perp().into()
    }

    /// Angle from the +x axis in radians
    #[inline]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Mirror `self` about a surface with unit normal `normal`: `D - 2(D·N)N`
    #[inline]
    pub fn reflect(self, normal: Self) -> Self {
        self - normal * (2.0 * self.dot(normal))
    }

    /// Rescale to at most `max` length
    #[inline]
    pub fn clamp_mag(self, max: f32) -> Self {
        if self.mag_sq() > max * max {
            self.normalize() * max
        } else {
            self
        }
    }

    #[inline]
    pub fn with_x(self, x: f32) -> Self {
        Self { x, ..self }
    }

    #[inline]
    pub fn with_y(self, y: f32) -> Self {
        Self { y, ..self }
    }
}

impl From<Vec2> for Vector2 {
    #[inline]
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

impl From<Vector2> for Vec2 {
    #[inline]
    fn from(v: Vector2) -> Self {
        Vec2::new(v.x, v.y)
    }
}

impl Add for Vector2 {
    type Output = Self;
    #[inline]
    fn add(self, rhs: Self) -> Self {
        (Vec2::from(self) + Vec2::from(rhs)).into()
    }
}

impl AddAssign for Vector2 {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sub for Vector2 {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: Self) -> Self {
        (Vec2::from(self) - Vec2::from(rhs)).into()
    }
}

impl SubAssign for Vector2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vector2 {
    type Output = Self;
    #[inline]
    fn mul(self, rhs: f32) -> Self {
        (Vec2::from(self) * rhs).into()
    }
}

impl Div<f32> for Vector2 {
    type Output = Self;
    /// Division by zero yields the zero vector
    #[inline]
    fn div(self, rhs: f32) -> Self {
        if rhs == 0.0 {
            return Self::ZERO;
        }
        (Vec2::from(self) / rhs).into()
    }
}

impl Neg for Vector2 {
    type Output = Self;
    #[inline]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_arithmetic() {
        let a = Vector2::new(3.0, 4.0);
        let b = Vector2::new(1.0, -2.0);
        assert_eq!(a + b, Vector2::new(4.0, 2.0));
        assert_eq!(a - b, Vector2::new(2.0, 6.0));
        assert_eq!(a * 2.0, Vector2::new(6.0, 8.0));
        assert_eq!(a / 2.0, Vector2::new(1.5, 2.0));
        assert_eq!(a.mag(), 5.0);
        assert_eq!(a.mag_sq(), 25.0);
        assert_eq!(a.dist(Vector2::ZERO), 5.0);
    }

    #[test]
    fn test_degenerate_cases_yield_zero() {
        assert_eq!(Vector2::new(3.0, 4.0) / 0.0, Vector2::ZERO);
        assert_eq!(Vector2::ZERO.normalize(), Vector2::ZERO);
    }

    #[test]
    fn test_reflect_off_vertical_wall() {
        let d = Vector2::new(1.0, 1.0).normalize();
        let r = d.reflect(Vector2::new(-1.0, 0.0));
        assert!((r.x + d.x).abs() < 1e-6);
        assert!((r.y - d.y).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_mag() {
        let v = Vector2::new(30.0, 40.0).clamp_mag(10.0);
        assert!((v.mag() - 10.0).abs() < 1e-4);
        let small = Vector2::new(1.0, 1.0);
        assert_eq!(small.clamp_mag(10.0), small);
    }

    proptest! {
        #[test]
        fn normalize_is_unit_or_zero(x in -1e4f32..1e4, y in -1e4f32..1e4) {
            let n = Vector2::new(x, y).normalize();
            let m = n.mag();
            prop_assert!(m == 0.0 || (m - 1.0).abs() < 1e-4);
        }

        #[test]
        fn reflection_preserves_length(angle in 0.0f32..6.28, normal_angle in 0.0f32..6.28) {
            let d = Vector2::from_angle(angle);
            let n = Vector2::from_angle(normal_angle);
            let r = d.reflect(n);
            prop_assert!((r.mag() - 1.0).abs() < 1e-4);
            // Normal component flips, tangential component is preserved
            prop_assert!((r.dot(n) + d.dot(n)).abs() < 1e-4);
            prop_assert!((r.dot(n.perp()) - d.dot(n.perp())).abs() < 1e-4);
        }
    }
}

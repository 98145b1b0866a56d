//! 2D vector math shared by both pipelines.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// A point or displacement in the 2D plane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Unit vector in the same direction. The zero vector is returned
    /// unchanged instead of producing NaN components.
    pub fn normalized(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self / mag
        } else {
            *self
        }
    }

    pub fn rounded(&self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }
}

pub fn dot(a: Position, b: Position) -> f64 {
    a.x * b.x + a.y * b.y
}

impl Add for Position {
    type Output = Position;
    fn add(self, other: Position) -> Position {
        Position::new(self.x + other.x, self.y + other.y)
    }
}

impl AddAssign for Position {
    fn add_assign(&mut self, other: Position) {
        self.x += other.x;
        self.y += other.y;
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, other: Position) -> Position {
        Position::new(self.x - other.x, self.y - other.y)
    }
}

impl SubAssign for Position {
    fn sub_assign(&mut self, other: Position) {
        self.x -= other.x;
        self.y -= other.y;
    }
}

impl Neg for Position {
    type Output = Position;
    fn neg(self) -> Position {
        Position::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Position {
    type Output = Position;
    fn mul(self, a: f64) -> Position {
        Position::new(self.x * a, self.y * a)
    }
}

impl MulAssign<f64> for Position {
    fn mul_assign(&mut self, a: f64) {
        self.x *= a;
        self.y *= a;
    }
}

/// Component-wise product, used for anisotropic force scaling.
impl Mul for Position {
    type Output = Position;
    fn mul(self, other: Position) -> Position {
        Position::new(self.x * other.x, self.y * other.y)
    }
}

impl Div<f64> for Position {
    type Output = Position;
    fn div(self, a: f64) -> Position {
        Position::new(self.x / a, self.y / a)
    }
}

impl DivAssign<f64> for Position {
    fn div_assign(&mut self, a: f64) {
        self.x /= a;
        self.y /= a;
    }
}

/// Axis-aligned bounding rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Rect {
    pub min: Position,
    pub max: Position,
}

impl Rect {
    /// Empty rect suitable as a fold seed; `include` fixes it up.
    pub fn empty() -> Self {
        Self {
            min: Position::new(f64::INFINITY, f64::INFINITY),
            max: Position::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn include(&mut self, p: Position) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    pub fn union(&mut self, other: &Rect) {
        self.include(other.min);
        self.include(other.max);
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_is_unit_length() {
        let v = Position::new(3.0, 4.0).normalized();
        assert!((v.magnitude() - 1.0).abs() < 1e-12, "magnitude={}", v.magnitude());
        assert!((v.x - 0.6).abs() < 1e-12);
        assert!((v.y - 0.8).abs() < 1e-12);
    }

    #[test]
    fn normalized_zero_stays_zero() {
        let v = Position::default().normalized();
        assert_eq!(v, Position::default());
    }

    #[test]
    fn componentwise_product() {
        let v = Position::new(2.0, -3.0) * Position::new(0.1, 1.0);
        assert!((v.x - 0.2).abs() < 1e-12);
        assert!((v.y + 3.0).abs() < 1e-12);
    }

    #[test]
    fn rect_grows_to_cover_points() {
        let mut rect = Rect::empty();
        assert!(rect.is_empty());
        rect.include(Position::new(-1.0, 2.0));
        rect.include(Position::new(3.0, -4.0));
        assert!((rect.width() - 4.0).abs() < 1e-12);
        assert!((rect.height() - 6.0).abs() < 1e-12);
    }
}

//! A positioned color sample.
//!
//! Mean-shift mode seeking operates in the joint 5D position+color space, so
//! the sample type carries arithmetic over both parts at once.

use crate::color::Color;
use crate::geometry::Position;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pixel {
    pub pos: Position,
    pub col: Color,
}

impl Pixel {
    pub const fn new(pos: Position, col: Color) -> Self {
        Self { pos, col }
    }

    /// Joint squared norm over position and color components.
    pub fn magnitude_squared(&self) -> f64 {
        self.pos.magnitude_squared() + self.col.magnitude_squared()
    }
}

impl Add for Pixel {
    type Output = Pixel;
    fn add(self, other: Pixel) -> Pixel {
        Pixel::new(self.pos + other.pos, self.col + other.col)
    }
}

impl AddAssign for Pixel {
    fn add_assign(&mut self, other: Pixel) {
        self.pos += other.pos;
        self.col += other.col;
    }
}

impl Sub for Pixel {
    type Output = Pixel;
    fn sub(self, other: Pixel) -> Pixel {
        Pixel::new(self.pos - other.pos, self.col - other.col)
    }
}

impl SubAssign for Pixel {
    fn sub_assign(&mut self, other: Pixel) {
        self.pos -= other.pos;
        self.col -= other.col;
    }
}

impl Mul<f64> for Pixel {
    type Output = Pixel;
    fn mul(self, a: f64) -> Pixel {
        Pixel::new(self.pos * a, self.col * a)
    }
}

impl MulAssign<f64> for Pixel {
    fn mul_assign(&mut self, a: f64) {
        self.pos *= a;
        self.col *= a;
    }
}

impl Div<f64> for Pixel {
    type Output = Pixel;
    fn div(self, a: f64) -> Pixel {
        Pixel::new(self.pos / a, self.col / a)
    }
}

impl DivAssign<f64> for Pixel {
    fn div_assign(&mut self, a: f64) {
        self.pos /= a;
        self.col /= a;
    }
}

//! Single-channel luminance value with the same arithmetic/convert contract
//! as [`Color`](super::Color).

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Gray {
    pub l: f64,
}

impl Gray {
    pub const fn new(l: f64) -> Self {
        Self { l }
    }

    /// Integer luma weighting (11r + 16g + 5b) / 32.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(((11 * r as u32 + 16 * g as u32 + 5 * b as u32) / 32) as f64)
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let v = self.l.round().clamp(0.0, 255.0) as u8;
        (v, v, v)
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.l * self.l
    }
}

impl Add for Gray {
    type Output = Gray;
    fn add(self, other: Gray) -> Gray {
        Gray::new(self.l + other.l)
    }
}

impl AddAssign for Gray {
    fn add_assign(&mut self, other: Gray) {
        self.l += other.l;
    }
}

impl Sub for Gray {
    type Output = Gray;
    fn sub(self, other: Gray) -> Gray {
        Gray::new(self.l - other.l)
    }
}

impl SubAssign for Gray {
    fn sub_assign(&mut self, other: Gray) {
        self.l -= other.l;
    }
}

impl Mul<f64> for Gray {
    type Output = Gray;
    fn mul(self, a: f64) -> Gray {
        Gray::new(self.l * a)
    }
}

impl MulAssign<f64> for Gray {
    fn mul_assign(&mut self, a: f64) {
        self.l *= a;
    }
}

impl Div<f64> for Gray {
    type Output = Gray;
    fn div(self, a: f64) -> Gray {
        Gray::new(self.l / a)
    }
}

impl DivAssign<f64> for Gray {
    fn div_assign(&mut self, a: f64) {
        self.l /= a;
    }
}

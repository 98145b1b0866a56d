//! Perceptual color type used everywhere downstream.
//!
//! The conversion pipeline is sRGB → XYZ (fixed 3×3 matrix) → a Lab-like
//! space with a linear segment near black → a DIN99-style space that
//! log-compresses chroma and lightness separately. Squared distances in the
//! resulting three components approximate perceived color difference well
//! enough that the rest of the crate treats `magnitude_squared` of a color
//! difference as "how far apart these look".

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Sub, SubAssign};

// cos/sin of the 16° rotation applied between the a/b axes and the
// chroma-compression axes.
const COS16: f64 = 0.96126169593832;
const SIN16: f64 = 0.275637355817;

/// Three-component DIN99-like color value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub l99: f64,
    pub a99: f64,
    pub b99: f64,
}

impl Color {
    pub const fn new(l99: f64, a99: f64, b99: f64) -> Self {
        Self { l99, a99, b99 }
    }

    /// Converts an 8-bit RGB triple. Exact black short-circuits to the zero
    /// color so none of the intermediate logs see a zero argument.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        if r as u32 + g as u32 + b as u32 == 0 {
            return Self::default();
        }
        let (rf, gf, bf) = (r as f64, g as f64, b as f64);

        // RGB to XYZ
        let x = 0.4124564 * rf + 0.3575761 * gf + 0.1804375 * bf;
        let y = 0.2126729 * rf + 0.7151522 * gf + 0.0721750 * bf;
        let z = 0.0193339 * rf + 0.1191920 * gf + 0.9503041 * bf;

        // XYZ to L*a*b*
        let l_star = 116.0 * cbrt(y / 255.0) - 16.0;
        let a_star = 500.0 * (cbrt(x / 242.25) - cbrt(y / 255.0));
        let b_star = 200.0 * (cbrt(y / 255.0) - cbrt(z / 277.95));

        // L*a*b* to DIN99
        let e = a_star * COS16 + b_star * SIN16;
        let f = 0.7 * (-a_star * SIN16 + b_star * COS16);
        let g = (e * e + f * f).sqrt();
        let l99 = 105.51 * (1.0 + 0.0158 * l_star).ln();
        if g < 1e-12 {
            // achromatic input, chroma axes stay at the origin
            return Self::new(l99, 0.0, 0.0);
        }
        let k = (1.0 + 0.045 * g).ln() / 0.045;
        Self::new(l99, k * e / g, k * f / g)
    }

    /// Inverts the conversion pipeline, clamping to the 8-bit range.
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        if self.l99.abs() < 1e-9 {
            return (0, 0, 0);
        }

        // DIN99 to L*a*b*
        let h99 = self.b99.atan2(self.a99);
        let c99 = (self.a99 * self.a99 + self.b99 * self.b99).sqrt();
        let g = ((0.045 * c99).exp() - 1.0) / 0.045;
        let e = g * h99.cos();
        let f = g * h99.sin();
        let l = ((self.l99 / 105.51).exp() - 1.0) / 0.0158;
        let a = e * COS16 - (f / 0.7) * SIN16;
        let b = e * SIN16 + (f / 0.7) * COS16;

        // L*a*b* to XYZ
        let fy = 0.0086206896551724 * (l + 16.0);
        let x = 242.25 * cube(fy + 0.002 * a);
        let y = 255.0 * cube(fy);
        let z = 277.95 * cube(fy - 0.005 * b);

        // XYZ to RGB
        (
            clamp_channel(3.2404548 * x - 1.5371389 * y - 0.4985315 * z),
            clamp_channel(-0.9692664 * x + 1.8760109 * y + 0.0415561 * z),
            clamp_channel(0.0556434 * x - 0.2040259 * y + 1.0572252 * z),
        )
    }

    /// Euclidean squared norm over the three components; applied to a color
    /// difference this is the perceptual squared distance.
    pub fn magnitude_squared(&self) -> f64 {
        self.l99 * self.l99 + self.a99 * self.a99 + self.b99 * self.b99
    }

    pub fn chroma(&self) -> f64 {
        (self.a99 * self.a99 + self.b99 * self.b99).sqrt()
    }

    pub fn hue(&self) -> f64 {
        self.b99.atan2(self.a99)
    }
}

/// Cube root with a linear segment below the Lab threshold, keeping the
/// derivative bounded near black.
fn cbrt(x: f64) -> f64 {
    if x > 0.0088564516790356 {
        x.powf(1.0 / 3.0)
    } else {
        7.787037037037037 * x + 0.13793103448276
    }
}

/// Inverse of `cbrt`, with the matching linear segment.
fn cube(x: f64) -> f64 {
    if x > 0.20689655172414 {
        x * x * x
    } else {
        0.12841854934602 * (x - 0.13793103448276)
    }
}

fn clamp_channel(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

impl Add for Color {
    type Output = Color;
    fn add(self, other: Color) -> Color {
        Color::new(self.l99 + other.l99, self.a99 + other.a99, self.b99 + other.b99)
    }
}

impl AddAssign for Color {
    fn add_assign(&mut self, other: Color) {
        self.l99 += other.l99;
        self.a99 += other.a99;
        self.b99 += other.b99;
    }
}

impl Sub for Color {
    type Output = Color;
    fn sub(self, other: Color) -> Color {
        Color::new(self.l99 - other.l99, self.a99 - other.a99, self.b99 - other.b99)
    }
}

impl SubAssign for Color {
    fn sub_assign(&mut self, other: Color) {
        self.l99 -= other.l99;
        self.a99 -= other.a99;
        self.b99 -= other.b99;
    }
}

impl Mul<f64> for Color {
    type Output = Color;
    fn mul(self, a: f64) -> Color {
        Color::new(self.l99 * a, self.a99 * a, self.b99 * a)
    }
}

impl MulAssign<f64> for Color {
    fn mul_assign(&mut self, a: f64) {
        self.l99 *= a;
        self.a99 *= a;
        self.b99 *= a;
    }
}

impl Div<f64> for Color {
    type Output = Color;
    fn div(self, a: f64) -> Color {
        Color::new(self.l99 / a, self.a99 / a, self.b99 / a)
    }
}

impl DivAssign<f64> for Color {
    fn div_assign(&mut self, a: f64) {
        self.l99 /= a;
        self.a99 /= a;
        self.b99 /= a;
    }
}

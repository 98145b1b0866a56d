//! The 10-component descriptor that characterizes a segment.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Sub, SubAssign};

pub const FEATURE_COUNT: usize = 10;

/// Feature slots, in storage order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Feature {
    Size,
    SpatialSd,
    Compactness,
    Lightness,
    GreenRed,
    YellowBlue,
    Chroma,
    ColorSd,
    Hue,
    Angle,
}

impl Feature {
    /// Lowercase label, used for batch output file names and logs.
    pub fn label(index: usize) -> &'static str {
        match index {
            0 => "size",
            1 => "spatial_sd",
            2 => "compactness",
            3 => "lightness",
            4 => "green_red",
            5 => "yellow_blue",
            6 => "chroma",
            7 => "color_sd",
            8 => "hue",
            9 => "angle",
            _ => "unknown",
        }
    }
}

/// Fixed 10-slot numeric vector with full arithmetic and component-wise
/// min/max, indexed either by `usize` or by [`Feature`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(pub [f64; FEATURE_COUNT]);

impl FeatureVector {
    pub fn compwise_min(&self, other: &FeatureVector) -> FeatureVector {
        let mut out = *self;
        for i in 0..FEATURE_COUNT {
            out.0[i] = out.0[i].min(other.0[i]);
        }
        out
    }

    pub fn compwise_max(&self, other: &FeatureVector) -> FeatureVector {
        let mut out = *self;
        for i in 0..FEATURE_COUNT {
            out.0[i] = out.0[i].max(other.0[i]);
        }
        out
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_squared().sqrt()
    }

    pub fn magnitude_squared(&self) -> f64 {
        self.0.iter().map(|v| v * v).sum()
    }
}

impl Index<usize> for FeatureVector {
    type Output = f64;
    fn index(&self, i: usize) -> &f64 {
        &self.0[i]
    }
}

impl IndexMut<usize> for FeatureVector {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.0[i]
    }
}

impl Index<Feature> for FeatureVector {
    type Output = f64;
    fn index(&self, f: Feature) -> &f64 {
        &self.0[f as usize]
    }
}

impl IndexMut<Feature> for FeatureVector {
    fn index_mut(&mut self, f: Feature) -> &mut f64 {
        &mut self.0[f as usize]
    }
}

macro_rules! compwise_binop {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $op:tt) => {
        impl $trait for FeatureVector {
            type Output = FeatureVector;
            fn $method(self, other: FeatureVector) -> FeatureVector {
                let mut out = self;
                for i in 0..FEATURE_COUNT {
                    out.0[i] = out.0[i] $op other.0[i];
                }
                out
            }
        }

        impl $assign_trait for FeatureVector {
            fn $assign_method(&mut self, other: FeatureVector) {
                for i in 0..FEATURE_COUNT {
                    self.0[i] = self.0[i] $op other.0[i];
                }
            }
        }
    };
}

compwise_binop!(Add, add, AddAssign, add_assign, +);
compwise_binop!(Sub, sub, SubAssign, sub_assign, -);
compwise_binop!(Mul, mul, MulAssign, mul_assign, *);
compwise_binop!(Div, div, DivAssign, div_assign, /);

impl Mul<f64> for FeatureVector {
    type Output = FeatureVector;
    fn mul(self, a: f64) -> FeatureVector {
        let mut out = self;
        for v in out.0.iter_mut() {
            *v *= a;
        }
        out
    }
}

impl MulAssign<f64> for FeatureVector {
    fn mul_assign(&mut self, a: f64) {
        for v in self.0.iter_mut() {
            *v *= a;
        }
    }
}

impl Div<f64> for FeatureVector {
    type Output = FeatureVector;
    fn div(self, a: f64) -> FeatureVector {
        let mut out = self;
        for v in out.0.iter_mut() {
            *v /= a;
        }
        out
    }
}

impl DivAssign<f64> for FeatureVector {
    fn div_assign(&mut self, a: f64) {
        for v in self.0.iter_mut() {
            *v /= a;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn componentwise_arithmetic() {
        let mut a = FeatureVector::default();
        let mut b = FeatureVector::default();
        for i in 0..FEATURE_COUNT {
            a[i] = i as f64;
            b[i] = 2.0;
        }
        let sum = a + b;
        let prod = a * b;
        assert_eq!(sum[3], 5.0);
        assert_eq!(prod[3], 6.0);
        assert_eq!((a * 2.0)[4], 8.0);
    }

    #[test]
    fn min_max_are_componentwise() {
        let mut a = FeatureVector::default();
        let mut b = FeatureVector::default();
        a[0] = 1.0;
        b[0] = -1.0;
        a[9] = -5.0;
        b[9] = 5.0;
        let lo = a.compwise_min(&b);
        let hi = a.compwise_max(&b);
        assert_eq!(lo[0], -1.0);
        assert_eq!(lo[9], -5.0);
        assert_eq!(hi[0], 1.0);
        assert_eq!(hi[9], 5.0);
    }

    #[test]
    fn magnitude_over_all_slots() {
        let mut v = FeatureVector::default();
        v[Feature::Size] = 3.0;
        v[Feature::Angle] = 4.0;
        assert!((v.magnitude() - 5.0).abs() < 1e-12);
    }
}

//! Owned dense 2D pixel grid in row-major layout.

pub mod io;

/// Generic width × height buffer of pixel values.
#[derive(Clone, Debug)]
pub struct Raster<T> {
    /// Width in pixels
    pub w: usize,
    /// Height in pixels
    pub h: usize,
    /// Backing storage in row-major order
    pub data: Vec<T>,
}

impl<T: Clone + Default> Raster<T> {
    /// Construct a default-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            data: vec![T::default(); w * h],
        }
    }

    pub fn fill(&mut self, value: T) {
        for px in self.data.iter_mut() {
            *px = value.clone();
        }
    }
}

impl<T> Raster<T> {
    pub fn area(&self) -> usize {
        self.w * self.h
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.w + x
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> &T {
        &self.data[y * self.w + x]
    }

    #[inline]
    pub fn at_mut(&mut self, x: usize, y: usize) -> &mut T {
        let i = y * self.w + x;
        &mut self.data[i]
    }

    /// 8-connectivity predicate over linear indices: true iff both indices
    /// are in range and at most one row and one column apart. Accepts signed
    /// arguments so callers can probe `i ± 1` and `i ± w` without bounds
    /// arithmetic of their own.
    #[inline]
    pub fn are_neighbours(&self, a: isize, b: isize) -> bool {
        let n = (self.w * self.h) as isize;
        let w = self.w as isize;
        a >= 0
            && a < n
            && b >= 0
            && b < n
            && (a % w - b % w).abs() <= 1
            && (a / w - b / w).abs() <= 1
    }
}

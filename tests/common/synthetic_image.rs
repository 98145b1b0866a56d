//! Synthetic raster builders shared by the integration suites.

use collage::prelude::*;

/// Uniform image of a single RGB color.
pub fn uniform(w: usize, h: usize, rgb: (u8, u8, u8)) -> Raster<Color> {
    let mut image = Raster::new(w, h);
    image.fill(Color::from_rgb(rgb.0, rgb.1, rgb.2));
    image
}

/// Top half in one color, bottom half in the other.
pub fn two_tone(w: usize, h: usize, top: (u8, u8, u8), bottom: (u8, u8, u8)) -> Raster<Color> {
    let mut image = Raster::new(w, h);
    let top = Color::from_rgb(top.0, top.1, top.2);
    let bottom = Color::from_rgb(bottom.0, bottom.1, bottom.2);
    for y in 0..h {
        for x in 0..w {
            *image.at_mut(x, y) = if y < h / 2 { top } else { bottom };
        }
    }
    image
}

/// Vertical bands of equal width, one per given color, left to right.
pub fn vertical_bands(w: usize, h: usize, colors: &[(u8, u8, u8)]) -> Raster<Color> {
    let mut image = Raster::new(w, h);
    let band = w / colors.len();
    for y in 0..h {
        for x in 0..w {
            let k = (x / band).min(colors.len() - 1);
            let (r, g, b) = colors[k];
            *image.at_mut(x, y) = Color::from_rgb(r, g, b);
        }
    }
    image
}

//! I/O helpers for color rasters and JSON reports.
//!
//! - `load_color_image`: read a PNG/JPEG/etc. into a `Raster<Color>`.
//! - `save_color_raster`: write a `Raster<Color>` to an RGB PNG.
//! - `save_gray_raster`: write a `Raster<Gray>` to a grayscale PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.

use super::Raster;
use crate::color::{Color, Gray};
use image::{GrayImage, Luma, Rgb, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Load an image from disk and convert every pixel into the perceptual
/// color space.
pub fn load_color_image(path: &Path) -> Result<Raster<Color>, String> {
    let img = image::open(path)
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?
        .into_rgb8();
    let w = img.width() as usize;
    let h = img.height() as usize;
    let mut raster = Raster::new(w, h);
    for (x, y, px) in img.enumerate_pixels() {
        *raster.at_mut(x as usize, y as usize) = Color::from_rgb(px[0], px[1], px[2]);
    }
    Ok(raster)
}

/// Save a color raster as an RGB PNG (inverse color conversion, clamped).
pub fn save_color_raster(raster: &Raster<Color>, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = RgbImage::new(raster.w as u32, raster.h as u32);
    for y in 0..raster.h {
        for x in 0..raster.w {
            let (r, g, b) = raster.at(x, y).to_rgb();
            out.put_pixel(x as u32, y as u32, Rgb([r, g, b]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Save a grayscale raster as a PNG, clamping values into [0, 255].
pub fn save_gray_raster(raster: &Raster<Gray>, path: &Path) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(raster.w as u32, raster.h as u32);
    for y in 0..raster.h {
        for x in 0..raster.w {
            let v = raster.at(x, y).l.round().clamp(0.0, 255.0) as u8;
            out.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

/// Write plain text to `path`, creating parent directories.
pub fn write_text_file(path: &Path, contents: &str) -> Result<(), String> {
    ensure_parent_dir(path)?;
    fs::write(path, contents).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}

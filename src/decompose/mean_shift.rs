//! Mean-shift filtering and region growing.
//!
//! Filtering runs a fixed-point iteration per pixel in the joint 5D
//! position+color space. All samples are pre-scaled by the two kernel radii
//! so the kernel becomes the unit ball, and a spatial hash over the scaled
//! positions limits each iteration to the 3×3 key neighbourhood.

use super::control::FilterControl;
use crate::color::Color;
use crate::geometry::Position;
use crate::pixel::Pixel;
use crate::raster::Raster;
use crate::segment::{Segment, SegmentGraph, SegmentId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeanShiftParams {
    /// Kernel radius in the spatial dimensions.
    pub sigma_pos: f64,
    /// Kernel radius in the color dimensions.
    pub sigma_col: f64,
    /// Segments below this pixel count are merged away.
    pub min_size: usize,
    /// Fixed-point threshold on the shift step width.
    pub epsilon_shift: f64,
    /// Color distance under which segments are considered equal.
    pub epsilon_merge: f64,
}

impl Default for MeanShiftParams {
    fn default() -> Self {
        Self {
            sigma_pos: 16.0,
            sigma_col: 8.0,
            min_size: 50,
            epsilon_shift: 0.03,
            epsilon_merge: 1.0,
        }
    }
}

impl MeanShiftParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(1.0..=100.0).contains(&self.sigma_pos) {
            return Err(format!("sigmaPos {} outside [1, 100]", self.sigma_pos));
        }
        if !(1.0..=100.0).contains(&self.sigma_col) {
            return Err(format!("sigmaCol {} outside [1, 100]", self.sigma_col));
        }
        if !(1..=10000).contains(&self.min_size) {
            return Err(format!("minSize {} outside [1, 10000]", self.min_size));
        }
        if !(0.001..=1.0).contains(&self.epsilon_shift) {
            return Err(format!("epsilonShift {} outside [0.001, 1]", self.epsilon_shift));
        }
        if !(0.5..=50.0).contains(&self.epsilon_merge) {
            return Err(format!("epsilonMerge {} outside [0.5, 50]", self.epsilon_merge));
        }
        Ok(())
    }
}

/// Spatial hash over pre-scaled samples. Cell side 1 in scaled coordinates,
/// so the unit-ball kernel around any sample is covered by the 3×3 key
/// window around its cell.
struct Lattice {
    cells: HashMap<(i64, i64), Vec<Pixel>>,
}

impl Lattice {
    fn build(image: &Raster<Color>, params: &MeanShiftParams) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<Pixel>> = HashMap::new();
        for y in 0..image.h {
            for x in 0..image.w {
                let scaled = Pixel::new(
                    Position::new(x as f64, y as f64) / params.sigma_pos,
                    *image.at(x, y) / params.sigma_col,
                );
                cells
                    .entry((scaled.pos.x.round() as i64, scaled.pos.y.round() as i64))
                    .or_default()
                    .push(scaled);
            }
        }
        Self { cells }
    }

    /// Mean of all samples within unit distance of `center`, together with
    /// the sample count. The center itself is always among them.
    fn local_mean(&self, center: Pixel) -> (Pixel, usize) {
        let kx = center.pos.x.round() as i64;
        let ky = center.pos.y.round() as i64;
        let mut sum = Pixel::default();
        let mut count = 0usize;
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let Some(cell) = self.cells.get(&(kx + dx, ky + dy)) else {
                    continue;
                };
                for &sample in cell {
                    if (sample - center).magnitude_squared() <= 1.0 {
                        sum += sample;
                        count += 1;
                    }
                }
            }
        }
        (sum, count)
    }
}

/// Converge one sample to its mode and return the de-scaled filtered color.
fn filter_pixel(lattice: &Lattice, start: Pixel, params: &MeanShiftParams) -> Color {
    let epsilon_shift_squared = params.epsilon_shift * params.epsilon_shift;
    let mut center = start;
    loop {
        let (sum, count) = lattice.local_mean(center);
        if count == 0 {
            break; // cannot happen for a sample of the lattice itself
        }
        let next = sum / count as f64;
        let step = next - center;
        center = next;
        if step.magnitude_squared() <= epsilon_shift_squared {
            break;
        }
    }
    center.col * params.sigma_col
}

fn filter_row(
    image: &Raster<Color>,
    lattice: &Lattice,
    params: &MeanShiftParams,
    control: &FilterControl,
    y: usize,
) -> Vec<Color> {
    let mut row = Vec::with_capacity(image.w);
    for x in 0..image.w {
        if control.is_cancelled() {
            return row;
        }
        let start = Pixel::new(
            Position::new(x as f64, y as f64) / params.sigma_pos,
            *image.at(x, y) / params.sigma_col,
        );
        row.push(filter_pixel(lattice, start, params));
    }
    control.advance(image.w, image.area());
    row
}

/// Filter the whole image. Returns `None` when the run was cancelled.
pub fn filter(
    image: &Raster<Color>,
    params: &MeanShiftParams,
    control: &FilterControl,
) -> Option<Raster<Color>> {
    let lattice = Lattice::build(image, params);

    #[cfg(feature = "parallel")]
    let rows: Vec<Vec<Color>> = {
        use rayon::prelude::*;
        (0..image.h)
            .into_par_iter()
            .map(|y| filter_row(image, &lattice, params, control, y))
            .collect()
    };
    #[cfg(not(feature = "parallel"))]
    let rows: Vec<Vec<Color>> = (0..image.h)
        .map(|y| filter_row(image, &lattice, params, control, y))
        .collect();

    if control.is_cancelled() {
        return None;
    }
    let mut filtered = Raster::new(image.w, image.h);
    for (y, row) in rows.into_iter().enumerate() {
        for (x, col) in row.into_iter().enumerate() {
            *filtered.at_mut(x, y) = col;
        }
    }
    Some(filtered)
}

/// Grow connected regions over the filtered raster. A pixel joins the
/// region when its filtered color stays within `epsilon_merge` of the
/// region's running mean; the resulting segments carry the original colors.
pub fn label_regions(
    image: &Raster<Color>,
    filtered: &Raster<Color>,
    epsilon_merge: f64,
) -> SegmentGraph {
    let mut graph = SegmentGraph::new();
    let area = filtered.area();
    if area == 0 {
        return graph;
    }
    let w = filtered.w as isize;
    let offsets = [-w, -1, 1, w, -w - 1, -w + 1, w - 1, w + 1];
    let epsilon_merge_squared = epsilon_merge * epsilon_merge;

    let mut labels: Vec<i64> = vec![-1; area];
    let mut segment_ids: Vec<SegmentId> = Vec::new();
    let mut queue: VecDeque<usize> = VecDeque::new();

    for i in 0..area {
        if labels[i] >= 0 {
            continue;
        }
        let label = segment_ids.len() as i64;
        labels[i] = label;
        queue.push_back(i);
        let mut segment = Segment::new();
        let mut color_sum = Color::default();
        let mut color_count = 0usize;

        while let Some(j) = queue.pop_front() {
            color_sum += filtered.data[j];
            color_count += 1;
            segment.add_pixel(Pixel::new(
                Position::new((j % filtered.w) as f64, (j / filtered.w) as f64),
                image.data[j],
            ));
            let mean = color_sum / color_count as f64;
            for off in offsets {
                let k = j as isize + off;
                if filtered.are_neighbours(j as isize, k)
                    && labels[k as usize] < 0
                    && (filtered.data[k as usize] - mean).magnitude_squared()
                        < epsilon_merge_squared
                {
                    labels[k as usize] = label;
                    queue.push_back(k as usize);
                }
            }
        }

        segment.set_color(color_sum / color_count as f64);
        segment_ids.push(graph.push(segment));
    }

    // Adjacency from right and below label changes.
    for i in 0..area {
        let right = i + 1;
        if right % filtered.w > 0 && labels[right] != labels[i] {
            graph.add_adjacency(
                segment_ids[labels[i] as usize],
                segment_ids[labels[right] as usize],
            );
        }
        let below = i + filtered.w;
        if below < area && labels[below] != labels[i] {
            graph.add_adjacency(
                segment_ids[labels[i] as usize],
                segment_ids[labels[below] as usize],
            );
        }
    }

    graph
}

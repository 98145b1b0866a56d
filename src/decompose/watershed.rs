//! Watershed decomposition: binomial blur, gradient map, ascending flood.

use crate::color::{Color, Gray};
use crate::geometry::Position;
use crate::pixel::Pixel;
use crate::raster::Raster;
use crate::segment::{Segment, SegmentGraph, SegmentId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WatershedParams {
    /// Radius of the binomial blur kernel. Capped at 31 so the kernel
    /// weights stay exact in u64.
    pub gaussian_radius: usize,
    /// Segments below this pixel count are merged away.
    pub min_size: usize,
    /// Color distance under which segments are considered equal.
    pub epsilon_merge: f64,
}

impl Default for WatershedParams {
    fn default() -> Self {
        Self {
            gaussian_radius: 31,
            min_size: 50,
            epsilon_merge: 3.0,
        }
    }
}

impl WatershedParams {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=31).contains(&self.gaussian_radius) {
            return Err(format!("gaussianRadius {} outside [1, 31]", self.gaussian_radius));
        }
        if !(1..=1000).contains(&self.min_size) {
            return Err(format!("minSize {} outside [1, 1000]", self.min_size));
        }
        if !(0.5..=50.0).contains(&self.epsilon_merge) {
            return Err(format!("epsilonMerge {} outside [0.5, 50]", self.epsilon_merge));
        }
        Ok(())
    }
}

/// Overflow-safe binomial coefficient; for r ≤ 31 every weight of the
/// 2r-row fits in u64.
pub fn binomial_coefficient(n: u64, r: u64) -> u64 {
    if 2 * r > n {
        return binomial_coefficient(n, n - r);
    }
    let mut result: u64 = 1;
    for i in 1..=r {
        result = result * (n - r + i) / i;
    }
    result
}

/// One horizontal binomial blur pass writing a transposed result, so two
/// passes blur both axes. Borders renormalize by the in-bounds weight sum.
fn blur_single_pass(image: &Raster<Color>, radius: usize) -> Raster<Color> {
    let r = radius.max(1);
    let n = 2 * r + 1;
    let kernel: Vec<u64> = (0..n)
        .map(|i| binomial_coefficient((n - 1) as u64, i as u64))
        .collect();

    let mut out: Raster<Color> = Raster::new(image.h, image.w);
    for y in 0..image.h {
        for x in 0..image.w {
            let mut color = Color::default();
            let mut weights: u64 = 0;
            for (i, &k) in kernel.iter().enumerate() {
                let sx = x as isize - r as isize + i as isize;
                if sx >= 0 && (sx as usize) < image.w {
                    color += *image.at(sx as usize, y) * k as f64;
                    weights += k;
                }
            }
            *out.at_mut(y, x) = color / weights as f64;
        }
    }
    out
}

/// Separable binomial blur over both axes.
pub fn blur(image: &Raster<Color>, radius: usize) -> Raster<Color> {
    blur_single_pass(&blur_single_pass(image, radius), radius)
}

/// Frobenius norm of the color Jacobian from clamped central differences.
pub fn gradient_magnitude(image: &Raster<Color>) -> Raster<Gray> {
    let mut out: Raster<Gray> = Raster::new(image.w, image.h);
    if image.area() == 0 {
        return out;
    }
    for y in 0..image.h {
        for x in 0..image.w {
            let dx = *image.at((x + 1).min(image.w - 1), y) - *image.at(x.saturating_sub(1), y);
            let dy = *image.at(x, (y + 1).min(image.h - 1)) - *image.at(x, y.saturating_sub(1));
            out.at_mut(x, y).l = (dx.magnitude_squared() + dy.magnitude_squared()).sqrt();
        }
    }
    out
}

/// Flood the gradient relief in ascending order. Pixels with no labeled
/// 4-neighbour open a basin, pixels with exactly one join it, and watershed
/// pixels (two or more distinct basins adjacent) join the basin of the
/// neighbour pixel closest in original color while making all adjacent
/// basins mutual neighbours.
pub fn flood(image: &Raster<Color>, gradient: &Raster<Gray>) -> SegmentGraph {
    let mut graph = SegmentGraph::new();
    let area = image.area();
    if area == 0 {
        return graph;
    }
    let w = image.w as isize;
    let offsets = [-w, -1, 1, w];

    let mut order: Vec<usize> = (0..area).collect();
    order.sort_by(|&a, &b| {
        gradient.data[a]
            .l
            .partial_cmp(&gradient.data[b].l)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut labels: Vec<i64> = vec![-1; area];
    let mut segment_ids: Vec<SegmentId> = Vec::new();
    let mut neigh_labels: Vec<i64> = Vec::with_capacity(4);

    for &i in &order {
        let pixel = Pixel::new(
            Position::new((i % image.w) as f64, (i / image.w) as f64),
            image.data[i],
        );

        neigh_labels.clear();
        for off in offsets {
            let j = i as isize + off;
            if image.are_neighbours(i as isize, j)
                && labels[j as usize] > -1
                && !neigh_labels.contains(&labels[j as usize])
            {
                neigh_labels.push(labels[j as usize]);
            }
        }

        match neigh_labels.len() {
            0 => {
                labels[i] = segment_ids.len() as i64;
                let mut segment = Segment::new();
                segment.add_pixel(pixel);
                segment_ids.push(graph.push(segment));
            }
            1 => {
                let label = neigh_labels[0];
                labels[i] = label;
                if let Some(seg) = graph.get_mut(segment_ids[label as usize]) {
                    seg.add_pixel(pixel);
                }
            }
            _ => {
                // watershed point, assign to the closest basin in color
                let mut dist_min = f64::MAX;
                let mut j_min = i;
                for off in offsets {
                    let j = i as isize + off;
                    if image.are_neighbours(i as isize, j) && labels[j as usize] > -1 {
                        let dist =
                            (image.data[i] - image.data[j as usize]).magnitude_squared();
                        if dist < dist_min {
                            dist_min = dist;
                            j_min = j as usize;
                        }
                    }
                }
                labels[i] = labels[j_min];
                if let Some(seg) = graph.get_mut(segment_ids[labels[j_min] as usize]) {
                    seg.add_pixel(pixel);
                }

                for k in 0..neigh_labels.len() - 1 {
                    for l in k + 1..neigh_labels.len() {
                        graph.add_adjacency(
                            segment_ids[neigh_labels[k] as usize],
                            segment_ids[neigh_labels[l] as usize],
                        );
                    }
                }
            }
        }
    }

    graph.calculate_mean_colors();
    graph
}

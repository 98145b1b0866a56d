//! A connected image region and its arrangement state.
//!
//! A segment owns its member pixels (original colors, positions relative to
//! the segment center once `relativize` has run), a mean color, the set of
//! adjacent segments, a 10-slot feature vector and the rigid placement used
//! during arrangement. The placement angle is split in two parts: the
//! `natural_angle` measured from the pixel distribution's principal axis,
//! and the arrangement `angle` applied on top of it by the arrangers.

use super::graph::SegmentId;
use super::shape::{CollisionShape, Placement};
use crate::color::Color;
use crate::features::{Feature, FeatureVector};
use crate::geometry::{Position, Rect};
use crate::pixel::Pixel;
use crate::raster::Raster;
use nalgebra::Matrix2;
use std::collections::BTreeSet;

/// Scale applied to every segment when it is placed on the canvas.
pub const PLACEMENT_SCALE: f64 = 0.75;

// sqrt(0.14848806049599 * n) is the spatial standard deviation of a disc of
// n pixels, so a disc scores a compactness of 1.
const DISC_VARIANCE_FACTOR: f64 = 0.14848806049599;

#[derive(Clone, Debug)]
pub struct Segment {
    pixels: Vec<Pixel>,
    color: Color,
    neighbours: BTreeSet<SegmentId>,
    features: FeatureVector,
    pos: Position,
    angle: f64,
    natural_angle: f64,
    scale: f64,
    shape: CollisionShape,
}

impl Default for Segment {
    fn default() -> Self {
        Self {
            pixels: Vec::new(),
            color: Color::default(),
            neighbours: BTreeSet::new(),
            features: FeatureVector::default(),
            pos: Position::default(),
            angle: 0.0,
            natural_angle: 0.0,
            scale: PLACEMENT_SCALE,
            shape: CollisionShape::default(),
        }
    }
}

impl Segment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pixel(&mut self, px: Pixel) {
        self.pixels.push(px);
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Number of member pixels.
    pub fn area(&self) -> usize {
        self.pixels.len()
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    pub fn features_mut(&mut self) -> &mut FeatureVector {
        &mut self.features
    }

    pub fn pos(&self) -> Position {
        self.pos
    }

    pub fn set_pos(&mut self, pos: Position) {
        self.pos = pos;
    }

    pub fn translate(&mut self, delta: Position) {
        self.pos += delta;
    }

    /// Arrangement rotation on top of the natural angle.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn natural_angle(&self) -> f64 {
        self.natural_angle
    }

    /// Combined rotation the segment currently represents.
    pub fn total_angle(&self) -> f64 {
        self.angle + self.natural_angle
    }

    pub fn set_total_angle(&mut self, total: f64) {
        self.angle = total - self.natural_angle;
    }

    pub fn rotate(&mut self, delta: f64) {
        self.angle += delta;
    }

    pub fn reset_angle(&mut self) {
        self.angle = 0.0;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn neighbours(&self) -> &BTreeSet<SegmentId> {
        &self.neighbours
    }

    pub fn add_neighbour(&mut self, id: SegmentId) {
        self.neighbours.insert(id);
    }

    pub fn remove_neighbour(&mut self, id: SegmentId) {
        self.neighbours.remove(&id);
    }

    /// Fold `other` into this segment: pixels are appended, the mean color
    /// is combined area-weighted and the neighbour sets are merged minus the
    /// two participating handles. Handle redirection in the rest of the
    /// graph is the caller's job.
    pub fn absorb(&mut self, other: Segment, self_id: SegmentId, other_id: SegmentId) {
        let total = (self.area() + other.area()) as f64;
        if total > 0.0 {
            self.color = (self.color * self.area() as f64 + other.color * other.area() as f64)
                / total;
        }
        self.pixels.extend(other.pixels);
        self.neighbours.extend(other.neighbours);
        self.neighbours.remove(&self_id);
        self.neighbours.remove(&other_id);
    }

    /// Mean color over the member pixels.
    pub fn calculate_color(&mut self) {
        if self.pixels.is_empty() {
            return;
        }
        let mut sum = Color::default();
        for px in &self.pixels {
            sum += px.col;
        }
        self.color = sum / self.pixels.len() as f64;
    }

    /// Move pixel positions into the segment-centered frame and remember the
    /// center as the initial placement position.
    pub fn relativize(&mut self) {
        if self.pixels.is_empty() {
            return;
        }
        let mut center = Position::default();
        for px in &self.pixels {
            center += px.pos;
        }
        center /= self.pixels.len() as f64;
        for px in self.pixels.iter_mut() {
            px.pos -= center;
        }
        self.pos = center;
    }

    /// Size, spatial spread, compactness and the principal-axis angle.
    /// Expects relativized pixels.
    pub fn calculate_spatial_features(&mut self) {
        let n = self.pixels.len();
        if n == 0 {
            return;
        }
        self.features[Feature::Size] = (n as f64).ln();

        let mut spatial_var = 0.0;
        let (mut cxx, mut cxy, mut cyy) = (0.0, 0.0, 0.0);
        for px in &self.pixels {
            spatial_var += px.pos.magnitude_squared();
            cxx += px.pos.x * px.pos.x;
            cxy += px.pos.x * px.pos.y;
            cyy += px.pos.y * px.pos.y;
        }
        let inv_n = 1.0 / n as f64;
        let spatial_sd = (spatial_var * inv_n).sqrt();
        self.features[Feature::SpatialSd] = spatial_sd;
        self.features[Feature::Compactness] = if spatial_sd > 0.0 {
            (DISC_VARIANCE_FACTOR * n as f64).sqrt() / spatial_sd
        } else {
            0.0
        };

        self.natural_angle = principal_axis_angle(cxx * inv_n, cxy * inv_n, cyy * inv_n);
        self.features[Feature::Angle] = self.natural_angle;
    }

    /// Mean-color components, chroma, hue and the color spread around the
    /// mean. Expects `calculate_color` to have run.
    pub fn calculate_color_features(&mut self) {
        let n = self.pixels.len();
        if n == 0 {
            return;
        }
        self.features[Feature::Lightness] = self.color.l99;
        self.features[Feature::GreenRed] = self.color.a99;
        self.features[Feature::YellowBlue] = self.color.b99;
        self.features[Feature::Chroma] = self.color.chroma();
        self.features[Feature::Hue] = self.color.hue();

        let mut color_var = 0.0;
        for px in &self.pixels {
            color_var += (px.col - self.color).magnitude_squared();
        }
        self.features[Feature::ColorSd] = (color_var / n as f64).sqrt();
    }

    /// Build the collision footprint from the relativized pixels.
    pub fn build_shape(&mut self) {
        self.shape = CollisionShape::from_points(self.pixels.iter().map(|px| px.pos));
    }

    pub fn placement(&self) -> Placement {
        Placement {
            pos: self.pos,
            angle: self.angle,
            scale: self.scale,
        }
    }

    pub fn collides(&self, other: &Segment) -> bool {
        self.shape
            .intersects(&self.placement(), &other.shape, &other.placement())
    }

    /// Bounds of the placed footprint.
    pub fn rect(&self) -> Rect {
        self.shape.bounding_rect(&self.placement())
    }

    /// Radius of the placed footprint.
    pub fn radius(&self) -> f64 {
        self.shape.radius() * self.scale
    }

    /// Paint the placed segment into `out`, shifted by `-offset`. With
    /// `average` set every pixel takes the segment's mean color, otherwise
    /// the original pixel colors are kept.
    pub fn copy_to_image(&self, out: &mut Raster<Color>, offset: Position, average: bool) {
        let (sin, cos) = self.angle.sin_cos();
        for px in &self.pixels {
            let scaled = px.pos * self.scale;
            let rotated = Position::new(
                scaled.x * cos - scaled.y * sin,
                scaled.x * sin + scaled.y * cos,
            );
            let world = self.pos + rotated - offset;
            let x = world.x.round() as isize;
            let y = world.y.round() as isize;
            if x >= 0 && y >= 0 && (x as usize) < out.w && (y as usize) < out.h {
                *out.at_mut(x as usize, y as usize) = if average { self.color } else { px.col };
            }
        }
    }
}

/// Angle of the dominant eigenvector of a 2×2 covariance matrix, oriented
/// into the upper half-plane so the result lies in [0, π].
fn principal_axis_angle(cxx: f64, cxy: f64, cyy: f64) -> f64 {
    let eigen = Matrix2::new(cxx, cxy, cxy, cyy).symmetric_eigen();
    let major = if eigen.eigenvalues[0] >= eigen.eigenvalues[1] {
        0
    } else {
        1
    };
    let mut v = eigen.eigenvectors.column(major).into_owned();
    if v[1] < 0.0 || (v[1] == 0.0 && v[0] < 0.0) {
        v = -v;
    }
    v[0].clamp(-1.0, 1.0).acos()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_segment(len: i64) -> Segment {
        let mut seg = Segment::new();
        for x in 0..len {
            for y in 0..2i64 {
                seg.add_pixel(Pixel::new(
                    Position::new(x as f64, y as f64),
                    Color::new(50.0, 1.0, 0.0),
                ));
            }
        }
        seg.calculate_color();
        seg.relativize();
        seg.calculate_spatial_features();
        seg.calculate_color_features();
        seg.build_shape();
        seg
    }

    #[test]
    fn relativize_centers_the_pixels() {
        let seg = bar_segment(9);
        let mut sum = Position::default();
        for px in seg.pixels() {
            sum += px.pos;
        }
        assert!(sum.magnitude() < 1e-9, "residual center {:?}", sum);
        assert!((seg.pos().x - 4.0).abs() < 1e-12);
        assert!((seg.pos().y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn horizontal_bar_has_horizontal_natural_angle() {
        let seg = bar_segment(15);
        // Principal axis along x, oriented into the upper half-plane.
        assert!(
            seg.natural_angle().abs() < 1e-6,
            "angle={}",
            seg.natural_angle()
        );
        assert!((seg.features()[Feature::Angle] - seg.natural_angle()).abs() < 1e-12);
    }

    #[test]
    fn disc_compactness_is_near_one() {
        let mut seg = Segment::new();
        let radius = 12i64;
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    seg.add_pixel(Pixel::new(
                        Position::new(x as f64, y as f64),
                        Color::new(40.0, 0.0, 0.0),
                    ));
                }
            }
        }
        seg.calculate_color();
        seg.relativize();
        seg.calculate_spatial_features();
        let c = seg.features()[Feature::Compactness];
        assert!((c - 1.0).abs() < 0.05, "compactness={c}");
    }

    #[test]
    fn elongated_shape_is_less_compact_than_a_disc() {
        let seg = bar_segment(40);
        assert!(
            seg.features()[Feature::Compactness] < 0.8,
            "compactness={}",
            seg.features()[Feature::Compactness]
        );
    }

    #[test]
    fn absorb_combines_color_area_weighted() {
        let a_id = SegmentId(0);
        let b_id = SegmentId(1);
        let mut a = Segment::new();
        let mut b = Segment::new();
        for i in 0..3 {
            a.add_pixel(Pixel::new(
                Position::new(i as f64, 0.0),
                Color::new(30.0, 0.0, 0.0),
            ));
        }
        b.add_pixel(Pixel::new(Position::new(0.0, 1.0), Color::new(70.0, 0.0, 0.0)));
        a.calculate_color();
        b.calculate_color();
        a.add_neighbour(b_id);
        b.add_neighbour(a_id);
        b.add_neighbour(SegmentId(5));

        a.absorb(b, a_id, b_id);
        assert_eq!(a.area(), 4);
        assert!((a.color().l99 - 40.0).abs() < 1e-12, "l99={}", a.color().l99);
        assert!(!a.neighbours().contains(&a_id));
        assert!(!a.neighbours().contains(&b_id));
        assert!(a.neighbours().contains(&SegmentId(5)));
    }

    #[test]
    fn total_angle_tracks_both_parts() {
        let mut seg = bar_segment(15);
        seg.rotate(0.5);
        assert!((seg.total_angle() - (seg.natural_angle() + 0.5)).abs() < 1e-12);
        seg.set_total_angle(1.0);
        assert!((seg.total_angle() - 1.0).abs() < 1e-12);
        seg.reset_angle();
        assert!((seg.total_angle() - seg.natural_angle()).abs() < 1e-12);
    }

    #[test]
    fn color_features_describe_the_mean_color() {
        let seg = bar_segment(9);
        assert!((seg.features()[Feature::Lightness] - 50.0).abs() < 1e-12);
        assert!((seg.features()[Feature::GreenRed] - 1.0).abs() < 1e-12);
        assert!((seg.features()[Feature::Chroma] - 1.0).abs() < 1e-12);
        assert!(seg.features()[Feature::ColorSd].abs() < 1e-12);
    }

    #[test]
    fn copy_to_image_paints_inside_bounds() {
        let seg = bar_segment(9);
        let mut out: Raster<Color> = Raster::new(16, 16);
        let mut painted = seg.clone();
        painted.set_pos(Position::new(8.0, 8.0));
        painted.copy_to_image(&mut out, Position::default(), true);
        let hits = out
            .data
            .iter()
            .filter(|c| c.magnitude_squared() > 0.0)
            .count();
        assert!(hits > 0, "nothing painted");
    }
}

//! Point-sampled collision shapes.
//!
//! A segment's shape is its pixel membership, stored as an occupancy grid
//! over the pixel positions relative to the segment center. Intersection
//! tests transform one shape's occupied cells into the other shape's local
//! frame and probe the occupancy with a one-cell tolerance, which matches
//! the point-sampled nature of the shapes without any polygon machinery.

use crate::geometry::{Position, Rect};

/// Rigid placement of a shape in the plane.
#[derive(Clone, Copy, Debug, Default)]
pub struct Placement {
    pub pos: Position,
    pub angle: f64,
    pub scale: f64,
}

#[derive(Clone, Debug, Default)]
pub struct CollisionShape {
    min_x: i64,
    min_y: i64,
    cols: usize,
    rows: usize,
    mask: Vec<bool>,
    /// Occupied cell centers in local coordinates, kept for fast iteration.
    cells: Vec<Position>,
    /// Radius of the smallest origin-centered disc covering all cells.
    radius: f64,
}

impl CollisionShape {
    /// Build from pixel positions relative to the segment center.
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Position> + Clone,
    {
        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;
        let mut any = false;
        for p in points.clone() {
            let (x, y) = (p.x.round() as i64, p.y.round() as i64);
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
            any = true;
        }
        if !any {
            return Self::default();
        }

        let cols = (max_x - min_x + 1) as usize;
        let rows = (max_y - min_y + 1) as usize;
        let mut mask = vec![false; cols * rows];
        let mut cells = Vec::new();
        let mut radius_sq = 0.0f64;
        for p in points {
            let (x, y) = (p.x.round() as i64, p.y.round() as i64);
            let i = (y - min_y) as usize * cols + (x - min_x) as usize;
            if !mask[i] {
                mask[i] = true;
                let cell = Position::new(x as f64, y as f64);
                radius_sq = radius_sq.max(cell.magnitude_squared());
                cells.push(cell);
            }
        }

        Self {
            min_x,
            min_y,
            cols,
            rows,
            mask,
            cells,
            radius: radius_sq.sqrt(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Occupancy probe in local coordinates, with a one-cell tolerance.
    fn contains_local(&self, p: Position) -> bool {
        let cx = p.x.round() as i64;
        let cy = p.y.round() as i64;
        for dy in -1..=1i64 {
            for dx in -1..=1i64 {
                let x = cx + dx - self.min_x;
                let y = cy + dy - self.min_y;
                if x >= 0
                    && y >= 0
                    && (x as usize) < self.cols
                    && (y as usize) < self.rows
                    && self.mask[y as usize * self.cols + x as usize]
                {
                    return true;
                }
            }
        }
        false
    }

    /// Whether two placed shapes overlap.
    pub fn intersects(
        &self,
        placement: &Placement,
        other: &CollisionShape,
        other_placement: &Placement,
    ) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        // Bounding-disc rejection; the +1 padding covers cell rounding.
        let dist = (placement.pos - other_placement.pos).magnitude();
        if dist > (self.radius + 1.0) * placement.scale + (other.radius + 1.0) * other_placement.scale
        {
            return false;
        }

        // Walk the sparser shape and probe the denser occupancy.
        if self.cells.len() <= other.cells.len() {
            probe(self, placement, other, other_placement)
        } else {
            probe(other, other_placement, self, placement)
        }
    }

    /// Axis-aligned bounds of the placed shape.
    pub fn bounding_rect(&self, placement: &Placement) -> Rect {
        let mut rect = Rect::empty();
        if self.is_empty() {
            rect.include(placement.pos);
            return rect;
        }
        let (sin, cos) = placement.angle.sin_cos();
        let corners = [
            Position::new(self.min_x as f64 - 0.5, self.min_y as f64 - 0.5),
            Position::new(self.min_x as f64 + self.cols as f64 - 0.5, self.min_y as f64 - 0.5),
            Position::new(self.min_x as f64 - 0.5, self.min_y as f64 + self.rows as f64 - 0.5),
            Position::new(
                self.min_x as f64 + self.cols as f64 - 0.5,
                self.min_y as f64 + self.rows as f64 - 0.5,
            ),
        ];
        for c in corners {
            let scaled = c * placement.scale;
            let rotated = Position::new(
                scaled.x * cos - scaled.y * sin,
                scaled.x * sin + scaled.y * cos,
            );
            rect.include(placement.pos + rotated);
        }
        rect
    }
}

fn probe(
    walker: &CollisionShape,
    walker_placement: &Placement,
    target: &CollisionShape,
    target_placement: &Placement,
) -> bool {
    let (sin_w, cos_w) = walker_placement.angle.sin_cos();
    let (sin_t, cos_t) = target_placement.angle.sin_cos();
    let inv_scale = if target_placement.scale.abs() > f64::EPSILON {
        1.0 / target_placement.scale
    } else {
        return false;
    };

    for &cell in &walker.cells {
        let scaled = cell * walker_placement.scale;
        let world = walker_placement.pos
            + Position::new(
                scaled.x * cos_w - scaled.y * sin_w,
                scaled.x * sin_w + scaled.y * cos_w,
            );
        let rel = world - target_placement.pos;
        // Inverse rotation of the target placement.
        let local = Position::new(rel.x * cos_t + rel.y * sin_t, -rel.x * sin_t + rel.y * cos_t)
            * inv_scale;
        if target.contains_local(local) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disc(radius: i64) -> CollisionShape {
        let mut points = Vec::new();
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    points.push(Position::new(x as f64, y as f64));
                }
            }
        }
        CollisionShape::from_points(points)
    }

    fn placed(x: f64, y: f64) -> Placement {
        Placement {
            pos: Position::new(x, y),
            angle: 0.0,
            scale: 1.0,
        }
    }

    #[test]
    fn overlapping_discs_intersect() {
        let a = disc(4);
        let b = disc(4);
        assert!(a.intersects(&placed(0.0, 0.0), &b, &placed(3.0, 0.0)));
    }

    #[test]
    fn distant_discs_do_not_intersect() {
        let a = disc(4);
        let b = disc(4);
        assert!(!a.intersects(&placed(0.0, 0.0), &b, &placed(30.0, 0.0)));
    }

    #[test]
    fn scale_shrinks_the_footprint() {
        let a = disc(4);
        let b = disc(4);
        let mut pa = placed(0.0, 0.0);
        let mut pb = placed(9.0, 0.0);
        pa.scale = 0.5;
        pb.scale = 0.5;
        assert!(!a.intersects(&pa, &b, &pb));
    }

    #[test]
    fn rotation_moves_an_elongated_shape_out_of_the_way() {
        // A thin horizontal bar reaching x=±10.
        let bar = CollisionShape::from_points(
            (-10..=10).map(|x| Position::new(x as f64, 0.0)).collect::<Vec<_>>(),
        );
        let dot = disc(1);
        let bar_at = placed(0.0, 0.0);
        let dot_at = placed(8.0, 0.0);
        assert!(bar.intersects(&bar_at, &dot, &dot_at));

        let mut rotated = bar_at;
        rotated.angle = std::f64::consts::FRAC_PI_2;
        assert!(!bar.intersects(&rotated, &dot, &dot_at));
    }

    #[test]
    fn empty_shape_never_collides() {
        let empty = CollisionShape::default();
        let d = disc(2);
        assert!(!empty.intersects(&placed(0.0, 0.0), &d, &placed(0.0, 0.0)));
    }

    #[test]
    fn bounding_rect_covers_the_scaled_shape() {
        let d = disc(4);
        let mut pl = placed(10.0, 20.0);
        pl.scale = 2.0;
        let rect = d.bounding_rect(&pl);
        assert!(rect.min.x <= 10.0 - 8.0 && rect.max.x >= 10.0 + 8.0);
        assert!(rect.min.y <= 20.0 - 8.0 && rect.max.y >= 20.0 + 8.0);
    }
}

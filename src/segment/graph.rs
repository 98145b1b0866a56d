//! Arena-backed adjacency graph of segments.
//!
//! Segments live in a slot vector and are addressed through stable
//! [`SegmentId`] handles; merging tombstones the absorbed slot instead of
//! shifting the arena. Neighbour sets are ordered so iteration, and with it
//! the whole merge cascade, is deterministic.

use super::segment::Segment;
use crate::color::Color;
use crate::features::{FeatureVector, FEATURE_COUNT};
use crate::geometry::{Position, Rect};
use serde::Serialize;

/// Stable handle into the segment arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct SegmentId(pub u32);

#[derive(Clone, Debug, Default)]
pub struct SegmentGraph {
    slots: Vec<Option<Segment>>,
}

impl SegmentGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) -> SegmentId {
        let id = SegmentId(self.slots.len() as u32);
        self.slots.push(Some(segment));
        id
    }

    /// Number of live segments.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(|s| s.is_none())
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.slots.get(id.0 as usize).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, id: SegmentId) -> Option<&mut Segment> {
        self.slots.get_mut(id.0 as usize).and_then(|s| s.as_mut())
    }

    /// Live handles in ascending order.
    pub fn ids(&self) -> Vec<SegmentId> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|_| SegmentId(i as u32)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (SegmentId, &Segment)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|seg| (SegmentId(i as u32), seg)))
    }

    /// Record that `a` and `b` touch in the source image.
    pub fn add_adjacency(&mut self, a: SegmentId, b: SegmentId) {
        if a == b {
            return;
        }
        if let Some(seg) = self.get_mut(a) {
            seg.add_neighbour(b);
        }
        if let Some(seg) = self.get_mut(b) {
            seg.add_neighbour(a);
        }
    }

    /// Fold `source` into `target` and redirect every neighbour reference.
    /// Stale handles are ignored.
    pub fn merge(&mut self, target: SegmentId, source: SegmentId) {
        if target == source {
            return;
        }
        let Some(src) = self.slots.get_mut(source.0 as usize).and_then(Option::take) else {
            return;
        };
        let src_neighbours: Vec<SegmentId> = src.neighbours().iter().copied().collect();
        let Some(tgt) = self.get_mut(target) else {
            // target vanished, drop the source as well
            return;
        };
        tgt.absorb(src, target, source);
        for n in src_neighbours {
            if n == target {
                continue;
            }
            if let Some(seg) = self.get_mut(n) {
                seg.remove_neighbour(source);
                seg.add_neighbour(target);
            }
        }
    }

    /// Recompute every mean color from the member pixels.
    pub fn calculate_mean_colors(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.calculate_color();
        }
    }

    /// One-time post-decomposition pass: center the pixels of every
    /// segment, extract its features and collision footprint, normalize the
    /// features across the graph and suggest the most discriminating
    /// feature pair for arrangement.
    pub fn prepare(&mut self) -> (usize, usize) {
        for slot in self.slots.iter_mut().flatten() {
            slot.relativize();
            slot.calculate_spatial_features();
            slot.calculate_color_features();
            slot.build_shape();
        }
        self.normalize_features();
        self.most_significant_features()
    }

    /// Rescale every feature component into [0, 1] across the graph.
    /// Components with zero spread collapse to 0.
    pub fn normalize_features(&mut self) {
        let mut live = self.slots.iter().flatten();
        let Some(first) = live.next() else {
            return;
        };
        let mut lo = *first.features();
        let mut hi = lo;
        for seg in live {
            lo = lo.compwise_min(seg.features());
            hi = hi.compwise_max(seg.features());
        }
        let range = hi - lo;
        for slot in self.slots.iter_mut().flatten() {
            let f = slot.features_mut();
            for i in 0..FEATURE_COUNT {
                f[i] = if range[i] > 0.0 {
                    (f[i] - lo[i]) / range[i]
                } else {
                    0.0
                };
            }
        }
    }

    /// Per-component feature variance across live segments.
    pub fn feature_variances(&self) -> FeatureVector {
        let n = self.len();
        if n == 0 {
            return FeatureVector::default();
        }
        let mut mean = FeatureVector::default();
        for (_, seg) in self.iter() {
            mean += *seg.features();
        }
        mean /= n as f64;
        let mut var = FeatureVector::default();
        for (_, seg) in self.iter() {
            let d = *seg.features() - mean;
            var += d * d;
        }
        var / n as f64
    }

    /// The two highest-variance features among the eight scalar ones; hue
    /// and angle wrap around and are excluded from the ranking. Ties keep
    /// the earlier index.
    pub fn most_significant_features(&self) -> (usize, usize) {
        let var = self.feature_variances();
        let (mut best, mut second) = if var[1] > var[0] { (1, 0) } else { (0, 1) };
        for i in 2..8 {
            if var[i] > var[best] {
                second = best;
                best = i;
            } else if var[i] > var[second] {
                second = i;
            }
        }
        (best, second)
    }

    // Aggregates over subsets; the whole-graph variants below defer to
    // these with all live handles.

    pub fn area_of(&self, ids: &[SegmentId]) -> usize {
        ids.iter()
            .filter_map(|&id| self.get(id))
            .map(Segment::area)
            .sum()
    }

    /// Area-weighted mean position.
    pub fn center_of(&self, ids: &[SegmentId]) -> Position {
        let mut sum = Position::default();
        let mut weight = 0.0;
        for &id in ids {
            if let Some(seg) = self.get(id) {
                sum += seg.pos() * seg.area() as f64;
                weight += seg.area() as f64;
            }
        }
        if weight > 0.0 {
            sum / weight
        } else {
            Position::default()
        }
    }

    /// Area-weighted mean x paired with the maximal y over the subset.
    pub fn top_center_of(&self, ids: &[SegmentId]) -> Position {
        let mut top = f64::NEG_INFINITY;
        let mut sum_x = 0.0;
        let mut weight = 0.0;
        for &id in ids {
            if let Some(seg) = self.get(id) {
                top = top.max(seg.pos().y);
                sum_x += seg.pos().x * seg.area() as f64;
                weight += seg.area() as f64;
            }
        }
        if weight > 0.0 {
            Position::new(sum_x / weight, top)
        } else {
            Position::default()
        }
    }

    /// Area-weighted mean x paired with the minimal y over the subset.
    pub fn bottom_center_of(&self, ids: &[SegmentId]) -> Position {
        let mut bottom = f64::INFINITY;
        let mut sum_x = 0.0;
        let mut weight = 0.0;
        for &id in ids {
            if let Some(seg) = self.get(id) {
                bottom = bottom.min(seg.pos().y);
                sum_x += seg.pos().x * seg.area() as f64;
                weight += seg.area() as f64;
            }
        }
        if weight > 0.0 {
            Position::new(sum_x / weight, bottom)
        } else {
            Position::default()
        }
    }

    /// Union of the placed footprint bounds over the subset.
    pub fn rect_of(&self, ids: &[SegmentId]) -> Rect {
        let mut rect = Rect::empty();
        for &id in ids {
            if let Some(seg) = self.get(id) {
                rect.union(&seg.rect());
            }
        }
        rect
    }

    pub fn translate_of(&mut self, ids: &[SegmentId], delta: Position) {
        for &id in ids {
            if let Some(seg) = self.get_mut(id) {
                seg.translate(delta);
            }
        }
    }

    pub fn total_area(&self) -> usize {
        self.iter().map(|(_, s)| s.area()).sum()
    }

    pub fn center(&self) -> Position {
        self.center_of(&self.ids())
    }

    pub fn top_center(&self) -> Position {
        self.top_center_of(&self.ids())
    }

    pub fn bottom_center(&self) -> Position {
        self.bottom_center_of(&self.ids())
    }

    pub fn rect(&self) -> Rect {
        self.rect_of(&self.ids())
    }

    pub fn translate(&mut self, delta: Position) {
        for slot in self.slots.iter_mut().flatten() {
            slot.translate(delta);
        }
    }

    pub fn reset_angles(&mut self) {
        for slot in self.slots.iter_mut().flatten() {
            slot.reset_angle();
        }
    }

    /// Mean color of the whole graph, area-weighted.
    pub fn mean_color(&self) -> Color {
        let mut sum = Color::default();
        let mut weight = 0.0;
        for (_, seg) in self.iter() {
            sum += seg.color() * seg.area() as f64;
            weight += seg.area() as f64;
        }
        if weight > 0.0 {
            sum / weight
        } else {
            Color::default()
        }
    }

    /// Drop a segment from the arena and from every neighbour set.
    pub fn remove(&mut self, id: SegmentId) {
        let Some(seg) = self.slots.get_mut(id.0 as usize).and_then(Option::take) else {
            return;
        };
        let neighbours: Vec<SegmentId> = seg.neighbours().iter().copied().collect();
        for n in neighbours {
            if let Some(other) = self.get_mut(n) {
                other.remove_neighbour(id);
            }
        }
    }
}

//! Result type of an arrangement run.

use crate::color::Color;
use crate::segment::SegmentId;

/// A finished arrangement: the detected background color plus the handles
/// of the placed segments. The placement geometry itself (position, angle,
/// scale) lives on the segments in the graph.
#[derive(Clone, Debug)]
pub struct Layout {
    pub background: Color,
    pub members: Vec<SegmentId>,
}

impl Layout {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

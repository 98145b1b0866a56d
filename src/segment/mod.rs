//! Segment model: regions, their collision shapes and the adjacency graph.

pub mod graph;
#[allow(clippy::module_inception)]
pub mod segment;
pub mod shape;

pub use graph::{SegmentGraph, SegmentId};
pub use segment::{Segment, PLACEMENT_SCALE};
pub use shape::{CollisionShape, Placement};

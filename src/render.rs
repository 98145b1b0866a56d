//! Rasterization of segment graphs for snapshots and layout renders.

use crate::color::Color;
use crate::geometry::Position;
use crate::raster::Raster;
use crate::segment::{SegmentGraph, SegmentId};

/// Paint every segment at its source-image pixel locations. Used for the
/// stage snapshots before the pixel positions are relativized. With
/// `average` set the mean color replaces the original pixel colors.
pub fn snapshot(graph: &SegmentGraph, w: usize, h: usize, average: bool) -> Raster<Color> {
    let mut out = Raster::new(w, h);
    for (_, seg) in graph.iter() {
        for px in seg.pixels() {
            let x = px.pos.x.round() as isize;
            let y = px.pos.y.round() as isize;
            if x >= 0 && y >= 0 && (x as usize) < w && (y as usize) < h {
                *out.at_mut(x as usize, y as usize) = if average { seg.color() } else { px.col };
            }
        }
    }
    out
}

/// Render the placed members onto a canvas sized to their joint bounds,
/// filled with the background color. Geometry comes from each segment's
/// placement (position, rotation, scale).
pub fn render_layout(
    graph: &SegmentGraph,
    members: &[SegmentId],
    background: Color,
    average: bool,
) -> Raster<Color> {
    let rect = graph.rect_of(members);
    if rect.is_empty() {
        return Raster::new(0, 0);
    }
    // one-pixel margin on every side
    let offset = rect.min - Position::new(1.0, 1.0);
    let w = rect.width().ceil() as usize + 3;
    let h = rect.height().ceil() as usize + 3;
    let mut out = Raster::new(w, h);
    out.fill(background);
    for &id in members {
        if let Some(seg) = graph.get(id) {
            seg.copy_to_image(&mut out, offset, average);
        }
    }
    out
}

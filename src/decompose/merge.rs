//! Graph simplification shared by both decomposers.
//!
//! `merge_similar` collapses adjacent segments whose mean colors are nearly
//! equal, `merge_small` folds undersized segments into their closest-color
//! neighbour, and `merge_until_stable` alternates the two until the segment
//! count stops changing.

use crate::segment::{SegmentGraph, SegmentId};
use std::collections::HashMap;

/// Alternate similarity and size merging until a fixed point.
pub fn merge_until_stable(graph: &mut SegmentGraph, epsilon_merge_squared: f64, min_pixels: usize) {
    loop {
        let before = graph.len();
        merge_similar(graph, epsilon_merge_squared);
        merge_small(graph, min_pixels);
        if graph.len() == before {
            break;
        }
    }
    log::debug!("merge loop settled at {} segments", graph.len());
}

/// Merge every adjacent pair whose mean-color squared distance is below the
/// threshold. Pairs are collected up front; merges that invalidate handles
/// in later pairs are resolved by following the redirection chain, so
/// transitive runs of similar segments collapse into one.
pub fn merge_similar(graph: &mut SegmentGraph, epsilon_merge_squared: f64) {
    let mut pairs: Vec<(SegmentId, SegmentId)> = Vec::new();
    for (id, seg) in graph.iter() {
        for &n in seg.neighbours() {
            if n <= id {
                continue;
            }
            if let Some(other) = graph.get(n) {
                if (other.color() - seg.color()).magnitude_squared() < epsilon_merge_squared {
                    pairs.push((id, n));
                }
            }
        }
    }

    let mut redirect: HashMap<SegmentId, SegmentId> = HashMap::new();
    for (a, b) in pairs {
        let target = resolve(&redirect, a);
        let source = resolve(&redirect, b);
        if target == source {
            continue;
        }
        graph.merge(target, source);
        redirect.insert(source, target);
    }
}

/// Merge every segment smaller than `min_pixels` into its nearest-in-color
/// neighbour. Segments without neighbours stay as they are.
pub fn merge_small(graph: &mut SegmentGraph, min_pixels: usize) {
    for id in graph.ids() {
        let best = {
            let Some(seg) = graph.get(id) else {
                continue; // merged away earlier in this pass
            };
            if seg.area() >= min_pixels {
                continue;
            }
            let mut best: Option<(SegmentId, f64)> = None;
            for &n in seg.neighbours() {
                if let Some(other) = graph.get(n) {
                    let d = (other.color() - seg.color()).magnitude_squared();
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((n, d));
                    }
                }
            }
            best
        };
        if let Some((target, _)) = best {
            graph.merge(target, id);
        }
    }
}

fn resolve(redirect: &HashMap<SegmentId, SegmentId>, mut id: SegmentId) -> SegmentId {
    while let Some(&next) = redirect.get(&id) {
        id = next;
    }
    id
}

//! Force-directed layout refinement.
//!
//! Every colliding pair pushes its two segments apart along the line
//! between their centers with a fixed-magnitude force; forces accumulate
//! over all pairs before any segment moves. The loop runs until a pass
//! finds no collision. A generous pass bound catches degenerate inputs
//! (for example two identical center positions, which produce a zero
//! force); overruns warn and keep the last state.

use crate::geometry::Position;
use crate::segment::{SegmentGraph, SegmentId};

/// Magnitude of the repulsive force per colliding pair.
const REPULSION: f64 = 2.0;
/// Angle step toward the repulsion normal in the rotating variant.
const ROTATION_STEP: f64 = 0.2;
/// Bail-out bound for the collision loops.
const MAX_PASSES: usize = 100_000;

fn collision_forces(graph: &SegmentGraph, members: &[SegmentId]) -> (Vec<Position>, usize) {
    let mut forces = vec![Position::default(); members.len()];
    let mut collisions = 0;
    for i in 0..members.len() {
        for j in i + 1..members.len() {
            let (Some(a), Some(b)) = (graph.get(members[i]), graph.get(members[j])) else {
                continue;
            };
            if a.collides(b) {
                collisions += 1;
                let force = (a.pos() - b.pos()).normalized() * REPULSION;
                forces[i] += force;
                forces[j] -= force;
            }
        }
    }
    (forces, collisions)
}

/// Translate-only refinement, runs until no pass detects a collision.
pub fn refine_simple(graph: &mut SegmentGraph, members: &[SegmentId]) {
    for pass in 0.. {
        let (forces, collisions) = collision_forces(graph, members);
        if collisions == 0 {
            break;
        }
        if pass >= MAX_PASSES {
            log::warn!("force-directed refinement did not settle after {pass} passes");
            break;
        }
        for (&id, &force) in members.iter().zip(forces.iter()) {
            if let Some(seg) = graph.get_mut(id) {
                seg.translate(force);
            }
        }
    }
}

/// Refinement with rotation: besides the translation, each collider turns
/// in steps toward the axis orthogonal to the pair's repulsion direction.
pub fn refine_with_rotation(graph: &mut SegmentGraph, members: &[SegmentId]) {
    for pass in 0.. {
        let mut forces = vec![Position::default(); members.len()];
        let mut angles = vec![0.0f64; members.len()];
        let mut collisions = 0;

        for i in 0..members.len() {
            for j in i + 1..members.len() {
                let (Some(a), Some(b)) = (graph.get(members[i]), graph.get(members[j])) else {
                    continue;
                };
                if !a.collides(b) {
                    continue;
                }
                collisions += 1;
                let force = (a.pos() - b.pos()).normalized() * REPULSION;
                forces[i] += force;
                forces[j] -= force;

                // angle of the axis orthogonal to the force
                let alpha = (-force.x / force.y).atan();
                if alpha.is_nan() {
                    continue; // coincident centers, no preferred direction
                }
                for (slot, seg) in [(i, a), (j, b)] {
                    if seg.total_angle() < alpha {
                        angles[slot] += ROTATION_STEP;
                    } else if seg.total_angle() > alpha {
                        angles[slot] -= ROTATION_STEP;
                    }
                }
            }
        }

        if collisions == 0 {
            break;
        }
        if pass >= MAX_PASSES {
            log::warn!("rotating refinement did not settle after {pass} passes");
            break;
        }
        for (k, &id) in members.iter().enumerate() {
            if let Some(seg) = graph.get_mut(id) {
                seg.translate(forces[k]);
                seg.rotate(angles[k]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::pixel::Pixel;
    use crate::segment::Segment;

    fn disc_segment(radius: i64, at: Position) -> Segment {
        let mut seg = Segment::new();
        for y in -radius..=radius {
            for x in -radius..=radius {
                if x * x + y * y <= radius * radius {
                    seg.add_pixel(Pixel::new(
                        Position::new(x as f64, y as f64),
                        Color::new(50.0, 0.0, 0.0),
                    ));
                }
            }
        }
        seg.calculate_color();
        seg.relativize();
        seg.calculate_spatial_features();
        seg.build_shape();
        seg.set_pos(at);
        seg
    }

    #[test]
    fn non_overlapping_input_terminates_immediately() {
        let mut graph = SegmentGraph::new();
        let a = graph.push(disc_segment(4, Position::new(0.0, 0.0)));
        let b = graph.push(disc_segment(4, Position::new(50.0, 0.0)));
        let members = [a, b];
        let before = (graph.get(a).unwrap().pos(), graph.get(b).unwrap().pos());
        refine_simple(&mut graph, &members);
        let after = (graph.get(a).unwrap().pos(), graph.get(b).unwrap().pos());
        assert_eq!(before, after, "positions moved without any collision");
    }

    #[test]
    fn overlapping_circles_are_separated() {
        let mut graph = SegmentGraph::new();
        let a = graph.push(disc_segment(6, Position::new(0.0, 0.0)));
        let b = graph.push(disc_segment(6, Position::new(4.0, 1.0)));
        let members = [a, b];
        refine_simple(&mut graph, &members);
        let sa = graph.get(a).unwrap();
        let sb = graph.get(b).unwrap();
        assert!(!sa.collides(sb), "segments still overlap after refinement");
        // they moved apart along the initial displacement direction
        assert!((sa.pos() - sb.pos()).magnitude() > 4.0);
    }

    #[test]
    fn rotating_refinement_also_separates() {
        let mut graph = SegmentGraph::new();
        let a = graph.push(disc_segment(5, Position::new(0.0, 0.0)));
        let b = graph.push(disc_segment(5, Position::new(3.0, 2.0)));
        let members = [a, b];
        refine_with_rotation(&mut graph, &members);
        let sa = graph.get(a).unwrap();
        let sb = graph.get(b).unwrap();
        assert!(!sa.collides(sb));
    }

    #[test]
    fn coincident_centers_do_not_hang() {
        // zero repulsion direction; the pass bound must end the loop
        let mut graph = SegmentGraph::new();
        let a = graph.push(disc_segment(3, Position::new(1.0, 1.0)));
        let b = graph.push(disc_segment(3, Position::new(1.0, 1.0)));
        refine_simple(&mut graph, &[a, b]);
    }
}

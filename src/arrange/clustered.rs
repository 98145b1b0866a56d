//! Cluster-first refinement: 2D mean-shift over the initial feature
//! placement, per-cluster circle or pile shaping, then a global pass that
//! spreads (circles) or packs (piles) the clusters.

use crate::geometry::{Position, Rect};
use crate::segment::{SegmentGraph, SegmentId};

/// Repulsion magnitude inside a cluster.
const REPULSION: f64 = 2.0;
/// Repulsion magnitude between whole clusters.
const CLUSTER_REPULSION: f64 = 5.0;
/// Convergence threshold on the squared mean-shift step.
const EPSILON_MODE: f64 = 0.01;
/// Bail-out bound for all collision loops.
const MAX_PASSES: usize = 100_000;
/// Horizontal gap between packed piles.
const PILE_GAP: f64 = 50.0;

/// Group the members by 2D mean-shift over their current positions. The
/// squared bandwidth is `total_area / 32`; clusters come back sorted
/// descending by member count, and clusters below `max(3, n/100)` members
/// are folded into the cluster with the closest segment pair.
pub fn cluster_by_position(graph: &SegmentGraph, members: &[SegmentId]) -> Vec<Vec<SegmentId>> {
    if members.is_empty() {
        return Vec::new();
    }
    let sigma = ((graph.area_of(members) >> 5) as f64).max(1.0);
    let positions: Vec<Position> = members
        .iter()
        .map(|&id| graph.get(id).map(|s| s.pos()).unwrap_or_default())
        .collect();

    // seek the mode each member converges to
    let mut modes: Vec<Position> = Vec::with_capacity(members.len());
    for &start in &positions {
        let mut center = start;
        for pass in 0.. {
            let mut sum = Position::default();
            let mut count = 0usize;
            for &other in &positions {
                if (other - center).magnitude_squared() < sigma {
                    sum += other;
                    count += 1;
                }
            }
            if count == 0 {
                break; // the center drifted away from every sample
            }
            let next = sum / count as f64;
            let step = next - center;
            center = next;
            if step.magnitude_squared() <= EPSILON_MODE {
                break;
            }
            if pass >= MAX_PASSES {
                log::warn!("mode seeking did not settle after {pass} passes");
                break;
            }
        }
        modes.push(center);
    }

    // merge modes within the bandwidth by relabeling
    let mut ids: Vec<usize> = (0..modes.len()).collect();
    for i in 0..modes.len() {
        for j in i + 1..modes.len() {
            if ids[i] != ids[j] && (modes[i] - modes[j]).magnitude_squared() < sigma {
                let old = ids[j];
                let new = ids[i];
                for id in ids.iter_mut() {
                    if *id == old {
                        *id = new;
                    }
                }
            }
        }
    }

    // group members per surviving label
    let mut clusters: Vec<Vec<SegmentId>> = Vec::new();
    for label in 0..ids.len() {
        if ids.contains(&label) {
            clusters.push(
                ids.iter()
                    .enumerate()
                    .filter(|&(_, &id)| id == label)
                    .map(|(k, _)| members[k])
                    .collect(),
            );
        }
    }
    clusters.sort_by(|a, b| b.len().cmp(&a.len()));

    // fold undersized clusters into their nearest neighbour
    let min_size = 3.max(members.len() / 100);
    while clusters.len() > 1 && clusters.last().map_or(false, |c| c.len() < min_size) {
        let smallest = clusters.pop().unwrap_or_default();
        let mut min_dist = f64::MAX;
        let mut min_i = 0;
        for (i, cluster) in clusters.iter().enumerate() {
            let d = min_distance(graph, cluster, &smallest);
            if d < min_dist {
                min_dist = d;
                min_i = i;
            }
        }
        clusters[min_i].extend(smallest);
    }

    log::debug!("{} clusters over {} segments", clusters.len(), members.len());
    clusters
}

/// Smallest center distance between any pair of segments across the two
/// clusters.
fn min_distance(graph: &SegmentGraph, a: &[SegmentId], b: &[SegmentId]) -> f64 {
    let mut min = f64::MAX;
    for &ia in a {
        for &ib in b {
            if let (Some(sa), Some(sb)) = (graph.get(ia), graph.get(ib)) {
                min = min.min((sa.pos() - sb.pos()).magnitude());
            }
        }
    }
    min
}

/// Shape one cluster into a rough circle: repulsion between colliders,
/// every segment re-angled to the tangent around the cluster centroid, and
/// a centripetal pull that decays over the first 10 passes. Runs at least
/// 10 passes and until no collision remains.
pub fn refine_circles(graph: &mut SegmentGraph, cluster: &[SegmentId]) {
    let mut pass = 0usize;
    loop {
        let (forces, collisions) = collision_forces(graph, cluster, Position::new(1.0, 1.0));
        for (&id, &force) in cluster.iter().zip(forces.iter()) {
            if let Some(seg) = graph.get_mut(id) {
                seg.translate(force);
            }
        }

        let center = graph.center_of(cluster);
        for &id in cluster {
            if let Some(seg) = graph.get_mut(id) {
                let spoke = seg.pos() - center;
                if spoke.x != 0.0 || spoke.y != 0.0 {
                    seg.set_total_angle((spoke.y / spoke.x).atan() + std::f64::consts::FRAC_PI_2);
                }
            }
        }

        if pass < 10 {
            let decay = 0.05 * (10 - pass) as f64;
            for &id in cluster {
                if let Some(seg) = graph.get_mut(id) {
                    let pull = (center - seg.pos()) * decay;
                    seg.translate(pull);
                }
            }
        }

        pass += 1;
        if collisions == 0 && pass >= 10 {
            break;
        }
        if pass >= MAX_PASSES {
            log::warn!("circle refinement did not settle after {pass} passes");
            break;
        }
    }
}

/// Shape one cluster into a pile: angles zeroed, repulsion damped to a
/// tenth horizontally, compaction toward the cluster's top center decaying
/// over 20 passes. Runs at least 20 passes and until no collision remains.
pub fn refine_piles(graph: &mut SegmentGraph, cluster: &[SegmentId]) {
    const MAX_COMPACT: usize = 20;
    for &id in cluster {
        if let Some(seg) = graph.get_mut(id) {
            seg.set_total_angle(0.0);
        }
    }

    let mut pass = 0usize;
    loop {
        let (forces, collisions) = collision_forces(graph, cluster, Position::new(0.1, 1.0));
        for (&id, &force) in cluster.iter().zip(forces.iter()) {
            if let Some(seg) = graph.get_mut(id) {
                seg.translate(force);
            }
        }

        if pass < MAX_COMPACT {
            let center = graph.top_center_of(cluster);
            let decay = (MAX_COMPACT - pass) as f64 / MAX_COMPACT as f64;
            for &id in cluster {
                if let Some(seg) = graph.get_mut(id) {
                    let pull = Position::new(
                        (center.x - seg.pos().x) * 0.9 * decay,
                        (center.y - seg.pos().y) * 0.05 * decay,
                    );
                    seg.translate(pull);
                }
            }
        }

        pass += 1;
        if collisions == 0 && pass >= MAX_COMPACT {
            break;
        }
        if pass >= MAX_PASSES {
            log::warn!("pile refinement did not settle after {pass} passes");
            break;
        }
    }
}

fn collision_forces(
    graph: &SegmentGraph,
    cluster: &[SegmentId],
    damping: Position,
) -> (Vec<Position>, usize) {
    let mut forces = vec![Position::default(); cluster.len()];
    let mut collisions = 0;
    for i in 0..cluster.len() {
        for j in i + 1..cluster.len() {
            let (Some(a), Some(b)) = (graph.get(cluster[i]), graph.get(cluster[j])) else {
                continue;
            };
            if a.collides(b) {
                collisions += 1;
                let force = (a.pos() - b.pos()).normalized() * REPULSION * damping;
                forces[i] += force;
                forces[j] -= force;
            }
        }
    }
    (forces, collisions)
}

/// Spread whole clusters apart as bounding circles: clusters closer than
/// 1.1 times the sum of their radii repel each other, with a decaying pull
/// toward the common area-weighted center during the first 10 passes (these
/// warm-up passes always count as unsettled).
pub fn refine_by_place(graph: &mut SegmentGraph, clusters: &[Vec<SegmentId>]) {
    let count = clusters.len();
    let mut centers: Vec<Position> = clusters.iter().map(|c| graph.center_of(c)).collect();
    let radii: Vec<f64> = clusters
        .iter()
        .map(|c| {
            let rect = graph.rect_of(c);
            rect.width().max(rect.height()) / 2.0
        })
        .collect();

    let mut pass = 0usize;
    loop {
        let mut forces = vec![Position::default(); count];
        let mut collisions = 0;
        for i in 0..count {
            for j in i + 1..count {
                if (centers[i] - centers[j]).magnitude() < (radii[i] + radii[j]) * 1.1 {
                    collisions += 1;
                    let force = (centers[i] - centers[j]).normalized() * CLUSTER_REPULSION;
                    forces[i] += force;
                    forces[j] -= force;
                }
            }
        }

        for (i, cluster) in clusters.iter().enumerate() {
            graph.translate_of(cluster, forces[i]);
            centers[i] = graph.center_of(cluster);
        }

        // area-weighted center of all clusters
        let mut center = Position::default();
        let mut size = 0usize;
        for (i, cluster) in clusters.iter().enumerate() {
            let area = graph.area_of(cluster);
            center += centers[i] * area as f64;
            size += area;
        }
        if size > 0 {
            center /= size as f64;
        }

        if pass < 10 {
            for (i, cluster) in clusters.iter().enumerate() {
                let pull = (center - centers[i]) * 0.05 * (10 - pass) as f64;
                graph.translate_of(cluster, pull);
                centers[i] = graph.center_of(cluster);
            }
            collisions += 1;
        }

        pass += 1;
        if collisions == 0 {
            break;
        }
        if pass >= MAX_PASSES {
            log::warn!("cluster placement did not settle after {pass} passes");
            break;
        }
    }
}

/// Pack clusters left to right, largest area first, bottom edges aligned at
/// y = 0 with a fixed gap between them.
pub fn refine_by_size(graph: &mut SegmentGraph, clusters: &[Vec<SegmentId>]) {
    let mut order: Vec<usize> = (0..clusters.len()).collect();
    order.sort_by(|&a, &b| graph.area_of(&clusters[b]).cmp(&graph.area_of(&clusters[a])));

    let mut x = 0.0;
    for i in order {
        let rect: Rect = graph.rect_of(&clusters[i]);
        if rect.is_empty() {
            continue;
        }
        let bottom_left = Position::new(rect.min.x, rect.max.y);
        graph.translate_of(&clusters[i], -bottom_left + Position::new(x, 0.0));
        x += rect.width() + PILE_GAP;
    }
}

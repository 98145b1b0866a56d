//! Segment arrangement: prepared graph in, placed layout out.

pub mod clustered;
pub mod force_directed;
pub mod layout;

pub use layout::Layout;

use crate::color::Color;
use crate::diagnostics::{ArrangementReport, TimingBreakdown};
use crate::features::{Feature, FeatureVector, FEATURE_COUNT};
use crate::raster::io::{save_color_raster, write_json_file, write_text_file};
use crate::render;
use crate::segment::{SegmentGraph, SegmentId};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

/// Index of the principal-axis angle feature; axis pairs touching it skip
/// the rotating refinement so the plotted angle stays meaningful.
const ANGLE_FEATURE: usize = Feature::Angle as usize;

/// Squared color distance under which a segment counts as background.
const BACKGROUND_EPSILON_SQUARED: f64 = 25.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClusterStyle {
    Circles,
    Piles,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForceDirectedParams {
    pub x_axis: usize,
    pub y_axis: usize,
    pub allow_rotation: bool,
}

impl Default for ForceDirectedParams {
    fn default() -> Self {
        Self {
            x_axis: 0,
            y_axis: 1,
            allow_rotation: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusteredParams {
    pub x_axis: usize,
    pub y_axis: usize,
    pub style: ClusterStyle,
}

impl Default for ClusteredParams {
    fn default() -> Self {
        Self {
            x_axis: 0,
            y_axis: 1,
            style: ClusterStyle::Circles,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Arranger {
    ForceDirected(ForceDirectedParams),
    Clustered(ClusteredParams),
}

impl Arranger {
    pub fn method_name(&self) -> &'static str {
        match self {
            Arranger::ForceDirected(_) => "forceDirected",
            Arranger::Clustered(_) => "clustered",
        }
    }

    fn axes(&self) -> (usize, usize) {
        match self {
            Arranger::ForceDirected(p) => (p.x_axis, p.y_axis),
            Arranger::Clustered(p) => (p.x_axis, p.y_axis),
        }
    }

    /// Arrange the graph in place and return the layout. The graph must be
    /// prepared and non-empty.
    pub fn run(&self, graph: &mut SegmentGraph) -> Result<Layout, String> {
        let (x_axis, y_axis) = self.axes();
        if x_axis >= FEATURE_COUNT || y_axis >= FEATURE_COUNT {
            return Err(format!("feature axes ({x_axis}, {y_axis}) out of range"));
        }

        let background_id = determine_background(graph)?;
        let background = graph
            .get(background_id)
            .map(|s| s.color())
            .unwrap_or_default();
        let members = remove_background(graph, background);
        let (sx, sy) = suggest_features(graph, &members);
        log::debug!(
            "background {:?} removed {} segments; suggested axes {} / {}",
            background_id,
            graph.len() - members.len(),
            Feature::label(sx),
            Feature::label(sy)
        );

        initialize_layout(graph, &members, x_axis, y_axis);
        for &id in &members {
            if let Some(seg) = graph.get_mut(id) {
                seg.reset_angle();
            }
        }

        match self {
            Arranger::ForceDirected(p) => {
                if p.allow_rotation {
                    force_directed::refine_with_rotation(graph, &members);
                } else {
                    force_directed::refine_simple(graph, &members);
                }
            }
            Arranger::Clustered(p) => {
                let clusters = clustered::cluster_by_position(graph, &members);
                match p.style {
                    ClusterStyle::Circles => {
                        for cluster in &clusters {
                            clustered::refine_circles(graph, cluster);
                        }
                        clustered::refine_by_place(graph, &clusters);
                    }
                    ClusterStyle::Piles => {
                        for cluster in &clusters {
                            clustered::refine_piles(graph, cluster);
                        }
                        clustered::refine_by_size(graph, &clusters);
                    }
                }
            }
        }

        Ok(Layout {
            background,
            members,
        })
    }

    /// Sweep every unordered feature pair, render each arrangement into
    /// `dir` and write the timing log plus a JSON report.
    pub fn run_batch(&self, graph: &mut SegmentGraph, dir: &Path) -> Result<(), String> {
        let background_id = determine_background(graph)?;
        let background = graph
            .get(background_id)
            .map(|s| s.color())
            .unwrap_or_default();
        let members = remove_background(graph, background);
        let (sx, sy) = suggest_features(graph, &members);

        let mut timings = TimingBreakdown::new();
        let mut log = format!(
            "feature suggestion:\n   x = {}\n   y = {}\n\n",
            Feature::label(sx),
            Feature::label(sy)
        );

        for i in 0..FEATURE_COUNT - 1 {
            for j in i + 1..FEATURE_COUNT {
                let mark = Instant::now();
                initialize_layout(graph, &members, i, j);
                for &id in &members {
                    if let Some(seg) = graph.get_mut(id) {
                        seg.reset_angle();
                    }
                }
                let pair = format!("{}_{}", Feature::label(i), Feature::label(j));
                log.push_str(&format!(
                    "arrangement x = {}, y = {}\n",
                    Feature::label(i),
                    Feature::label(j)
                ));

                match self {
                    Arranger::ForceDirected(_) => {
                        if i != ANGLE_FEATURE && j != ANGLE_FEATURE {
                            force_directed::refine_with_rotation(graph, &members);
                        } else {
                            force_directed::refine_simple(graph, &members);
                        }
                        timings.record(&pair, mark);
                        let image = render::render_layout(graph, &members, background, false);
                        save_color_raster(&image, &dir.join(format!("{pair}.png")))?;
                    }
                    Arranger::Clustered(_) => {
                        let clusters = clustered::cluster_by_position(graph, &members);

                        for cluster in &clusters {
                            clustered::refine_circles(graph, cluster);
                        }
                        clustered::refine_by_place(graph, &clusters);
                        timings.record(&format!("{pair}_circles"), mark);
                        let image = render::render_layout(graph, &members, background, false);
                        save_color_raster(&image, &dir.join(format!("{pair}_circles.png")))?;

                        let mark = Instant::now();
                        initialize_layout(graph, &members, i, j);
                        for &id in &members {
                            if let Some(seg) = graph.get_mut(id) {
                                seg.reset_angle();
                            }
                        }
                        for cluster in &clusters {
                            clustered::refine_piles(graph, cluster);
                        }
                        clustered::refine_by_size(graph, &clusters);
                        timings.record(&format!("{pair}_piles"), mark);
                        let image = render::render_layout(graph, &members, background, false);
                        save_color_raster(&image, &dir.join(format!("{pair}_piles.png")))?;
                    }
                }
            }
        }

        log.push_str(&timings.to_log());
        write_text_file(&dir.join("log.txt"), &log)?;

        let report = ArrangementReport {
            method: self.method_name().to_string(),
            feature_x: Feature::label(sx).to_string(),
            feature_y: Feature::label(sy).to_string(),
            removed_segments: graph.len() - members.len(),
            placed_segments: members.len(),
            timings,
        };
        write_json_file(&dir.join("report.json"), &report)
    }
}

/// Pick the background segment: the one with the most neighbours or the
/// largest area. When the two candidates differ, the one whose statistic
/// deviates more from its mean (in standard deviations) wins.
pub fn determine_background(graph: &SegmentGraph) -> Result<SegmentId, String> {
    let ids = graph.ids();
    if ids.is_empty() {
        return Err("cannot arrange an empty segment graph".to_string());
    }

    let mut by_neighbours = ids[0];
    let mut max_neighbours = 0usize;
    let mut by_area = ids[0];
    let mut max_area = 0usize;
    for (id, seg) in graph.iter() {
        if seg.neighbours().len() > max_neighbours {
            max_neighbours = seg.neighbours().len();
            by_neighbours = id;
        }
        if seg.area() > max_area {
            max_area = seg.area();
            by_area = id;
        }
    }
    if by_neighbours == by_area {
        return Ok(by_neighbours);
    }

    let n = ids.len() as f64;
    let mut mean_neighbours = 0.0;
    let mut mean_area = 0.0;
    for (_, seg) in graph.iter() {
        mean_neighbours += seg.neighbours().len() as f64;
        mean_area += seg.area() as f64;
    }
    mean_neighbours /= n;
    mean_area /= n;

    let mut var_neighbours = 0.0;
    let mut var_area = 0.0;
    for (_, seg) in graph.iter() {
        var_neighbours += (seg.neighbours().len() as f64 - mean_neighbours).powi(2);
        var_area += (seg.area() as f64 - mean_area).powi(2);
    }
    let sigma_neighbours = (var_neighbours / n).sqrt();
    let sigma_area = (var_area / n).sqrt();

    let z_neighbours = if sigma_neighbours > 0.0 {
        (max_neighbours as f64 - mean_neighbours).abs() / sigma_neighbours
    } else {
        0.0
    };
    let z_area = if sigma_area > 0.0 {
        (max_area as f64 - mean_area).abs() / sigma_area
    } else {
        0.0
    };

    Ok(if z_neighbours > z_area {
        by_neighbours
    } else {
        by_area
    })
}

/// Everything that does not look like the background color stays.
pub fn remove_background(graph: &SegmentGraph, background: Color) -> Vec<SegmentId> {
    graph
        .iter()
        .filter(|(_, seg)| {
            (seg.color() - background).magnitude_squared() > BACKGROUND_EPSILON_SQUARED
        })
        .map(|(id, _)| id)
        .collect()
}

/// Scatter the members over a square whose edge grows with the total pixel
/// area, using two normalized features as coordinates.
pub fn initialize_layout(graph: &mut SegmentGraph, members: &[SegmentId], x_axis: usize, y_axis: usize) {
    let edge_length = ((graph.area_of(members) * 4) as f64).sqrt();
    for &id in members {
        if let Some(seg) = graph.get_mut(id) {
            let pos = crate::geometry::Position::new(
                seg.features()[x_axis] * edge_length,
                seg.features()[y_axis] * edge_length,
            );
            seg.set_pos(pos);
        }
    }
}

/// Variance ranking over the members, scalar features only.
fn suggest_features(graph: &SegmentGraph, members: &[SegmentId]) -> (usize, usize) {
    let n = members.len();
    if n == 0 {
        return (0, 1);
    }
    let mut mean = FeatureVector::default();
    for &id in members {
        if let Some(seg) = graph.get(id) {
            mean += *seg.features();
        }
    }
    mean /= n as f64;
    let mut var = FeatureVector::default();
    for &id in members {
        if let Some(seg) = graph.get(id) {
            let d = *seg.features() - mean;
            var += d * d;
        }
    }
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

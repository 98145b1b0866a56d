mod common;

use collage::prelude::*;
use common::synthetic_image::vertical_bands;
use std::fs;
use std::path::{Path, PathBuf};

const COLORS: [(u8, u8, u8); 5] = [
    (200, 40, 40),
    (40, 180, 60),
    (40, 40, 200),
    (250, 250, 80),
    (150, 60, 200),
];

/// Bands image decomposed and prepared, ready for arrangement.
fn prepared_graph() -> SegmentGraph {
    let image = vertical_bands(40, 12, &COLORS);
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 5,
        ..MeanShiftParams::default()
    };
    let mut graph = Decomposer::MeanShift(params).run(&image).unwrap();
    graph.prepare();
    graph
}

/// Unequal bands so every scalar feature separates the two non-background
/// segments; keeps the batch sweep off degenerate coincident placements.
fn uneven_bands_graph() -> SegmentGraph {
    let mut image: Raster<Color> = Raster::new(48, 12);
    for y in 0..12 {
        for x in 0..48 {
            *image.at_mut(x, y) = if x < 6 {
                Color::from_rgb(200, 40, 40)
            } else if x < 18 {
                Color::from_rgb(40, 180, 60)
            } else {
                Color::from_rgb(40, 40, 200)
            };
        }
    }
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 5,
        ..MeanShiftParams::default()
    };
    let mut graph = Decomposer::MeanShift(params).run(&image).unwrap();
    graph.prepare();
    graph
}

/// Fresh per-test output directory under the system temp dir.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("collage_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn png_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".png"))
        .collect();
    names.sort();
    names
}

fn assert_no_overlap(graph: &SegmentGraph, members: &[SegmentId]) {
    for i in 0..members.len() {
        for j in i + 1..members.len() {
            let a = graph.get(members[i]).unwrap();
            let b = graph.get(members[j]).unwrap();
            assert!(
                !a.collides(b),
                "members {:?} and {:?} overlap at {:?} / {:?}",
                members[i],
                members[j],
                a.pos(),
                b.pos()
            );
        }
    }
}

#[test]
fn force_directed_layout_has_no_overlaps() {
    let mut graph = prepared_graph();
    let layout = Arranger::ForceDirected(ForceDirectedParams::default())
        .run(&mut graph)
        .unwrap();
    assert!(!layout.is_empty(), "no members were placed");
    assert_no_overlap(&graph, &layout.members);
}

#[test]
fn force_directed_without_rotation_also_separates() {
    let mut graph = prepared_graph();
    let params = ForceDirectedParams {
        allow_rotation: false,
        ..ForceDirectedParams::default()
    };
    let layout = Arranger::ForceDirected(params).run(&mut graph).unwrap();
    assert_no_overlap(&graph, &layout.members);
    // without rotation every member keeps its natural orientation
    for &id in &layout.members {
        assert_eq!(graph.get(id).unwrap().angle(), 0.0);
    }
}

#[test]
fn background_is_excluded_from_the_members() {
    let mut graph = prepared_graph();
    let total = graph.len();
    let layout = Arranger::ForceDirected(ForceDirectedParams::default())
        .run(&mut graph)
        .unwrap();
    assert!(layout.members.len() < total, "background was not removed");
    for &id in &layout.members {
        let seg = graph.get(id).unwrap();
        assert!(
            (seg.color() - layout.background).magnitude_squared() > 25.0,
            "member {id:?} looks like the background"
        );
    }
}

#[test]
fn clustered_circles_produce_a_collision_free_layout() {
    let mut graph = prepared_graph();
    let params = ClusteredParams {
        style: ClusterStyle::Circles,
        ..ClusteredParams::default()
    };
    let layout = Arranger::Clustered(params).run(&mut graph).unwrap();
    assert!(!layout.is_empty());
    assert_no_overlap(&graph, &layout.members);
}

#[test]
fn clustered_piles_zero_the_total_angles() {
    let mut graph = prepared_graph();
    let params = ClusteredParams {
        style: ClusterStyle::Piles,
        ..ClusteredParams::default()
    };
    let layout = Arranger::Clustered(params).run(&mut graph).unwrap();
    assert!(!layout.is_empty());
    for &id in &layout.members {
        let seg = graph.get(id).unwrap();
        assert!(
            seg.total_angle().abs() < 1e-9,
            "member {id:?} kept total angle {}",
            seg.total_angle()
        );
    }
}

#[test]
fn arranging_an_empty_graph_fails() {
    let mut graph = SegmentGraph::new();
    let err = Arranger::ForceDirected(ForceDirectedParams::default())
        .run(&mut graph)
        .unwrap_err();
    assert!(err.contains("empty"), "unexpected error {err}");
}

#[test]
fn force_directed_sweep_renders_every_feature_pair() {
    let mut graph = uneven_bands_graph();
    let dir = scratch_dir("force_directed_sweep");
    Arranger::ForceDirected(ForceDirectedParams::default())
        .run_batch(&mut graph, &dir)
        .unwrap();

    let names = png_names(&dir);
    assert_eq!(names.len(), 45, "one render per unordered pair, got {names:?}");
    assert!(names.contains(&"size_spatial_sd.png".to_string()));
    assert!(names.contains(&"hue_angle.png".to_string()));

    let log = fs::read_to_string(dir.join("log.txt")).unwrap();
    assert!(log.contains("feature suggestion"), "log was {log:?}");
    let report = fs::read_to_string(dir.join("report.json")).unwrap();
    assert!(report.contains("\"method\": \"forceDirected\""), "report was {report}");
    assert!(report.contains("\"placedSegments\": 2"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn clustered_sweep_renders_both_styles_per_pair() {
    let mut graph = uneven_bands_graph();
    let dir = scratch_dir("clustered_sweep");
    Arranger::Clustered(ClusteredParams::default())
        .run_batch(&mut graph, &dir)
        .unwrap();

    let names = png_names(&dir);
    assert_eq!(names.len(), 90, "circles and piles per pair, got {}", names.len());
    assert!(names.contains(&"size_spatial_sd_circles.png".to_string()));
    assert!(names.contains(&"size_spatial_sd_piles.png".to_string()));
    assert!(dir.join("report.json").is_file());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn rendered_layout_contains_every_member_color_family() {
    let mut graph = prepared_graph();
    let layout = Arranger::ForceDirected(ForceDirectedParams::default())
        .run(&mut graph)
        .unwrap();
    let image = collage::render::render_layout(&graph, &layout.members, layout.background, true);
    assert!(image.area() > 0, "empty canvas");
    // every member's mean color must show up somewhere on the canvas
    for &id in &layout.members {
        let target = graph.get(id).unwrap().color();
        assert!(
            image
                .data
                .iter()
                .any(|c| (*c - target).magnitude_squared() < 1.0),
            "mean color of {id:?} not found in the render"
        );
    }
}

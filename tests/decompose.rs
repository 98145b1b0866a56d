mod common;

use collage::prelude::*;
use common::synthetic_image::{two_tone, uniform, vertical_bands};
use std::fs;
use std::path::PathBuf;

const RED: (u8, u8, u8) = (200, 40, 40);
const BLUE: (u8, u8, u8) = (40, 40, 200);
const GREEN: (u8, u8, u8) = (40, 180, 60);

/// Fresh per-test output directory under the system temp dir.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("collage_{name}_{}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

fn assert_symmetric(graph: &SegmentGraph) {
    for (id, seg) in graph.iter() {
        for &n in seg.neighbours() {
            assert_ne!(n, id, "segment {id:?} is its own neighbour");
            let other = graph
                .get(n)
                .unwrap_or_else(|| panic!("dangling neighbour {n:?} of {id:?}"));
            assert!(
                other.neighbours().contains(&id),
                "edge {id:?} -> {n:?} is not mirrored"
            );
        }
    }
}

#[test]
fn mean_shift_splits_the_two_tone_image_into_two_segments() {
    let image = two_tone(4, 4, RED, BLUE);
    let params = MeanShiftParams {
        sigma_pos: 2.0,
        sigma_col: 8.0,
        epsilon_merge: 1.0,
        min_size: 1,
        ..MeanShiftParams::default()
    };
    let graph = Decomposer::MeanShift(params).run(&image).unwrap();

    assert_eq!(graph.len(), 2, "expected exactly two segments");
    let ids = graph.ids();
    for &id in &ids {
        let seg = graph.get(id).unwrap();
        assert_eq!(seg.area(), 8, "segment {id:?} has area {}", seg.area());
    }
    assert!(graph.get(ids[0]).unwrap().neighbours().contains(&ids[1]));
    assert!(graph.get(ids[1]).unwrap().neighbours().contains(&ids[0]));
}

#[test]
fn mean_shift_conserves_pixel_area() {
    let image = vertical_bands(24, 12, &[RED, GREEN, BLUE]);
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 10,
        ..MeanShiftParams::default()
    };
    let graph = Decomposer::MeanShift(params).run(&image).unwrap();
    assert_eq!(graph.total_area(), 24 * 12);
    assert_symmetric(&graph);
}

#[test]
fn watershed_conserves_pixel_area() {
    let image = vertical_bands(24, 12, &[RED, GREEN, BLUE]);
    let params = WatershedParams {
        gaussian_radius: 2,
        min_size: 10,
        epsilon_merge: 3.0,
    };
    let graph = Decomposer::Watershed(params).run(&image).unwrap();
    assert_eq!(graph.total_area(), 24 * 12);
    assert_symmetric(&graph);
}

#[test]
fn watershed_keeps_a_uniform_image_in_one_basin() {
    let image = uniform(16, 16, GREEN);
    let params = WatershedParams {
        gaussian_radius: 3,
        min_size: 10,
        epsilon_merge: 3.0,
    };
    let graph = Decomposer::Watershed(params).run(&image).unwrap();
    assert_eq!(graph.len(), 1, "uniform input must stay one basin");
    assert_eq!(graph.total_area(), 256);
}

#[test]
fn zero_area_image_gives_an_empty_graph() {
    let image: Raster<Color> = Raster::new(0, 0);
    let graph = Decomposer::MeanShift(MeanShiftParams::default())
        .run(&image)
        .unwrap();
    assert!(graph.is_empty());
}

#[test]
fn cancellation_discards_the_whole_run() {
    let image = two_tone(8, 8, RED, BLUE);
    let control = FilterControl::new();
    control.cancel();
    let result = Decomposer::MeanShift(MeanShiftParams::default())
        .run_with_control(&image, &control)
        .unwrap();
    assert!(result.is_none());
}

#[test]
fn prepare_normalizes_features_and_suggests_scalar_axes() {
    let image = vertical_bands(32, 12, &[RED, GREEN, BLUE, (250, 250, 80)]);
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 5,
        ..MeanShiftParams::default()
    };
    let mut graph = Decomposer::MeanShift(params).run(&image).unwrap();
    assert!(graph.len() >= 2, "need several segments, got {}", graph.len());

    let (fx, fy) = graph.prepare();
    assert!(fx < 8 && fy < 8, "suggested cyclic axes ({fx}, {fy})");
    assert_ne!(fx, fy);
    for (id, seg) in graph.iter() {
        for i in 0..10 {
            let v = seg.features()[i];
            assert!(
                (0.0..=1.0).contains(&v),
                "feature {i} of {id:?} is {v} after normalization"
            );
        }
    }
}

#[test]
fn mean_shift_batch_writes_the_diagnostic_bundle() {
    let image = vertical_bands(24, 12, &[RED, GREEN, BLUE]);
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 10,
        ..MeanShiftParams::default()
    };
    let dir = scratch_dir("mean_shift_batch");
    let batch = Decomposer::MeanShift(params).run_batch(&image, &dir).unwrap();
    let plain = Decomposer::MeanShift(params).run(&image).unwrap();
    assert_eq!(batch.len(), plain.len(), "batch graph differs from run");
    assert_eq!(batch.total_area(), plain.total_area());

    for name in [
        "original.png",
        "filtered.png",
        "labeled.png",
        "merged.png",
        "log.txt",
        "report.json",
    ] {
        assert!(dir.join(name).is_file(), "{name} missing from the bundle");
    }
    let report = fs::read_to_string(dir.join("report.json")).unwrap();
    assert!(report.contains("\"method\": \"meanShift\""), "report was {report}");
    assert!(report.contains("\"mergedSegments\""));
    let log = fs::read_to_string(dir.join("log.txt")).unwrap();
    assert!(log.contains("segments:"), "log was {log:?}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn watershed_batch_names_its_snapshots_after_the_stages() {
    let image = vertical_bands(24, 12, &[RED, GREEN, BLUE]);
    let params = WatershedParams {
        gaussian_radius: 2,
        min_size: 10,
        epsilon_merge: 3.0,
    };
    let dir = scratch_dir("watershed_batch");
    let batch = Decomposer::Watershed(params).run_batch(&image, &dir).unwrap();
    assert_eq!(batch.total_area(), 24 * 12);

    for name in [
        "original.png",
        "blurred.png",
        "gradient.png",
        "basins.png",
        "merged.png",
        "log.txt",
        "report.json",
    ] {
        assert!(dir.join(name).is_file(), "{name} missing from the bundle");
    }
    let report = fs::read_to_string(dir.join("report.json")).unwrap();
    assert!(report.contains("\"method\": \"watershed\""), "report was {report}");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn merged_graph_is_stable_under_another_similarity_pass() {
    let image = vertical_bands(24, 12, &[RED, GREEN, BLUE]);
    let params = MeanShiftParams {
        sigma_pos: 4.0,
        min_size: 10,
        ..MeanShiftParams::default()
    };
    let mut graph = Decomposer::MeanShift(params).run(&image).unwrap();
    let before = graph.len();
    collage::decompose::merge::merge_similar(
        &mut graph,
        params.epsilon_merge * params.epsilon_merge,
    );
    assert_eq!(graph.len(), before, "merge_similar was not idempotent");
}

//! Image decomposition: raster in, segment graph out.
//!
//! Both decomposers share the trailing merge loop and the batch plumbing;
//! they differ in how the initial over-segmentation is produced.

pub mod control;
pub mod mean_shift;
pub mod merge;
pub mod watershed;

pub use control::{FilterControl, FilterProgress};
pub use mean_shift::MeanShiftParams;
pub use watershed::WatershedParams;

use crate::color::{Color, Gray};
use crate::diagnostics::{DecompositionReport, TimingBreakdown};
use crate::raster::io::{save_color_raster, save_gray_raster, write_json_file, write_text_file};
use crate::raster::Raster;
use crate::render;
use crate::segment::SegmentGraph;
use std::path::Path;
use std::time::Instant;

#[derive(Clone, Copy, Debug)]
pub enum Decomposer {
    MeanShift(MeanShiftParams),
    Watershed(WatershedParams),
}

/// Everything one decomposition produces; the intermediates are only
/// populated for batch runs that write snapshots.
struct Outcome {
    graph: SegmentGraph,
    initial_segments: usize,
    timings: TimingBreakdown,
    smoothed: Option<Raster<Color>>,
    gradient: Option<Raster<Gray>>,
    /// Mean-color snapshot of the pre-merge segmentation.
    labeled: Option<Raster<Color>>,
}

impl Decomposer {
    pub fn method_name(&self) -> &'static str {
        match self {
            Decomposer::MeanShift(_) => "meanShift",
            Decomposer::Watershed(_) => "watershed",
        }
    }

    /// Decompose `image` into a merged segment graph. A zero-area image
    /// yields an empty graph.
    pub fn run(&self, image: &Raster<Color>) -> Result<SegmentGraph, String> {
        match self.run_stages(image, &FilterControl::new(), false)? {
            Some(outcome) => Ok(outcome.graph),
            None => Err("decomposition cancelled without a controller".to_string()),
        }
    }

    /// Like [`run`](Self::run), but cancellable; `Ok(None)` means the run
    /// was cancelled and no graph was produced.
    pub fn run_with_control(
        &self,
        image: &Raster<Color>,
        control: &FilterControl,
    ) -> Result<Option<SegmentGraph>, String> {
        Ok(self.run_stages(image, control, false)?.map(|o| o.graph))
    }

    /// Decompose and write the diagnostic bundle (stage snapshots, text log,
    /// JSON report) into `dir`. The returned graph is identical to `run`.
    pub fn run_batch(&self, image: &Raster<Color>, dir: &Path) -> Result<SegmentGraph, String> {
        let Some(outcome) = self.run_stages(image, &FilterControl::new(), true)? else {
            return Err("decomposition cancelled without a controller".to_string());
        };

        save_color_raster(image, &dir.join("original.png"))?;
        if let Some(smoothed) = &outcome.smoothed {
            let name = match self {
                Decomposer::MeanShift(_) => "filtered.png",
                Decomposer::Watershed(_) => "blurred.png",
            };
            save_color_raster(smoothed, &dir.join(name))?;
        }
        if let Some(gradient) = &outcome.gradient {
            save_gray_raster(&scaled_for_display(gradient), &dir.join("gradient.png"))?;
        }
        if let Some(labeled) = &outcome.labeled {
            let name = match self {
                Decomposer::MeanShift(_) => "labeled.png",
                Decomposer::Watershed(_) => "basins.png",
            };
            save_color_raster(labeled, &dir.join(name))?;
        }
        let merged = render::snapshot(&outcome.graph, image.w, image.h, true);
        save_color_raster(&merged, &dir.join("merged.png"))?;

        let params = self.params_json()?;
        let mut log = format!(
            "{} decomposition of a {}x{} image\nparams: {}\n",
            self.method_name(),
            image.w,
            image.h,
            params
        );
        log.push_str(&outcome.timings.to_log());
        log.push_str(&format!(
            "segments: {} initial, {} merged\n",
            outcome.initial_segments,
            outcome.graph.len()
        ));
        write_text_file(&dir.join("log.txt"), &log)?;

        let report = DecompositionReport {
            method: self.method_name().to_string(),
            params,
            image_width: image.w,
            image_height: image.h,
            initial_segments: outcome.initial_segments,
            merged_segments: outcome.graph.len(),
            timings: outcome.timings,
        };
        write_json_file(&dir.join("report.json"), &report)?;

        Ok(outcome.graph)
    }

    fn params_json(&self) -> Result<serde_json::Value, String> {
        match self {
            Decomposer::MeanShift(p) => serde_json::to_value(p),
            Decomposer::Watershed(p) => serde_json::to_value(p),
        }
        .map_err(|e| format!("Failed to serialize params: {e}"))
    }

    fn run_stages(
        &self,
        image: &Raster<Color>,
        control: &FilterControl,
        keep_intermediates: bool,
    ) -> Result<Option<Outcome>, String> {
        let mut timings = TimingBreakdown::new();
        let mark = Instant::now();

        if image.area() == 0 {
            log::debug!("empty image, returning empty graph");
            return Ok(Some(Outcome {
                graph: SegmentGraph::new(),
                initial_segments: 0,
                timings,
                smoothed: None,
                gradient: None,
                labeled: None,
            }));
        }

        match self {
            Decomposer::MeanShift(params) => {
                params.validate()?;
                let Some(filtered) = mean_shift::filter(image, params, control) else {
                    log::debug!("mean-shift filter cancelled");
                    return Ok(None);
                };
                let mark = timings.record("image filtered", mark);
                log::debug!("mean-shift filter done");

                let mut graph = mean_shift::label_regions(image, &filtered, params.epsilon_merge);
                let initial_segments = graph.len();
                let mark = timings.record("regions labeled", mark);
                log::debug!("region growing produced {initial_segments} segments");
                let labeled = keep_intermediates
                    .then(|| render::snapshot(&graph, image.w, image.h, true));

                merge::merge_until_stable(
                    &mut graph,
                    params.epsilon_merge * params.epsilon_merge,
                    params.min_size,
                );
                timings.record("segments merged", mark);
                log::debug!("merge loop left {} segments", graph.len());

                Ok(Some(Outcome {
                    graph,
                    initial_segments,
                    timings,
                    smoothed: keep_intermediates.then_some(filtered),
                    gradient: None,
                    labeled,
                }))
            }
            Decomposer::Watershed(params) => {
                params.validate()?;
                let blurred = watershed::blur(image, params.gaussian_radius);
                let mark = timings.record("image blurred", mark);

                let gradient = watershed::gradient_magnitude(&blurred);
                let mark = timings.record("gradient computed", mark);

                let mut graph = watershed::flood(image, &gradient);
                let initial_segments = graph.len();
                let mark = timings.record("watershed flooded", mark);
                log::debug!("watershed produced {initial_segments} basins");
                let labeled = keep_intermediates
                    .then(|| render::snapshot(&graph, image.w, image.h, true));

                merge::merge_until_stable(
                    &mut graph,
                    params.epsilon_merge * params.epsilon_merge,
                    params.min_size,
                );
                timings.record("segments merged", mark);
                log::debug!("merge loop left {} segments", graph.len());

                Ok(Some(Outcome {
                    graph,
                    initial_segments,
                    timings,
                    smoothed: keep_intermediates.then_some(blurred),
                    gradient: keep_intermediates.then_some(gradient),
                    labeled,
                }))
            }
        }
    }
}

/// Gradient values rescaled so the largest maps to 255. Display only, the
/// flood always sees the raw magnitudes.
fn scaled_for_display(gradient: &Raster<Gray>) -> Raster<Gray> {
    let max = gradient.data.iter().fold(0.0f64, |m, g| m.max(g.l));
    let mut out = gradient.clone();
    if max > 0.0 {
        for g in out.data.iter_mut() {
            g.l *= 255.0 / max;
        }
    }
    out
}

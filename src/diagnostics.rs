//! Timing and report types serialized next to the batch outputs.

use serde::Serialize;
use std::time::Instant;

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub name: String,
    pub seconds: f64,
}

/// Ordered per-stage timings of one pipeline run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the time since `since` under `name` and return a fresh mark.
    pub fn record(&mut self, name: &str, since: Instant) -> Instant {
        self.stages.push(StageTiming {
            name: name.to_string(),
            seconds: since.elapsed().as_secs_f64(),
        });
        Instant::now()
    }

    pub fn total_seconds(&self) -> f64 {
        self.stages.iter().map(|s| s.seconds).sum()
    }

    /// Plain-text rendition for the batch log file.
    pub fn to_log(&self) -> String {
        let mut out = String::new();
        for stage in &self.stages {
            out.push_str(&format!("{} in {:.3} seconds\n", stage.name, stage.seconds));
        }
        out.push_str(&format!("total {:.3} seconds\n", self.total_seconds()));
        out
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecompositionReport {
    pub method: String,
    pub params: serde_json::Value,
    pub image_width: usize,
    pub image_height: usize,
    pub initial_segments: usize,
    pub merged_segments: usize,
    pub timings: TimingBreakdown,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrangementReport {
    pub method: String,
    pub feature_x: String,
    pub feature_y: String,
    pub removed_segments: usize,
    pub placed_segments: usize,
    pub timings: TimingBreakdown,
}

//! JSON runtime configuration for the demo binaries.

use crate::arrange::{Arranger, ClusteredParams, ForceDirectedParams};
use crate::decompose::{Decomposer, MeanShiftParams, WatershedParams};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecomposeMethod {
    #[default]
    MeanShift,
    Watershed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrangeMethod {
    #[default]
    ForceDirected,
    Clustered,
}

#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    /// Directory for snapshots, renders, logs and reports.
    pub output_dir: Option<PathBuf>,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    pub input_path: PathBuf,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub decompose_method: DecomposeMethod,
    #[serde(default)]
    pub arrange_method: ArrangeMethod,
    #[serde(default)]
    pub mean_shift: MeanShiftParams,
    #[serde(default)]
    pub watershed: WatershedParams,
    #[serde(default)]
    pub force_directed: ForceDirectedParams,
    #[serde(default)]
    pub clustered: ClusteredParams,
}

impl RuntimeConfig {
    pub fn decomposer(&self) -> Decomposer {
        match self.decompose_method {
            DecomposeMethod::MeanShift => Decomposer::MeanShift(self.mean_shift),
            DecomposeMethod::Watershed => Decomposer::Watershed(self.watershed),
        }
    }

    pub fn arranger(&self) -> Arranger {
        match self.arrange_method {
            ArrangeMethod::ForceDirected => Arranger::ForceDirected(self.force_directed),
            ArrangeMethod::Clustered => Arranger::Clustered(self.clustered),
        }
    }
}

pub fn load_config(path: &Path) -> Result<RuntimeConfig, String> {
    let contents = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
    let config: RuntimeConfig = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))?;
    Ok(config)
}

#![doc = include_str!("../README.md")]

pub mod arrange;
pub mod color;
pub mod config;
pub mod decompose;
pub mod diagnostics;
pub mod features;
pub mod geometry;
pub mod pixel;
pub mod raster;
pub mod render;
pub mod segment;

pub use arrange::{Arranger, Layout};
pub use decompose::{Decomposer, FilterControl};
pub use segment::{Segment, SegmentGraph, SegmentId};

/// One-stop imports for the common decompose-prepare-arrange flow.
pub mod prelude {
    pub use crate::arrange::{
        Arranger, ClusterStyle, ClusteredParams, ForceDirectedParams, Layout,
    };
    pub use crate::color::{Color, Gray};
    pub use crate::decompose::{
        Decomposer, FilterControl, FilterProgress, MeanShiftParams, WatershedParams,
    };
    pub use crate::features::{Feature, FeatureVector};
    pub use crate::geometry::Position;
    pub use crate::pixel::Pixel;
    pub use crate::raster::Raster;
    pub use crate::segment::{Segment, SegmentGraph, SegmentId};
}

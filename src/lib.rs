//! Pointmatch locates interest points in grayscale images and matches them
//! across a stereo pair.
//!
//! The crate provides the Moravec and Förstner interest operators with
//! tile-based non-maximum suppression, correlation-coefficient matching
//! around a known global offset, and two-pass disparity statistics with
//! outlier rejection. Inputs and outputs are plain in-memory grids; optional
//! features add parallelism (`rayon`), SIMD kernels (`simd`), image loading
//! (`image-io`) and instrumentation (`tracing`).

mod candidate;
pub mod detect;
pub mod disparity;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod pipeline;
pub mod search;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use crate::image::io;

pub use crate::candidate::{feature_points, flag_map_from_points, FeaturePoint};
pub use crate::detect::{
    Forstner, ForstnerConfig, ForstnerMaps, InterestDetector, Moravec, MoravecConfig, MoravecMaps,
    Threshold,
};
pub use crate::disparity::{
    summarize, summarize_with_gate, DisparitySummary, DEFAULT_OUTLIER_GATE,
};
pub use crate::image::{FlagMap, Grid, ImageView, Intensity, ScoreMap};
pub use crate::pipeline::{StereoPipeline, StereoReport};
pub use crate::search::{match_points, MatchConfig, Offset, PointMatch, StereoMatcher};
pub use crate::util::{PointMatchError, PointMatchResult};

pub use crate::candidate::nms::suppress_tiles;

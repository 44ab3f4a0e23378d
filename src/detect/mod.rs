//! Interest-point detectors.
//!
//! Each detector builds a per-pixel interest map, thresholds it into a
//! candidate set, and thins the candidates with tile-based non-maximum
//! suppression. Both strategies implement [`InterestDetector`] and produce
//! the same row-major list of [`FeaturePoint`]s, so callers pick one at
//! construction time and feed the result to the same matcher.

pub mod forstner;
pub mod moravec;

pub use forstner::{Forstner, ForstnerConfig, ForstnerMaps, GrayCovariance};
pub use moravec::{Moravec, MoravecConfig, MoravecMaps, Threshold};

use crate::candidate::FeaturePoint;
use crate::image::{ImageView, Intensity};
use crate::util::PointMatchResult;

/// A strategy that turns a grayscale image into sparse feature points.
pub trait InterestDetector {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &'static str;

    /// Radius of the border band that never carries a feature.
    fn border(&self) -> usize;

    /// Detects feature points in row-major scan order.
    fn detect<T: Intensity>(&self, image: ImageView<'_, T>) -> PointMatchResult<Vec<FeaturePoint>>;
}

/// Row range `[radius, height - radius)` of pixels with a full window.
pub(crate) fn interior(radius: usize, len: usize) -> std::ops::Range<usize> {
    radius..len.saturating_sub(radius).max(radius)
}

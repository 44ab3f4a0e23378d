//! End-to-end stereo point matching.
//!
//! Detection runs on the reference image only; the other image is searched
//! around each feature. Statistics are computed on demand from the report so
//! that an empty match set stays inspectable.

use crate::candidate::FeaturePoint;
use crate::detect::InterestDetector;
use crate::disparity::{summarize, DisparitySummary};
use crate::image::{ImageView, Intensity};
use crate::search::{MatchConfig, PointMatch, StereoMatcher};
use crate::trace::{trace_event, trace_span};
use crate::util::PointMatchResult;

/// Features of the reference image and their aligned matches.
#[derive(Clone, Debug, PartialEq)]
pub struct StereoReport {
    /// Feature points in row-major order.
    pub features: Vec<FeaturePoint>,
    /// One entry per feature point.
    pub matches: Vec<PointMatch>,
}

impl StereoReport {
    /// Number of matched features.
    pub fn matched_count(&self) -> usize {
        self.matches.iter().filter(|m| m.is_matched()).count()
    }

    /// Disparity statistics with the default outlier gate.
    pub fn summary(&self) -> PointMatchResult<DisparitySummary> {
        summarize(&self.features, &self.matches)
    }
}

/// A detector and a matcher chosen at construction.
#[derive(Clone, Debug)]
pub struct StereoPipeline<D> {
    detector: D,
    matcher: StereoMatcher,
}

impl<D: InterestDetector> StereoPipeline<D> {
    /// Creates a pipeline; fails when `match_cfg` is invalid.
    pub fn new(detector: D, match_cfg: MatchConfig) -> PointMatchResult<Self> {
        Ok(Self {
            detector,
            matcher: StereoMatcher::new(match_cfg)?,
        })
    }

    /// Returns the detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Returns the matcher.
    pub fn matcher(&self) -> &StereoMatcher {
        &self.matcher
    }

    /// Detects features in `reference` and matches them into `other`.
    pub fn run<T: Intensity>(
        &self,
        reference: ImageView<'_, T>,
        other: ImageView<'_, T>,
    ) -> PointMatchResult<StereoReport> {
        let _span = trace_span!("stereo_pipeline", detector = self.detector.name()).entered();

        let features = self.detector.detect(reference)?;
        trace_event!("features", count = features.len());
        let matches = self.matcher.match_points(reference, other, &features)?;
        Ok(StereoReport { features, matches })
    }
}

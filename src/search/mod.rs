//! Correlation matching of feature points across an image pair.
//!
//! For every feature `(r, c)` of the reference image the matcher predicts
//! `(r - dy, c - dx)` in the other image from a known global [`Offset`],
//! scans a square search window around the prediction, and keeps the
//! placement with the highest correlation coefficient if it reaches
//! `cc_threshold`.

pub(crate) mod scan;

use crate::candidate::FeaturePoint;
use crate::image::{ImageView, Intensity};
use crate::trace::{trace_event, trace_span};
use crate::util::{PointMatchError, PointMatchResult};

/// Approximate global displacement between the reference and other image.
///
/// A feature at column `c` is expected near column `c - dx` of the other
/// image, and likewise for rows with `dy`. It is a calibration input for a
/// given image pair, not something the matcher estimates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Offset {
    /// Column shift.
    pub dx: i64,
    /// Row shift.
    pub dy: i64,
}

impl Offset {
    /// Creates an offset.
    pub fn new(dx: i64, dy: i64) -> Self {
        Self { dx, dy }
    }
}

/// Matching configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchConfig {
    /// Correlation window radius; windows are `2 * window_radius` on a side.
    pub window_radius: usize,
    /// Search radius around the predicted location.
    pub search_radius: usize,
    /// Minimum correlation coefficient for a match.
    pub cc_threshold: f64,
    /// Expected displacement of the other image.
    pub offset: Offset,
    /// Match feature points in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl MatchConfig {
    /// Creates a configuration with default window sizes and threshold.
    ///
    /// The offset has no sensible default and must be supplied.
    pub fn new(offset: Offset) -> Self {
        Self {
            window_radius: 3,
            search_radius: 10,
            cc_threshold: 0.75,
            offset,
            parallel: false,
        }
    }

    /// Checks sizes and the threshold value.
    pub fn validate(&self) -> PointMatchResult<()> {
        if self.window_radius == 0 {
            return Err(PointMatchError::InvalidConfig {
                reason: "window_radius must be positive",
            });
        }
        if self.search_radius == 0 {
            return Err(PointMatchError::InvalidConfig {
                reason: "search_radius must be positive",
            });
        }
        if !self.cc_threshold.is_finite() {
            return Err(PointMatchError::InvalidConfig {
                reason: "cc_threshold must be finite",
            });
        }
        Ok(())
    }
}

/// Outcome for one feature point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointMatch {
    /// Best placement in the other image and its correlation coefficient.
    Matched { row: usize, col: usize, score: f64 },
    /// No placement reached the threshold, or the search window was empty.
    Unmatched,
}

impl PointMatch {
    /// Returns `(row, col)` of a match.
    pub fn position(&self) -> Option<(usize, usize)> {
        match *self {
            PointMatch::Matched { row, col, .. } => Some((row, col)),
            PointMatch::Unmatched => None,
        }
    }

    /// Returns the correlation coefficient of a match.
    pub fn score(&self) -> Option<f64> {
        match *self {
            PointMatch::Matched { score, .. } => Some(score),
            PointMatch::Unmatched => None,
        }
    }

    /// True for [`PointMatch::Matched`].
    pub fn is_matched(&self) -> bool {
        matches!(self, PointMatch::Matched { .. })
    }
}

/// Correlation matcher with a fixed configuration.
#[derive(Clone, Debug)]
pub struct StereoMatcher {
    cfg: MatchConfig,
}

impl StereoMatcher {
    /// Creates a matcher after validating `cfg`.
    pub fn new(cfg: MatchConfig) -> PointMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the matcher configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Matches every feature of `reference` into `other`.
    ///
    /// The result is aligned index-for-index with `features`.
    pub fn match_points<T: Intensity>(
        &self,
        reference: ImageView<'_, T>,
        other: ImageView<'_, T>,
        features: &[FeaturePoint],
    ) -> PointMatchResult<Vec<PointMatch>> {
        let _span = trace_span!(
            "match_points",
            features = features.len(),
            parallel = self.cfg.parallel
        )
        .entered();

        let matches = self.match_all(reference, other, features);

        let matched = matches.iter().filter(|m| m.is_matched()).count();
        trace_event!("matches", matched = matched, unmatched = matches.len() - matched);
        Ok(matches)
    }

    #[cfg(feature = "rayon")]
    fn match_all<T: Intensity>(
        &self,
        reference: ImageView<'_, T>,
        other: ImageView<'_, T>,
        features: &[FeaturePoint],
    ) -> Vec<PointMatch> {
        if self.cfg.parallel {
            return crate::kernel::rayon::map_ordered_par(features, |&point| {
                scan::match_point(reference, other, point, &self.cfg)
            });
        }
        features
            .iter()
            .map(|&point| scan::match_point(reference, other, point, &self.cfg))
            .collect()
    }

    #[cfg(not(feature = "rayon"))]
    fn match_all<T: Intensity>(
        &self,
        reference: ImageView<'_, T>,
        other: ImageView<'_, T>,
        features: &[FeaturePoint],
    ) -> Vec<PointMatch> {
        features
            .iter()
            .map(|&point| scan::match_point(reference, other, point, &self.cfg))
            .collect()
    }
}

/// Matches `features` with a one-off matcher.
pub fn match_points<T: Intensity>(
    reference: ImageView<'_, T>,
    other: ImageView<'_, T>,
    features: &[FeaturePoint],
    cfg: MatchConfig,
) -> PointMatchResult<Vec<PointMatch>> {
    StereoMatcher::new(cfg)?.match_points(reference, other, features)
}

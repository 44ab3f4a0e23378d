//! Disparity statistics over matched feature pairs.
//!
//! Two passes over the matched pairs: the first estimates the raw mean
//! disparity, the second drops pairs farther than the outlier gate from that
//! mean in either axis and accumulates the filtered mean and the spread of
//! the kept pairs around the raw mean.

use crate::candidate::FeaturePoint;
use crate::search::PointMatch;
use crate::trace::{trace_event, trace_span};
use crate::util::{PointMatchError, PointMatchResult};

/// Default outlier gate in pixels, applied per axis.
pub const DEFAULT_OUTLIER_GATE: f64 = 5.0;

/// Disparity of one matched pair: match position minus feature position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Disparity {
    /// Column difference.
    pub dx: i64,
    /// Row difference.
    pub dy: i64,
}

/// Summary of the disparities of an aligned feature/match list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisparitySummary {
    /// Mean column disparity of the kept pairs.
    pub mean_dx: f64,
    /// Mean row disparity of the kept pairs.
    pub mean_dy: f64,
    /// Sample variance of the kept column disparities about the raw mean.
    pub var_dx: f64,
    /// Sample variance of the kept row disparities about the raw mean.
    pub var_dy: f64,
    /// Mean column disparity over all matched pairs.
    pub raw_mean_dx: f64,
    /// Mean row disparity over all matched pairs.
    pub raw_mean_dy: f64,
    /// Number of matched pairs.
    pub raw_count: usize,
    /// Number of pairs within the outlier gate.
    pub filtered_count: usize,
}

/// Lists the disparity of every matched pair, skipping unmatched entries.
pub fn disparities(
    features: &[FeaturePoint],
    matches: &[PointMatch],
) -> PointMatchResult<Vec<Disparity>> {
    if features.len() != matches.len() {
        return Err(PointMatchError::LengthMismatch {
            features: features.len(),
            matches: matches.len(),
        });
    }
    Ok(features
        .iter()
        .zip(matches)
        .filter_map(|(feature, m)| {
            m.position().map(|(row, col)| Disparity {
                dx: col as i64 - feature.col as i64,
                dy: row as i64 - feature.row as i64,
            })
        })
        .collect())
}

/// Summarizes disparities with the default outlier gate.
pub fn summarize(
    features: &[FeaturePoint],
    matches: &[PointMatch],
) -> PointMatchResult<DisparitySummary> {
    summarize_with_gate(features, matches, DEFAULT_OUTLIER_GATE)
}

/// Summarizes disparities, keeping pairs within `gate` of the raw mean.
///
/// Fails with [`PointMatchError::NoMatches`] when nothing matched and with
/// [`PointMatchError::TooFewInliers`] when fewer than two pairs pass the
/// gate, since the sample variance is undefined there.
pub fn summarize_with_gate(
    features: &[FeaturePoint],
    matches: &[PointMatch],
    gate: f64,
) -> PointMatchResult<DisparitySummary> {
    if !gate.is_finite() || gate < 0.0 {
        return Err(PointMatchError::InvalidConfig {
            reason: "outlier gate must be finite and non-negative",
        });
    }
    let pairs = disparities(features, matches)?;

    let _span = trace_span!("disparity_summary", pairs = pairs.len()).entered();

    if pairs.is_empty() {
        return Err(PointMatchError::NoMatches);
    }
    let raw_count = pairs.len();
    let (sum_dx, sum_dy) = pairs
        .iter()
        .fold((0i64, 0i64), |(sx, sy), d| (sx + d.dx, sy + d.dy));
    let raw_mean_dx = sum_dx as f64 / raw_count as f64;
    let raw_mean_dy = sum_dy as f64 / raw_count as f64;

    let mut kept = 0usize;
    let mut kept_dx = 0i64;
    let mut kept_dy = 0i64;
    let mut sq_dx = 0.0f64;
    let mut sq_dy = 0.0f64;
    for d in &pairs {
        let dev_x = d.dx as f64 - raw_mean_dx;
        let dev_y = d.dy as f64 - raw_mean_dy;
        if dev_x.abs() > gate || dev_y.abs() > gate {
            continue;
        }
        kept += 1;
        kept_dx += d.dx;
        kept_dy += d.dy;
        sq_dx += dev_x * dev_x;
        sq_dy += dev_y * dev_y;
    }

    trace_event!("disparity_filtered", raw = raw_count, kept = kept);
    if kept < 2 {
        return Err(PointMatchError::TooFewInliers { kept });
    }

    let denom = (kept - 1) as f64;
    Ok(DisparitySummary {
        mean_dx: kept_dx as f64 / kept as f64,
        mean_dy: kept_dy as f64 / kept as f64,
        var_dx: sq_dx / denom,
        var_dy: sq_dy / denom,
        raw_mean_dx,
        raw_mean_dy,
        raw_count,
        filtered_count: kept,
    })
}

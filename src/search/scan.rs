//! Per-feature search window scan.

use crate::candidate::FeaturePoint;
use crate::image::{ImageView, Intensity};
#[cfg(not(feature = "simd"))]
use crate::kernel::scalar::CcScalar as CcKernel;
#[cfg(feature = "simd")]
use crate::kernel::simd::CcSimd as CcKernel;
use crate::kernel::{Kernel, WindowPlan};
use crate::search::{MatchConfig, PointMatch};
use std::ops::Range;

/// Candidate centres `[max(center - search, radius), min(center + search, len - radius))`.
///
/// Every centre in the range leaves room for a full `2 * radius` window.
pub(crate) fn search_range(center: i64, search: usize, radius: usize, len: usize) -> Range<usize> {
    let (search, radius, len) = (search as i64, radius as i64, len as i64);
    let start = (center - search).max(radius);
    let end = (center + search).min(len - radius);
    if start >= end {
        return 0..0;
    }
    start as usize..end as usize
}

/// Finds the best placement for one feature point.
///
/// Ties keep the first placement in row-major order.
pub(crate) fn match_point<T: Intensity>(
    reference: ImageView<'_, T>,
    other: ImageView<'_, T>,
    point: FeaturePoint,
    cfg: &MatchConfig,
) -> PointMatch {
    let radius = cfg.window_radius;
    let side = 2 * radius;
    let rows = search_range(
        point.row as i64 - cfg.offset.dy,
        cfg.search_radius,
        radius,
        other.height(),
    );
    let cols = search_range(
        point.col as i64 - cfg.offset.dx,
        cfg.search_radius,
        radius,
        other.width(),
    );
    if rows.is_empty() || cols.is_empty() {
        return PointMatch::Unmatched;
    }

    let plan = WindowPlan::centered(reference, point.row, point.col, radius);
    // A clipped reference window differs in shape from every candidate.
    let comparable = plan.is_square(side);

    let mut best: Option<(f64, usize, usize)> = None;
    for row in rows {
        for col in cols.clone() {
            let score = if comparable {
                <CcKernel as Kernel>::score_at(other, &plan, row - radius, col - radius)
            } else {
                0.0
            };
            if best.map_or(true, |(best_score, _, _)| score > best_score) {
                best = Some((score, row, col));
            }
        }
    }

    match best {
        Some((score, row, col)) if score >= cfg.cc_threshold => PointMatch::Matched { row, col, score },
        _ => PointMatch::Unmatched,
    }
}

#[cfg(test)]
mod tests {
    use super::search_range;

    #[test]
    fn search_range_is_clamped_to_valid_centres() {
        assert_eq!(search_range(20, 10, 3, 50), 10..30);
        assert_eq!(search_range(2, 10, 3, 50), 3..12);
        assert_eq!(search_range(45, 10, 3, 50), 35..47);
        assert_eq!(search_range(-40, 10, 3, 50), 0..0);
        assert_eq!(search_range(100, 10, 3, 50), 0..0);
    }
}

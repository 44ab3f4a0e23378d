//! Correlation kernel implementations.
//!
//! A kernel scores one candidate placement against a precomputed
//! [`WindowPlan`] with the correlation coefficient
//! `CC = sum(L'R') / sqrt(sum(L'^2) * sum(R'^2))`, where primes denote
//! deviations from the window mean. Degenerate windows (zero variance on
//! either side) score 0 instead of dividing by zero.

use crate::image::{ImageView, Intensity};

mod plan;
pub mod scalar;

#[cfg(feature = "simd")]
pub mod simd;

#[cfg(feature = "rayon")]
pub mod rayon;

pub use plan::WindowPlan;

/// Below this summed squared deviation a window counts as constant.
pub(crate) const MIN_SUM_SQ_DEV: f64 = 1e-9;

/// Kernel trait for correlation scoring.
pub trait Kernel {
    /// Scores the window of the plan's shape whose top-left sample is
    /// `(top, left)`.
    ///
    /// Returns 0 when the window does not fit in `image` or either window is
    /// constant. The result lies in `[-1, 1]` otherwise.
    fn score_at<T: Intensity>(
        image: ImageView<'_, T>,
        plan: &WindowPlan,
        top: usize,
        left: usize,
    ) -> f64;
}

/// Correlation coefficient of two equally sized windows.
///
/// Windows of different shape score 0.
pub fn correlation_coefficient<T: Intensity, U: Intensity>(
    left: ImageView<'_, T>,
    right: ImageView<'_, U>,
) -> f64 {
    if left.width() != right.width() || left.height() != right.height() {
        return 0.0;
    }
    let plan = WindowPlan::from_view(left);
    <scalar::CcScalar as Kernel>::score_at(right, &plan, 0, 0)
}

/// Final normalization shared by the kernels.
///
/// `sum` and `sum_sq` are moments of the candidate samples taken about the
/// reference mean, which keeps the one-pass variance well conditioned when
/// both windows sit on a bright level.
#[inline]
pub(crate) fn finish_score(dot: f64, sum_sq_dev_ref: f64, sum: f64, sum_sq: f64, n: f64) -> f64 {
    let sum_sq_dev = sum_sq - sum * sum / n;
    if sum_sq_dev_ref <= MIN_SUM_SQ_DEV || sum_sq_dev <= MIN_SUM_SQ_DEV {
        return 0.0;
    }
    let score = dot / (sum_sq_dev_ref * sum_sq_dev).sqrt();
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

#[inline]
pub(crate) fn fits<T>(image: &ImageView<'_, T>, plan: &WindowPlan, top: usize, left: usize) -> bool {
    plan.width() > 0
        && plan.height() > 0
        && top.checked_add(plan.height()).is_some_and(|end| end <= image.height())
        && left.checked_add(plan.width()).is_some_and(|end| end <= image.width())
}

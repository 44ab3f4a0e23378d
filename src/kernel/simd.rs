//! SIMD-accelerated correlation kernel using the `wide` crate.
//!
//! The inner column loop processes four samples at a time with `f64x4`;
//! leftover columns fall back to scalar accumulation.

use crate::image::{ImageView, Intensity};
use crate::kernel::{finish_score, fits, Kernel, WindowPlan};
use wide::f64x4;

const LANES: usize = 4;

#[inline]
fn load_samples<T: Intensity>(slice: &[T]) -> f64x4 {
    f64x4::from([
        slice[0].to_f64(),
        slice[1].to_f64(),
        slice[2].to_f64(),
        slice[3].to_f64(),
    ])
}

#[inline]
fn load_f64x4(slice: &[f64]) -> f64x4 {
    f64x4::from([slice[0], slice[1], slice[2], slice[3]])
}

#[inline]
fn hsum(v: f64x4) -> f64 {
    let arr = v.to_array();
    arr[0] + arr[1] + arr[2] + arr[3]
}

/// SIMD correlation-coefficient kernel.
pub struct CcSimd;

impl Kernel for CcSimd {
    fn score_at<T: Intensity>(
        image: ImageView<'_, T>,
        plan: &WindowPlan,
        top: usize,
        left: usize,
    ) -> f64 {
        if !fits(&image, plan, top, left) {
            return 0.0;
        }

        let width = plan.width();
        let zero_mean = plan.zero_mean();
        let pivot = plan.mean();
        let pivot_vec = f64x4::splat(pivot);
        let simd_end = width / LANES * LANES;

        let mut dot_vec = f64x4::ZERO;
        let mut sum_vec = f64x4::ZERO;
        let mut sum_sq_vec = f64x4::ZERO;
        let mut dot_s = 0.0f64;
        let mut sum_s = 0.0f64;
        let mut sum_sq_s = 0.0f64;

        for ty in 0..plan.height() {
            let Some(row) = image.row(top + ty) else {
                return 0.0;
            };
            let row = &row[left..left + width];
            let base = ty * width;

            let mut tx = 0;
            while tx < simd_end {
                let values = load_samples(&row[tx..]) - pivot_vec;
                let weights = load_f64x4(&zero_mean[base + tx..]);
                dot_vec += weights * values;
                sum_vec += values;
                sum_sq_vec += values * values;
                tx += LANES;
            }

            while tx < width {
                let value = row[tx].to_f64() - pivot;
                dot_s += zero_mean[base + tx] * value;
                sum_s += value;
                sum_sq_s += value * value;
                tx += 1;
            }
        }

        let dot = hsum(dot_vec) + dot_s;
        let sum = hsum(sum_vec) + sum_s;
        let sum_sq = hsum(sum_sq_vec) + sum_sq_s;
        let n = (width * plan.height()) as f64;
        finish_score(dot, plan.sum_sq_dev(), sum, sum_sq, n)
    }
}

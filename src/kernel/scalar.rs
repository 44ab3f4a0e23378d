//! Scalar reference kernel.

use crate::image::{ImageView, Intensity};
use crate::kernel::{finish_score, fits, Kernel, WindowPlan};

/// Scalar correlation-coefficient kernel.
pub struct CcScalar;

impl Kernel for CcScalar {
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
        let mut dot = 0.0f64;
        let mut sum = 0.0f64;
        let mut sum_sq = 0.0f64;
        for ty in 0..plan.height() {
            let base = ty * width;
            for tx in 0..width {
                let value = image.at(top + ty, left + tx).to_f64() - pivot;
                dot += zero_mean[base + tx] * value;
                sum += value;
                sum_sq += value * value;
            }
        }

        let n = (width * plan.height()) as f64;
        finish_score(dot, plan.sum_sq_dev(), sum, sum_sq, n)
    }
}

#[cfg(test)]
mod tests {
    use super::CcScalar;
    use crate::image::ImageView;
    use crate::kernel::{Kernel, WindowPlan};

    #[test]
    fn scalar_matches_textbook_formula() {
        let width = 7;
        let height = 6;
        let image: Vec<u8> = (0..width * height)
            .map(|i| ((i * 37 + (i / width) * 11) % 251) as u8)
            .collect();
        let view = ImageView::from_slice(&image, width, height).unwrap();
        let reference: Vec<u8> = vec![3, 90, 14, 200, 7, 66, 120, 1, 45];
        let ref_view = ImageView::from_slice(&reference, 3, 3).unwrap();
        let plan = WindowPlan::from_view(ref_view);

        for top in 0..=height - 3 {
            for left in 0..=width - 3 {
                let mut l = Vec::new();
                let mut r = Vec::new();
                for ty in 0..3 {
                    for tx in 0..3 {
                        l.push(reference[ty * 3 + tx] as f64);
                        r.push(image[(top + ty) * width + left + tx] as f64);
                    }
                }
                let ml = l.iter().sum::<f64>() / 9.0;
                let mr = r.iter().sum::<f64>() / 9.0;
                let num: f64 = l.iter().zip(&r).map(|(a, b)| (a - ml) * (b - mr)).sum();
                let sl: f64 = l.iter().map(|a| (a - ml) * (a - ml)).sum();
                let sr: f64 = r.iter().map(|b| (b - mr) * (b - mr)).sum();
                let expected = num / (sl * sr).sqrt();

                let got = <CcScalar as Kernel>::score_at(view, &plan, top, left);
                assert!((got - expected).abs() < 1e-9, "({top}, {left}): {got} vs {expected}");
            }
        }
    }

    #[test]
    fn constant_candidate_scores_zero() {
        let flat = vec![128u8; 16];
        let view = ImageView::from_slice(&flat, 4, 4).unwrap();
        let reference = [1u8, 2, 3, 4];
        let plan = WindowPlan::from_view(ImageView::from_slice(&reference, 2, 2).unwrap());
        assert_eq!(<CcScalar as Kernel>::score_at(view, &plan, 1, 1), 0.0);
    }

    #[test]
    fn out_of_bounds_placement_scores_zero() {
        let data: Vec<u8> = (0..16).collect();
        let view = ImageView::from_slice(&data, 4, 4).unwrap();
        let plan = WindowPlan::from_view(view.roi(0, 0, 2, 2).unwrap());
        assert_eq!(<CcScalar as Kernel>::score_at(view, &plan, 3, 3), 0.0);
    }

    #[test]
    fn large_intensity_offset_keeps_precision() {
        // Small textures riding on a level near the top of the u16 range.
        let candidate: Vec<u16> = (0..36u16).map(|i| 65_000 + (i * 7) % 11).collect();
        let reference: Vec<u16> = (0..36u16).map(|i| 65_000 + (i * 5) % 13).collect();

        // Textbook formula on the textures alone; the common level cancels.
        let l: Vec<f64> = reference.iter().map(|&v| f64::from(v - 65_000)).collect();
        let r: Vec<f64> = candidate.iter().map(|&v| f64::from(v - 65_000)).collect();
        let ml = l.iter().sum::<f64>() / 36.0;
        let mr = r.iter().sum::<f64>() / 36.0;
        let num: f64 = l.iter().zip(&r).map(|(a, b)| (a - ml) * (b - mr)).sum();
        let sl: f64 = l.iter().map(|a| (a - ml) * (a - ml)).sum();
        let sr: f64 = r.iter().map(|b| (b - mr) * (b - mr)).sum();
        let expected = num / (sl * sr).sqrt();

        let plan = WindowPlan::from_view(ImageView::from_slice(&reference, 6, 6).unwrap());
        let view = ImageView::from_slice(&candidate, 6, 6).unwrap();
        let got = <CcScalar as Kernel>::score_at(view, &plan, 0, 0);
        assert!(expected.abs() > 1e-3);
        assert!((got - expected).abs() < 1e-9, "{got} vs {expected}");
    }
}

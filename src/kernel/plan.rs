//! Reference window precomputation for correlation scoring.

use crate::image::{ImageView, Intensity};

/// Zero-mean copy of a reference window plus its summed squared deviation.
///
/// With `L' = L - mean(L)` the correlation numerator
/// `sum((L - mean L)(R - mean R))` reduces to `sum(L' * R)`, so candidate
/// windows only need their own first and second moments.
#[derive(Clone, Debug)]
pub struct WindowPlan {
    width: usize,
    height: usize,
    mean: f64,
    sum_sq_dev: f64,
    zero_mean: Vec<f64>,
}

impl WindowPlan {
    /// Builds a plan from every sample of `window`.
    pub fn from_view<T: Intensity>(window: ImageView<'_, T>) -> Self {
        let width = window.width();
        let height = window.height();
        let mut values = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                values.push(window.at(row, col).to_f64());
            }
        }
        Self::from_values(values, width, height)
    }

    /// Builds a plan for rows `[row - radius, row + radius)` and the same
    /// columns, clipped to the image.
    ///
    /// Near the border the clipped plan is smaller than `2 * radius` on a
    /// side; such a plan never matches a full-size candidate window.
    pub fn centered<T: Intensity>(
        image: ImageView<'_, T>,
        row: usize,
        col: usize,
        radius: usize,
    ) -> Self {
        let row0 = row.saturating_sub(radius);
        let row1 = row.saturating_add(radius).min(image.height());
        let col0 = col.saturating_sub(radius);
        let col1 = col.saturating_add(radius).min(image.width());
        let height = row1.saturating_sub(row0);
        let width = col1.saturating_sub(col0);

        let mut values = Vec::with_capacity(width * height);
        for r in row0..row0 + height {
            for c in col0..col0 + width {
                values.push(image.at(r, c).to_f64());
            }
        }
        Self::from_values(values, width, height)
    }

    fn from_values(mut values: Vec<f64>, width: usize, height: usize) -> Self {
        let count = values.len();
        let mean = if count == 0 {
            0.0
        } else {
            values.iter().sum::<f64>() / count as f64
        };
        let mut sum_sq_dev = 0.0;
        for value in values.iter_mut() {
            *value -= mean;
            sum_sq_dev += *value * *value;
        }
        Self {
            width,
            height,
            mean,
            sum_sq_dev,
            zero_mean: values,
        }
    }

    /// Window width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Window height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// True when the plan covers a full `side x side` window.
    pub fn is_square(&self, side: usize) -> bool {
        self.width == side && self.height == side
    }

    /// Mean intensity of the reference window.
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// `sum((L - mean L)^2)`; zero for a constant window.
    pub fn sum_sq_dev(&self) -> f64 {
        self.sum_sq_dev
    }

    /// Zero-mean samples in row-major order.
    pub fn zero_mean(&self) -> &[f64] {
        &self.zero_mean
    }
}

#[cfg(test)]
mod tests {
    use super::WindowPlan;
    use crate::image::ImageView;

    #[test]
    fn plan_matches_known_stats() {
        let data = [0u8, 1, 2, 3];
        let view = ImageView::from_slice(&data, 2, 2).unwrap();
        let plan = WindowPlan::from_view(view);
        assert_eq!(plan.width(), 2);
        assert_eq!(plan.height(), 2);
        assert!((plan.mean() - 1.5).abs() < 1e-12);
        assert!((plan.sum_sq_dev() - 5.0).abs() < 1e-12);
        assert_eq!(plan.zero_mean(), &[-1.5, -0.5, 0.5, 1.5]);
    }

    #[test]
    fn centered_plan_is_clipped_at_border() {
        let data: Vec<u8> = (0..64).collect();
        let view = ImageView::from_slice(&data, 8, 8).unwrap();
        let inner = WindowPlan::centered(view, 4, 4, 3);
        assert!(inner.is_square(6));
        let edge = WindowPlan::centered(view, 1, 4, 3);
        assert_eq!((edge.width(), edge.height()), (6, 4));
        assert!(!edge.is_square(6));
    }
}

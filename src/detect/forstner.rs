//! Förstner interest operator.
//!
//! Three stages:
//!
//! 1. Preselection: a pixel is a primary candidate when the median of its
//!    four absolute differences to the axis neighbours reaches
//!    `preselect_threshold`.
//! 2. Shape analysis: the gray-level covariance matrix `N` of the two cross
//!    gradients over the window yields the roundness `q = 4 det(N) / tr(N)^2`
//!    and the weight `w = det(N) / tr(N)`, both zero when `tr(N) == 0`.
//! 3. Candidate selection: primary candidates with `q >= q_threshold`,
//!    `w >= mean_factor * mean(w)` and `w >= median_factor * median(w)`.
//!
//! The mean and median in stage 3 are taken over the whole weight map,
//! border zeros included. Zeros pull both statistics down, so the gate is
//! looser than a local one would be; this matches the classic formulation
//! and is kept as is.

use crate::candidate::nms::suppress_tiles;
use crate::candidate::FeaturePoint;
use crate::detect::{interior, InterestDetector};
use crate::image::{FlagMap, Grid, ImageView, Intensity, ScoreMap};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::math::{mean, median, median4};
use crate::util::{PointMatchError, PointMatchResult};

/// Configuration for the Förstner detector.
#[derive(Clone, Debug, PartialEq)]
pub struct ForstnerConfig {
    /// Covariance window radius; also the excluded border width.
    pub window_radius: usize,
    /// Minimum median neighbour difference for a primary candidate.
    pub preselect_threshold: f64,
    /// Minimum roundness `q`.
    pub q_threshold: f64,
    /// Factor `f` applied to the global mean weight.
    pub mean_factor: f64,
    /// Factor `c` applied to the global median weight.
    pub median_factor: f64,
    /// Side of the suppression tiles.
    pub tile_size: usize,
    /// Fill map rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for ForstnerConfig {
    fn default() -> Self {
        Self {
            window_radius: 2,
            preselect_threshold: 20.0,
            q_threshold: 0.5,
            mean_factor: 0.5,
            median_factor: 5.0,
            tile_size: 7,
            parallel: false,
        }
    }
}

impl ForstnerConfig {
    /// Checks sizes and threshold values.
    pub fn validate(&self) -> PointMatchResult<()> {
        if self.window_radius == 0 {
            return Err(PointMatchError::InvalidConfig {
                reason: "window_radius must be positive",
            });
        }
        if self.tile_size == 0 {
            return Err(PointMatchError::InvalidConfig {
                reason: "tile_size must be positive",
            });
        }
        let finite = [
            self.preselect_threshold,
            self.q_threshold,
            self.mean_factor,
            self.median_factor,
        ]
        .iter()
        .all(|v| v.is_finite());
        if !finite {
            return Err(PointMatchError::InvalidConfig {
                reason: "thresholds and factors must be finite",
            });
        }
        Ok(())
    }
}

/// Gray-level covariance matrix `[[guu, guv], [guv, gvv]]` of the cross
/// gradients over one window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrayCovariance {
    /// Sum of squared main-diagonal differences.
    pub guu: i128,
    /// Sum of squared anti-diagonal differences.
    pub gvv: i128,
    /// Sum of their products.
    pub guv: i128,
}

impl GrayCovariance {
    /// Accumulates the matrix over rows and columns `[-radius, radius)`
    /// around `(row, col)`.
    ///
    /// The caller guarantees a full window around the pixel.
    pub fn at<T: Intensity>(image: &ImageView<'_, T>, row: usize, col: usize, radius: usize) -> Self {
        let mut cov = Self::default();
        for r in row - radius..row + radius {
            for c in col - radius..col + radius {
                let gu = i128::from(image.at(r + 1, c + 1).to_i64() - image.at(r, c).to_i64());
                let gv = i128::from(image.at(r + 1, c).to_i64() - image.at(r, c + 1).to_i64());
                cov.guu += gu * gu;
                cov.gvv += gv * gv;
                cov.guv += gu * gv;
            }
        }
        cov
    }

    /// Matrix trace.
    pub fn trace(&self) -> i128 {
        self.guu + self.gvv
    }

    /// Matrix determinant.
    ///
    /// Exact for 16-bit samples: each product stays far below `i128::MAX`.
    pub fn determinant(&self) -> i128 {
        self.guu * self.gvv - self.guv * self.guv
    }

    /// Roundness `q` of the error ellipse, in `[0, 1]`; zero for a zero trace.
    pub fn roundness(&self) -> f64 {
        let trace = self.trace();
        if trace == 0 {
            return 0.0;
        }
        let trace = trace as f64;
        4.0 * self.determinant() as f64 / (trace * trace)
    }

    /// Weight `w`; zero for a zero trace.
    pub fn weight(&self) -> f64 {
        let trace = self.trace();
        if trace == 0 {
            return 0.0;
        }
        self.determinant() as f64 / trace as f64
    }
}

/// Intermediate maps of one Förstner run.
#[derive(Clone, Debug)]
pub struct ForstnerMaps {
    /// Stage 1 primary candidates.
    pub primary: FlagMap,
    /// Roundness `q` per pixel.
    pub roundness: ScoreMap<f64>,
    /// Weight `w` per pixel; the score map used for suppression.
    pub weight: ScoreMap<f64>,
    /// Stage 3 candidates.
    pub candidates: FlagMap,
    /// Mean of the whole weight map.
    pub weight_mean: f64,
    /// Median of the whole weight map.
    pub weight_median: f64,
}

/// Marks interior pixels whose median axis-neighbour difference reaches
/// `threshold`.
pub fn preselect<T: Intensity>(
    image: ImageView<'_, T>,
    window_radius: usize,
    threshold: f64,
    parallel: bool,
) -> PointMatchResult<FlagMap> {
    if window_radius == 0 {
        return Err(PointMatchError::InvalidConfig {
            reason: "window_radius must be positive",
        });
    }

    let _span = trace_span!("forstner_preselect").entered();

    let mut primary = FlagMap::zeros_like(image)?;
    let cols = interior(window_radius, image.width());
    primary.fill_rows(interior(window_radius, image.height()), parallel, |row, out| {
        for col in cols.clone() {
            let center = image.at(row, col).to_i64();
            let diffs = [
                (center - image.at(row + 1, col).to_i64()).abs(),
                (center - image.at(row, col + 1).to_i64()).abs(),
                (center - image.at(row - 1, col).to_i64()).abs(),
                (center - image.at(row, col - 1).to_i64()).abs(),
            ];
            out[col] = median4(diffs) >= threshold;
        }
    });

    trace_event!("forstner_primary", primary = primary.count_marked());
    Ok(primary)
}

/// Computes the roundness and weight maps for every interior pixel.
///
/// Every interior pixel is evaluated, preselected or not, because stage 3
/// needs global statistics of the weight map.
pub fn shape_maps<T: Intensity>(
    image: ImageView<'_, T>,
    window_radius: usize,
    parallel: bool,
) -> PointMatchResult<(ScoreMap<f64>, ScoreMap<f64>)> {
    if window_radius == 0 {
        return Err(PointMatchError::InvalidConfig {
            reason: "window_radius must be positive",
        });
    }

    let _span = trace_span!("forstner_shape").entered();

    let mut shape = Grid::<(f64, f64)>::zeros_like(image)?;
    let cols = interior(window_radius, image.width());
    shape.fill_rows(interior(window_radius, image.height()), parallel, |row, out| {
        for col in cols.clone() {
            let cov = GrayCovariance::at(&image, row, col, window_radius);
            out[col] = (cov.roundness(), cov.weight());
        }
    });

    let (width, height) = (shape.width(), shape.height());
    let (roundness, weight): (Vec<f64>, Vec<f64>) = shape.into_vec().into_iter().unzip();
    Ok((
        ScoreMap::from_vec(roundness, width, height)?,
        ScoreMap::from_vec(weight, width, height)?,
    ))
}

/// Applies the stage 3 gates; returns the candidates with the global weight
/// mean and median used.
pub fn select_candidates(
    primary: &FlagMap,
    roundness: &ScoreMap<f64>,
    weight: &ScoreMap<f64>,
    cfg: &ForstnerConfig,
) -> PointMatchResult<(FlagMap, f64, f64)> {
    primary.ensure_same_shape(roundness)?;
    primary.ensure_same_shape(weight)?;

    let _span = trace_span!("forstner_candidates").entered();

    let weights = weight.as_slice();
    let weight_mean = mean(weights).ok_or(PointMatchError::EmptyAggregate {
        context: "weight map is empty",
    })?;
    let weight_median = median(weights).ok_or(PointMatchError::EmptyAggregate {
        context: "weight map is empty",
    })?;
    let mean_gate = cfg.mean_factor * weight_mean;
    let median_gate = cfg.median_factor * weight_median;
    trace_debug!(
        "forstner_gates",
        mean = weight_mean,
        median = weight_median,
        mean_gate = mean_gate,
        median_gate = median_gate
    );

    let mut candidates = FlagMap::new(primary.width(), primary.height())?;
    for row in 0..primary.height() {
        for col in 0..primary.width() {
            if !primary.at(row, col) {
                continue;
            }
            let w = weight.at(row, col);
            if roundness.at(row, col) >= cfg.q_threshold && w >= mean_gate && w >= median_gate {
                candidates.set(row, col, true);
            }
        }
    }

    trace_event!("forstner_candidates", candidates = candidates.count_marked());
    Ok((candidates, weight_mean, weight_median))
}

/// Förstner detector with a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct Forstner {
    cfg: ForstnerConfig,
}

impl Forstner {
    /// Creates a detector after validating `cfg`.
    pub fn new(cfg: ForstnerConfig) -> PointMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the detector configuration.
    pub fn config(&self) -> &ForstnerConfig {
        &self.cfg
    }

    /// Runs all three stages, keeping every intermediate map.
    pub fn analyze<T: Intensity>(&self, image: ImageView<'_, T>) -> PointMatchResult<ForstnerMaps> {
        let cfg = &self.cfg;
        let primary = preselect(image, cfg.window_radius, cfg.preselect_threshold, cfg.parallel)?;
        let (roundness, weight) = shape_maps(image, cfg.window_radius, cfg.parallel)?;
        let (candidates, weight_mean, weight_median) =
            select_candidates(&primary, &roundness, &weight, cfg)?;
        Ok(ForstnerMaps {
            primary,
            roundness,
            weight,
            candidates,
            weight_mean,
            weight_median,
        })
    }
}

impl InterestDetector for Forstner {
    fn name(&self) -> &'static str {
        "forstner"
    }

    fn border(&self) -> usize {
        self.cfg.window_radius
    }

    fn detect<T: Intensity>(&self, image: ImageView<'_, T>) -> PointMatchResult<Vec<FeaturePoint>> {
        let maps = self.analyze(image)?;
        suppress_tiles(&maps.weight, Some(&maps.candidates), self.cfg.tile_size)
    }
}

//! Moravec interest operator.
//!
//! The interest value of a pixel is the smallest of four directional sums of
//! squared neighbour differences (vertical, main diagonal, horizontal,
//! anti-diagonal) taken along a line of `2 * radius` steps through the pixel.
//! An edge is flat along one of the four directions, so only corner-like
//! structure scores high.

use crate::candidate::nms::suppress_tiles;
use crate::candidate::FeaturePoint;
use crate::detect::{interior, InterestDetector};
use crate::image::{ImageView, Intensity, ScoreMap};
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::util::{PointMatchError, PointMatchResult};

/// Candidate threshold for the Moravec interest map.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Threshold {
    /// Mean of all nonzero interest values.
    #[default]
    Auto,
    /// Fixed interest value; scores below it are discarded.
    Fixed(i64),
}

/// Configuration for the Moravec detector.
#[derive(Clone, Debug, PartialEq)]
pub struct MoravecConfig {
    /// Half-length of the directional lines; also the excluded border width.
    pub window_radius: usize,
    /// Candidate threshold.
    pub threshold: Threshold,
    /// Side of the suppression tiles.
    pub tile_size: usize,
    /// Fill interest rows in parallel (requires the `rayon` feature).
    pub parallel: bool,
}

impl Default for MoravecConfig {
    fn default() -> Self {
        Self {
            window_radius: 2,
            threshold: Threshold::Auto,
            tile_size: 25,
            parallel: false,
        }
    }
}

impl MoravecConfig {
    /// Checks that all sizes are positive.
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
        Ok(())
    }
}

/// Intermediate maps of one Moravec run.
#[derive(Clone, Debug)]
pub struct MoravecMaps {
    /// Raw interest values; zero on the border band.
    pub interest: ScoreMap<i64>,
    /// Interest values at or above `threshold`, zero elsewhere.
    pub candidates: ScoreMap<i64>,
    /// Threshold actually applied (derived when [`Threshold::Auto`]).
    pub threshold: f64,
}

/// Computes the Moravec interest map.
///
/// Pixels closer than `window_radius` to any border keep a score of zero.
pub fn moravec_interest<T: Intensity>(
    image: ImageView<'_, T>,
    window_radius: usize,
    parallel: bool,
) -> PointMatchResult<ScoreMap<i64>> {
    if window_radius == 0 {
        return Err(PointMatchError::InvalidConfig {
            reason: "window_radius must be positive",
        });
    }

    let _span = trace_span!(
        "moravec_interest",
        width = image.width(),
        height = image.height(),
        radius = window_radius
    )
    .entered();

    let mut interest = ScoreMap::zeros_like(image)?;
    let cols = interior(window_radius, image.width());
    interest.fill_rows(
        interior(window_radius, image.height()),
        parallel,
        |row, out| {
            for col in cols.clone() {
                out[col] = directional_minimum(&image, row, col, window_radius);
            }
        },
    );
    Ok(interest)
}

/// Minimum of the four directional squared-difference sums at `(row, col)`.
///
/// The caller guarantees a full window around the pixel.
pub fn directional_minimum<T: Intensity>(
    image: &ImageView<'_, T>,
    row: usize,
    col: usize,
    radius: usize,
) -> i64 {
    let sums = directional_sums(image, row, col, radius);
    sums.into_iter().min().unwrap_or(0)
}

/// The four directional sums `[vertical, diagonal, horizontal, anti-diagonal]`.
pub fn directional_sums<T: Intensity>(
    image: &ImageView<'_, T>,
    row: usize,
    col: usize,
    radius: usize,
) -> [i64; 4] {
    let px = |r: isize, c: isize| image.at(r as usize, c as usize).to_i64();
    let sq = |a: i64, b: i64| (a - b) * (a - b);
    let (r, c, k) = (row as isize, col as isize, radius as isize);

    let mut sums = [0i64; 4];
    for i in -k..k {
        sums[0] += sq(px(r + i, c), px(r + i + 1, c));
        sums[1] += sq(px(r + i, c + i), px(r + i + 1, c + i + 1));
        sums[2] += sq(px(r, c + i), px(r, c + i + 1));
        sums[3] += sq(px(r + i, c - i), px(r + i + 1, c - i - 1));
    }
    sums
}

/// Zeroes interest values below the threshold and reports the value used.
///
/// [`Threshold::Auto`] uses the mean of the nonzero interest values and fails
/// with [`PointMatchError::EmptyAggregate`] when every value is zero.
pub fn select_candidates(
    interest: &ScoreMap<i64>,
    threshold: Threshold,
) -> PointMatchResult<(ScoreMap<i64>, f64)> {
    let _span = trace_span!("moravec_candidates").entered();

    let threshold = match threshold {
        Threshold::Fixed(value) => value as f64,
        Threshold::Auto => {
            let (sum, count) = interest
                .as_slice()
                .iter()
                .filter(|&&score| score != 0)
                .fold((0i64, 0usize), |(sum, count), &score| (sum + score, count + 1));
            if count == 0 {
                return Err(PointMatchError::EmptyAggregate {
                    context: "no nonzero interest values to derive a threshold from",
                });
            }
            sum as f64 / count as f64
        }
    };

    let mut candidates = interest.clone();
    let mut kept = 0usize;
    for row in 0..interest.height() {
        for col in 0..interest.width() {
            let score = interest.at(row, col);
            if (score as f64) < threshold {
                candidates.set(row, col, 0);
            } else if score != 0 {
                kept += 1;
            }
        }
    }

    trace_debug!("moravec_threshold", threshold = threshold);
    trace_event!("moravec_candidates", candidates = kept);
    Ok((candidates, threshold))
}

/// Moravec detector with a fixed configuration.
#[derive(Clone, Debug, Default)]
pub struct Moravec {
    cfg: MoravecConfig,
}

impl Moravec {
    /// Creates a detector after validating `cfg`.
    pub fn new(cfg: MoravecConfig) -> PointMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the detector configuration.
    pub fn config(&self) -> &MoravecConfig {
        &self.cfg
    }

    /// Runs interest computation and thresholding, keeping both maps.
    pub fn analyze<T: Intensity>(&self, image: ImageView<'_, T>) -> PointMatchResult<MoravecMaps> {
        let interest = moravec_interest(image, self.cfg.window_radius, self.cfg.parallel)?;
        let (candidates, threshold) = select_candidates(&interest, self.cfg.threshold)?;
        Ok(MoravecMaps {
            interest,
            candidates,
            threshold,
        })
    }
}

impl InterestDetector for Moravec {
    fn name(&self) -> &'static str {
        "moravec"
    }

    fn border(&self) -> usize {
        self.cfg.window_radius
    }

    fn detect<T: Intensity>(&self, image: ImageView<'_, T>) -> PointMatchResult<Vec<FeaturePoint>> {
        let maps = self.analyze(image)?;
        suppress_tiles(&maps.candidates, None, self.cfg.tile_size)
    }
}

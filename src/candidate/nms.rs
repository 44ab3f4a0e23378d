//! Tile-based non-maximum suppression.
//!
//! The image is covered by square tiles of side `tile_size`. Tile origins sit
//! at multiples of `tile_size`; a tile is visited only while its centre
//! (origin + `tile_size / 2`) is below `dim - tile_size / 2`, and is clipped
//! to the image. Within a tile every pixel attaining the maximum score is
//! promoted if its gate is set, so ties all survive.

use crate::candidate::{feature_points, FeaturePoint};
use crate::image::{FlagMap, ScoreMap};
use crate::trace::{trace_event, trace_span};
use crate::util::{PointMatchError, PointMatchResult};

/// Keeps tile-local maxima of `scores` that pass `gate`.
///
/// With `gate == None` a pixel passes when its own score is nonzero, which is
/// the right gate for an already thresholded score map. The result is in
/// row-major order and has no duplicates.
pub fn suppress_tiles<S>(
    scores: &ScoreMap<S>,
    gate: Option<&FlagMap>,
    tile_size: usize,
) -> PointMatchResult<Vec<FeaturePoint>>
where
    S: Copy + Default + PartialOrd,
{
    if tile_size == 0 {
        return Err(PointMatchError::InvalidConfig {
            reason: "tile_size must be positive",
        });
    }
    if let Some(gate) = gate {
        scores.ensure_same_shape(gate)?;
    }

    let _span = trace_span!("suppress_tiles", tile_size = tile_size).entered();

    let width = scores.width();
    let height = scores.height();
    let half = tile_size / 2;
    let zero = S::default();
    let passes = |row: usize, col: usize, score: S| match gate {
        Some(flags) => flags.at(row, col),
        None => score != zero,
    };

    let mut kept = FlagMap::new(width, height)?;
    for center_row in (half..height.saturating_sub(half)).step_by(tile_size) {
        let row0 = center_row - half;
        let row1 = (row0 + tile_size).min(height);
        for center_col in (half..width.saturating_sub(half)).step_by(tile_size) {
            let col0 = center_col - half;
            let col1 = (col0 + tile_size).min(width);

            let Some(best) = tile_max(scores, row0..row1, col0..col1) else {
                continue;
            };
            for row in row0..row1 {
                for col in col0..col1 {
                    let score = scores.at(row, col);
                    if score == best && passes(row, col, score) {
                        kept.set(row, col, true);
                    }
                }
            }
        }
    }

    let points = feature_points(&kept);
    trace_event!("suppressed", features = points.len());
    Ok(points)
}

fn tile_max<S: Copy + Default + PartialOrd>(
    scores: &ScoreMap<S>,
    rows: std::ops::Range<usize>,
    cols: std::ops::Range<usize>,
) -> Option<S> {
    let mut best: Option<S> = None;
    for row in rows {
        for col in cols.clone() {
            let score = scores.at(row, col);
            if best.map_or(true, |b| score > b) {
                best = Some(score);
            }
        }
    }
    best
}

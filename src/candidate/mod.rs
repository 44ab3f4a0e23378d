//! Feature points and spatial non-maximum suppression.

pub(crate) mod nms;

use crate::image::FlagMap;
use crate::util::PointMatchResult;

/// A detected feature location in `(row, col)` image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeaturePoint {
    /// Row (y) index.
    pub row: usize,
    /// Column (x) index.
    pub col: usize,
}

impl FeaturePoint {
    /// Creates a feature point.
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Lists marked pixels in row-major scan order.
pub fn feature_points(flags: &FlagMap) -> Vec<FeaturePoint> {
    let mut points = Vec::new();
    for row in 0..flags.height() {
        let Some(slice) = flags.row(row) else {
            break;
        };
        points.extend(
            slice
                .iter()
                .enumerate()
                .filter(|(_, &marked)| marked)
                .map(|(col, _)| FeaturePoint::new(row, col)),
        );
    }
    points
}

/// Builds a flag map with `points` marked; out-of-range points are ignored.
pub fn flag_map_from_points(
    width: usize,
    height: usize,
    points: &[FeaturePoint],
) -> PointMatchResult<FlagMap> {
    let mut flags = FlagMap::new(width, height)?;
    for point in points {
        if point.row < height && point.col < width {
            flags.set(point.row, point.col, true);
        }
    }
    Ok(flags)
}

//! Error types for pointmatch.

use thiserror::Error;

/// Result alias for pointmatch operations.
pub type PointMatchResult<T> = std::result::Result<T, PointMatchError>;

/// Errors that can occur when running pointmatch algorithms.
///
/// Per-pixel numerical degeneracies (zero trace, zero variance) never surface
/// here; they are normalized to a neutral score of zero where they occur.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum PointMatchError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: width={width}, height={height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride: width={width}, stride={stride}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer cannot hold the described grid.
    #[error("buffer too small: needed {needed} elements, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A configuration value is out of range.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Two grids that must share a shape do not.
    #[error("dimension mismatch: expected {expected_width}x{expected_height}, got {width}x{height}")]
    DimensionMismatch {
        expected_width: usize,
        expected_height: usize,
        width: usize,
        height: usize,
    },
    /// A mean or median was requested over an empty set.
    #[error("empty aggregate: {context}")]
    EmptyAggregate { context: &'static str },
    /// Feature and match lists are not aligned.
    #[error("length mismatch: {features} feature points but {matches} match entries")]
    LengthMismatch { features: usize, matches: usize },
    /// No feature point found a match, so no disparity can be estimated.
    #[error("no matched pairs to summarize")]
    NoMatches,
    /// Too few pairs survived the outlier gate for a sample variance.
    #[error("too few inliers: {kept} pair(s) passed the outlier gate, at least 2 required")]
    TooFewInliers { kept: usize },
    /// Image decoding failed.
    #[error("image io error: {reason}")]
    ImageIo { reason: String },
}

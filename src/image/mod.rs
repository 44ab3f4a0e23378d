//! Image views and owned grids.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. ROI slices are
//! zero-copy views into the same backing slice and retain the original stride.
//!
//! All coordinates are `(row, col)` with the origin at the top-left sample.

use crate::util::{PointMatchError, PointMatchResult};

mod grid;
#[cfg(feature = "image-io")]
pub mod io;

pub use grid::{FlagMap, Grid, ScoreMap};

/// Integer sample type usable as image intensity.
///
/// Intensities are conventionally in `[0, 255]` but nothing here relies on
/// that range. Samples are at most 16 bits wide, so squared differences and
/// their window sums stay exact in `i64` (Moravec) and `i128` (Förstner).
pub trait Intensity: Copy + Send + Sync + 'static {
    /// Widens the sample to `i64` for exact difference arithmetic.
    fn to_i64(self) -> i64;

    /// Converts the sample to `f64` for correlation arithmetic.
    #[inline]
    fn to_f64(self) -> f64 {
        self.to_i64() as f64
    }
}

macro_rules! impl_intensity {
    ($($ty:ty),+) => {
        $(
            impl Intensity for $ty {
                #[inline]
                fn to_i64(self) -> i64 {
                    i64::from(self)
                }
            }
        )+
    };
}

impl_intensity!(u8, u16, i16);

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> PointMatchResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(
        data: &'a [T],
        width: usize,
        height: usize,
        stride: usize,
    ) -> PointMatchResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(PointMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the sample at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&'a T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let idx = row.checked_mul(self.stride)?.checked_add(col)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for `row` with length `width`.
    pub fn row(&self, row: usize) -> Option<&'a [T]> {
        if row >= self.height {
            return None;
        }
        let start = row.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }

    /// Returns a zero-copy ROI view into the same backing buffer.
    pub fn roi(
        &self,
        top: usize,
        left: usize,
        width: usize,
        height: usize,
    ) -> PointMatchResult<ImageView<'a, T>> {
        if width == 0 || height == 0 {
            return Err(PointMatchError::InvalidDimensions { width, height });
        }
        let fits_cols = left
            .checked_add(width)
            .is_some_and(|end| end <= self.width);
        let fits_rows = top
            .checked_add(height)
            .is_some_and(|end| end <= self.height);
        if !fits_cols || !fits_rows {
            return Err(PointMatchError::DimensionMismatch {
                expected_width: self.width,
                expected_height: self.height,
                width: left.saturating_add(width),
                height: top.saturating_add(height),
            });
        }

        let start = top * self.stride + left;
        ImageView::new(&self.data[start..], width, height, self.stride)
    }
}

impl<T: Copy> ImageView<'_, T> {
    /// Unchecked-by-contract sample access for hot loops.
    ///
    /// Callers guarantee `(row, col)` is inside the view; out-of-range
    /// coordinates panic on the slice index.
    #[inline]
    pub(crate) fn at(&self, row: usize, col: usize) -> T {
        self.data[row * self.stride + col]
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> PointMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(PointMatchError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(PointMatchError::InvalidStride { width, stride });
    }
    (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(PointMatchError::InvalidDimensions { width, height })
}

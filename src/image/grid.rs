//! Owned contiguous grids used for images, score maps and flag maps.

use crate::image::ImageView;
use crate::util::{PointMatchError, PointMatchResult};
use std::ops::Range;

/// Owned row-major 2D grid with `stride == width`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

/// Per-pixel interest scores, zero outside the evaluated interior.
pub type ScoreMap<S> = Grid<S>;

/// Per-pixel markers for one pipeline stage.
pub type FlagMap = Grid<bool>;

impl<T: Copy + Default> Grid<T> {
    /// Creates a grid filled with `T::default()` (zero / unmarked).
    pub fn new(width: usize, height: usize) -> PointMatchResult<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            data: vec![T::default(); len],
            width,
            height,
        })
    }

    /// Creates a zeroed grid with the same shape as `view`.
    pub fn zeros_like<U>(view: ImageView<'_, U>) -> PointMatchResult<Self> {
        Self::new(view.width(), view.height())
    }

    /// Copies a (possibly strided) view into a contiguous grid.
    pub fn from_view(view: ImageView<'_, T>) -> PointMatchResult<Self> {
        let mut data = Vec::with_capacity(checked_len(view.width(), view.height())?);
        for row in 0..view.height() {
            let src = view.row(row).ok_or(PointMatchError::BufferTooSmall {
                needed: (row + 1) * view.stride(),
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(src);
        }
        Self::from_vec(data, view.width(), view.height())
    }

    /// Returns the value at `(row, col)`.
    ///
    /// Panics when out of bounds; use [`Grid::get`] for checked access.
    #[inline]
    pub fn at(&self, row: usize, col: usize) -> T {
        self.data[row * self.width + col]
    }

    /// Writes `value` at `(row, col)`.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.data[row * self.width + col] = value;
    }
}

impl<T> Grid<T> {
    /// Wraps an existing row-major buffer of exactly `width * height` values.
    pub fn from_vec(data: Vec<T>, width: usize, height: usize) -> PointMatchResult<Self> {
        let needed = checked_len(width, height)?;
        if data.len() < needed {
            return Err(PointMatchError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(PointMatchError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the grid width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the grid height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the backing buffer in row-major order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Consumes the grid and returns the backing buffer.
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Returns the value at `(row, col)` if it is within bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.data.get(row * self.width + col)
    }

    /// Returns row `row` as a slice.
    pub fn row(&self, row: usize) -> Option<&[T]> {
        if row >= self.height {
            return None;
        }
        let start = row * self.width;
        self.data.get(start..start + self.width)
    }

    /// Returns a borrowed view of the grid.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    /// Returns true when `other` has the same width and height.
    pub fn same_shape<U>(&self, other: &Grid<U>) -> bool {
        self.width == other.width && self.height == other.height
    }

    pub(crate) fn ensure_same_shape<U>(&self, other: &Grid<U>) -> PointMatchResult<()> {
        if self.same_shape(other) {
            return Ok(());
        }
        Err(PointMatchError::DimensionMismatch {
            expected_width: self.width,
            expected_height: self.height,
            width: other.width,
            height: other.height,
        })
    }
}

impl<T: Send> Grid<T> {
    /// Runs `fill(row, row_slice)` for every row in `rows`.
    ///
    /// Each invocation owns a disjoint row, so with the `rayon` feature and
    /// `parallel == true` rows are filled concurrently. Without the feature
    /// the flag is ignored.
    pub(crate) fn fill_rows<F>(&mut self, rows: Range<usize>, parallel: bool, fill: F)
    where
        F: Fn(usize, &mut [T]) + Sync + Send,
    {
        let rows = rows.start.min(self.height)..rows.end.min(self.height);
        if rows.is_empty() {
            return;
        }

        #[cfg(feature = "rayon")]
        {
            if parallel {
                crate::kernel::rayon::fill_rows_par(&mut self.data, self.width, rows, &fill);
                return;
            }
        }
        #[cfg(not(feature = "rayon"))]
        let _ = parallel;

        for (row, slice) in self
            .data
            .chunks_mut(self.width)
            .enumerate()
            .skip(rows.start)
            .take(rows.len())
        {
            fill(row, slice);
        }
    }
}

impl FlagMap {
    /// Number of marked pixels.
    pub fn count_marked(&self) -> usize {
        self.data.iter().filter(|&&flag| flag).count()
    }
}

fn checked_len(width: usize, height: usize) -> PointMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(PointMatchError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(PointMatchError::InvalidDimensions { width, height })
}

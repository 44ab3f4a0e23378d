//! Convenience helpers for loading images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled. Color inputs are reduced
//! to 8-bit luma on load; the detectors never see color.

use crate::image::Grid;
use crate::util::{PointMatchError, PointMatchResult};
use std::path::Path;

/// Creates an owned grid from a grayscale image buffer.
pub fn grid_from_gray_image(img: &image::GrayImage) -> PointMatchResult<Grid<u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    Grid::from_vec(img.as_raw().clone(), width, height)
}

/// Creates an owned grayscale grid from a dynamic image.
pub fn grid_from_dynamic_image(img: &image::DynamicImage) -> PointMatchResult<Grid<u8>> {
    let gray = img.to_luma8();
    grid_from_gray_image(&gray)
}

/// Loads an image from disk and converts it to a grayscale grid.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PointMatchResult<Grid<u8>> {
    let img = image::open(path).map_err(|err| PointMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    grid_from_dynamic_image(&img)
}

//! Rayon-parallel helpers (feature-gated).
//!
//! Score-map rows and feature points are independent units of work; these
//! helpers distribute them across the rayon pool while keeping output order
//! identical to the sequential path.

use rayon::prelude::*;
use std::ops::Range;

/// Row-parallel fill over `rows` of a row-major buffer of `width` columns.
pub(crate) fn fill_rows_par<T, F>(data: &mut [T], width: usize, rows: Range<usize>, fill: &F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    data.par_chunks_mut(width)
        .enumerate()
        .skip(rows.start)
        .take(rows.len())
        .for_each(|(row, slice)| fill(row, slice));
}

/// Maps `items` in parallel, preserving input order.
pub(crate) fn map_ordered_par<I, O, F>(items: &[I], map: F) -> Vec<O>
where
    I: Sync,
    O: Send,
    F: Fn(&I) -> O + Sync + Send,
{
    items.par_iter().map(map).collect()
}

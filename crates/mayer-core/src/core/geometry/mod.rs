//! Labeled point sets and their pairwise geometry.
//!
//! Points are indexed `0..n`; point 0 is the conventional unmoved reference. Pair quantities
//! are stored in upper-triangular order, see [`pair_index`].

pub mod pair_cache;

use thiserror::Error;

/// Largest supported point count. Subsets of points are `u32` bitmasks and every diagram table
/// holds `2^n` entries, so anything beyond this is out of reach for exact subset recursion.
pub const MAX_POINTS: usize = 20;

/// Which points changed between a geometry buffer and the buffer it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dirty {
    Point(usize),
    All,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum GeometryError {
    #[error("A point set needs at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("Point sets are limited to {max} points, got {count}")]
    TooManyPoints { count: usize, max: usize },
    #[error("Position of point {0} is not finite")]
    NonFinitePosition(usize),
}

/// Number of unordered pairs among `n` points.
#[inline]
pub const fn pair_count(n: usize) -> usize {
    n * (n - 1) / 2
}

/// Offset of pair `(i, j)` in an upper-triangular table over `n` points.
///
/// Requires `i < j < n`; callers are responsible for the ordering.
#[inline]
pub const fn pair_index(n: usize, i: usize, j: usize) -> usize {
    i * (2 * n - i - 1) / 2 + (j - i - 1)
}

pub(crate) fn validate_point_count(count: usize) -> Result<(), GeometryError> {
    if count < 2 {
        return Err(GeometryError::TooFewPoints(count));
    }
    if count > MAX_POINTS {
        return Err(GeometryError::TooManyPoints {
            count,
            max: MAX_POINTS,
        });
    }
    Ok(())
}

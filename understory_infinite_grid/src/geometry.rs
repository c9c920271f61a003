// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Integer tile coordinates and rectangular coordinate ranges.
//!
//! Continuous quantities (camera position, tile centers, sizes) use Kurbo's
//! [`Vec2`](kurbo::Vec2), [`Point`](kurbo::Point) and [`Size`](kurbo::Size).
//! `Vec2` already provides the arithmetic the engine needs (`a + b`, `a - b`,
//! `v * k`, `-v`) and exact componentwise equality.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::{Add, Sub};

/// Integer coordinate of one repetition of the content in the infinite tiling.
///
/// The origin tile `(0, 0)` is the un-translated content. Columns grow to the
/// right (+x) and rows grow downward (+y).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    /// Column index.
    pub col: i64,
    /// Row index.
    pub row: i64,
}

impl TileCoord {
    /// The origin tile `(0, 0)`.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Creates a coordinate from a column and row.
    #[must_use]
    pub const fn new(col: i64, row: i64) -> Self {
        Self { col, row }
    }

    /// Returns this coordinate shifted by `dcol` columns and `drow` rows.
    ///
    /// Saturates at the bounds of `i64`.
    #[must_use]
    pub const fn offset(self, dcol: i64, drow: i64) -> Self {
        Self::new(self.col.saturating_add(dcol), self.row.saturating_add(drow))
    }
}

impl From<(i64, i64)> for TileCoord {
    fn from((col, row): (i64, i64)) -> Self {
        Self::new(col, row)
    }
}

impl Add for TileCoord {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.offset(rhs.col, rhs.row)
    }
}

impl Sub for TileCoord {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.col.saturating_sub(rhs.col),
            self.row.saturating_sub(rhs.row),
        )
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.col, self.row)
    }
}

/// An inclusive rectangular range of tile coordinates.
///
/// This is the Cartesian product of a column range and a row range, so it
/// never contains the same coordinate twice. A range whose minimum exceeds its
/// maximum on either axis is empty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TileRange {
    min: TileCoord,
    max: TileCoord,
}

impl TileRange {
    /// The empty range.
    pub const EMPTY: Self = Self {
        min: TileCoord::new(0, 0),
        max: TileCoord::new(-1, -1),
    };

    /// Creates the range of all coordinates between `min` and `max`, inclusive.
    ///
    /// If `min` exceeds `max` on either axis the result is [`TileRange::EMPTY`].
    #[must_use]
    pub fn new(min: TileCoord, max: TileCoord) -> Self {
        if min.col > max.col || min.row > max.row {
            Self::EMPTY
        } else {
            Self { min, max }
        }
    }

    /// Minimum (top-left) coordinate, or `None` when empty.
    #[must_use]
    pub fn min(&self) -> Option<TileCoord> {
        (!self.is_empty()).then_some(self.min)
    }

    /// Maximum (bottom-right) coordinate, or `None` when empty.
    #[must_use]
    pub fn max(&self) -> Option<TileCoord> {
        (!self.is_empty()).then_some(self.max)
    }

    /// Returns `true` if the range contains no coordinates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.col > self.max.col || self.min.row > self.max.row
    }

    /// Number of columns spanned by the range.
    #[must_use]
    pub fn columns(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.max.col.abs_diff(self.min.col).saturating_add(1)
        }
    }

    /// Number of rows spanned by the range.
    #[must_use]
    pub fn rows(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.max.row.abs_diff(self.min.row).saturating_add(1)
        }
    }

    /// Number of coordinates in the range, saturating at `usize::MAX`.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::try_from(self.columns().saturating_mul(self.rows())).unwrap_or(usize::MAX)
    }

    /// Returns `true` if `coord` lies inside the range.
    #[must_use]
    pub fn contains(&self, coord: TileCoord) -> bool {
        (self.min.col..=self.max.col).contains(&coord.col)
            && (self.min.row..=self.max.row).contains(&coord.row)
    }

    /// Grows the range by `margin` whole tiles on every side.
    ///
    /// An empty range stays empty.
    #[must_use]
    pub fn expand(self, margin: u32) -> Self {
        if self.is_empty() || margin == 0 {
            return self;
        }
        let m = i64::from(margin);
        Self {
            min: self.min.offset(-m, -m),
            max: self.max.offset(m, m),
        }
    }

    /// Iterates the coordinates in row-major order.
    #[must_use]
    pub fn iter(&self) -> TileRangeIter {
        TileRangeIter {
            range: *self,
            next: self.min(),
        }
    }

    /// Iterates the coordinates of `self` that are not in `other`, row-major.
    pub fn difference(&self, other: &Self) -> impl Iterator<Item = TileCoord> + use<> {
        let other = *other;
        self.iter().filter(move |coord| !other.contains(*coord))
    }
}

impl Default for TileRange {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl IntoIterator for TileRange {
    type Item = TileCoord;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> TileRangeIter {
        self.iter()
    }
}

impl IntoIterator for &TileRange {
    type Item = TileCoord;
    type IntoIter = TileRangeIter;

    fn into_iter(self) -> TileRangeIter {
        self.iter()
    }
}

/// Row-major iterator over a [`TileRange`].
#[derive(Clone, Debug)]
pub struct TileRangeIter {
    range: TileRange,
    next: Option<TileCoord>,
}

impl Iterator for TileRangeIter {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        let current = self.next?;
        self.next = if current.col < self.range.max.col {
            Some(TileCoord::new(current.col + 1, current.row))
        } else if current.row < self.range.max.row {
            Some(TileCoord::new(self.range.min.col, current.row + 1))
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let Some(current) = self.next else {
            return (0, Some(0));
        };
        let max = self.range.max;
        let columns = u128::from(max.col.abs_diff(self.range.min.col)) + 1;
        let rows_after = u128::from(max.row.abs_diff(current.row));
        let in_row = u128::from(max.col.abs_diff(current.col)) + 1;
        match usize::try_from(rows_after.saturating_mul(columns).saturating_add(in_row)) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}

/// Ranges near the full extent of `i64` can hold more than `usize::MAX`
/// coordinates; for those `len` saturates and `size_hint` has no upper bound.
impl ExactSizeIterator for TileRangeIter {
    fn len(&self) -> usize {
        self.size_hint().0
    }
}

impl FusedIterator for TileRangeIter {}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between continuous world space and discrete tile coordinates.

use kurbo::{Point, Rect, Size, Vec2};

use crate::geometry::{TileCoord, TileRange};

/// Geometry of an infinite, gap-free tiling of the plane.
///
/// Tile `(col, row)` covers the rectangle starting at
/// `origin + (col * width, row * height)` with size `tile_size`. Neighbouring
/// tiles abut exactly; there are no gaps or overlaps.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileGrid {
    tile_size: Size,
    origin: Point,
}

impl TileGrid {
    /// Creates a grid whose tile `(0, 0)` has its minimum corner at `origin`.
    #[must_use]
    pub fn new(tile_size: Size, origin: Point) -> Self {
        Self { tile_size, origin }
    }

    /// Creates a grid whose tile `(0, 0)` is centered on the world origin.
    ///
    /// This matches content laid out centered in the viewport: with the camera
    /// at `(0, 0)` the origin tile exactly fills a viewport of `tile_size`.
    #[must_use]
    pub fn centered(tile_size: Size) -> Self {
        Self::new(
            tile_size,
            Point::new(-tile_size.width / 2.0, -tile_size.height / 2.0),
        )
    }

    /// Size of a single tile.
    #[must_use]
    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    /// Minimum corner of tile `(0, 0)`.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Returns `true` if no tiling is possible because a tile dimension is
    /// zero, negative, or NaN.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.tile_size.width > 0.0 && self.tile_size.height > 0.0)
    }

    /// World-space rectangle covered by `coord`.
    #[must_use]
    pub fn tile_rect(&self, coord: TileCoord) -> Rect {
        Rect::from_origin_size(self.tile_origin(coord), self.tile_size)
    }

    /// World-space center of `coord`.
    #[must_use]
    pub fn tile_center(&self, coord: TileCoord) -> Point {
        self.tile_origin(coord) + self.tile_size.to_vec2() / 2.0
    }

    /// The tile containing `point`, or `None` for a degenerate grid.
    ///
    /// Tiles are half-open: a point on a shared edge belongs to the tile with
    /// the larger index.
    #[must_use]
    pub fn coord_at(&self, point: Point) -> Option<TileCoord> {
        if self.is_degenerate() {
            return None;
        }
        let local = point - self.origin;
        Some(TileCoord::new(
            floor_index(local.x / self.tile_size.width),
            floor_index(local.y / self.tile_size.height),
        ))
    }

    /// Tiles whose rectangle overlaps `view` with positive area, grown by
    /// `margin` tiles on every side.
    ///
    /// Tiles that merely touch an edge of `view` are not included. A degenerate
    /// grid or an empty (or inverted) view yields [`TileRange::EMPTY`].
    #[must_use]
    pub fn visible_range(&self, view: Rect, margin: u32) -> TileRange {
        if !(view.x1 > view.x0 && view.y1 > view.y0) {
            return TileRange::EMPTY;
        }
        self.covering_range(view, margin)
    }

    /// Tiles overlapping a view of `view_size` centered on `center`, grown by
    /// `margin` tiles on every side.
    ///
    /// Emptiness is decided by `view_size` alone. Far from the origin the
    /// edges `center ± view_size / 2` can round to the same `f64`; the view
    /// still covers the tile containing `center`, and that tile is returned.
    #[must_use]
    pub fn visible_range_around(&self, center: Point, view_size: Size, margin: u32) -> TileRange {
        if !(view_size.width > 0.0 && view_size.height > 0.0) {
            return TileRange::EMPTY;
        }
        self.covering_range(Rect::from_center_size(center, view_size), margin)
    }

    /// Spans `view` without checking its extent; collapsed edges resolve to
    /// the single tile containing them.
    fn covering_range(&self, view: Rect, margin: u32) -> TileRange {
        if self.is_degenerate() {
            return TileRange::EMPTY;
        }
        let (min_col, max_col) = span(
            view.x0 - self.origin.x,
            view.x1 - self.origin.x,
            self.tile_size.width,
        );
        let (min_row, max_row) = span(
            view.y0 - self.origin.y,
            view.y1 - self.origin.y,
            self.tile_size.height,
        );
        TileRange::new(
            TileCoord::new(min_col, min_row),
            TileCoord::new(max_col, max_row),
        )
        .expand(margin)
    }

    fn tile_origin(&self, coord: TileCoord) -> Point {
        Point::new(
            self.origin.x + coord.col as f64 * self.tile_size.width,
            self.origin.y + coord.row as f64 * self.tile_size.height,
        )
    }
}

/// Tiles intersecting a viewport of `viewport_size` centered on `camera`.
///
/// The visible rectangle is
/// `[camera.x - w/2, camera.x + w/2] x [camera.y - h/2, camera.y + h/2]`,
/// tiled by a [`TileGrid::centered`] grid of `tile_size`. The resulting range
/// is expanded by `margin` tiles on every side. A zero tile size or a
/// zero-area viewport yields [`TileRange::EMPTY`].
///
/// ```rust
/// use kurbo::{Size, Vec2};
/// use understory_infinite_grid::{TileCoord, visible_coordinates};
///
/// let size = Size::new(100.0, 100.0);
/// let range = visible_coordinates(Vec2::new(50.0, 0.0), size, size, 0);
/// let coords: Vec<_> = range.iter().collect();
/// assert_eq!(coords, [TileCoord::new(0, 0), TileCoord::new(1, 0)]);
/// ```
#[must_use]
pub fn visible_coordinates(
    camera: Vec2,
    viewport_size: Size,
    tile_size: Size,
    margin: u32,
) -> TileRange {
    TileGrid::centered(tile_size).visible_range_around(camera.to_point(), viewport_size, margin)
}

/// Inclusive index span of tiles overlapping `[lo, hi]` (relative to the grid
/// origin) with positive length.
fn span(lo: f64, hi: f64, tile: f64) -> (i64, i64) {
    let first = floor_index(lo / tile);
    // `hi / tile` can collapse onto `lo / tile` for huge coordinates; callers
    // only get here for views of positive extent, which cover at least one tile.
    let last = ceil_index(hi / tile).saturating_sub(1).max(first);
    (first, last)
}

/// Floors `v` to an index, saturating at the bounds of `i64`.
fn floor_index(v: f64) -> i64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Float-to-int casts saturate; the result is corrected towards negative infinity below"
    )]
    let truncated = v as i64;
    if (truncated as f64) > v {
        truncated.saturating_sub(1)
    } else {
        truncated
    }
}

/// Ceils `v` to an index, saturating at the bounds of `i64`.
fn ceil_index(v: f64) -> i64 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "Float-to-int casts saturate; the result is corrected towards positive infinity below"
    )]
    let truncated = v as i64;
    if (truncated as f64) < v {
        truncated.saturating_add(1)
    } else {
        truncated
    }
}

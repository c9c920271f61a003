// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Descriptors for materialized tiles.

use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use crate::geometry::TileCoord;
use crate::mapper::TileGrid;

/// Stable identity of a tile.
///
/// A `TileId` is a pure function of the tile coordinate: the same repetition
/// of the content always has the same id, no matter how often it leaves and
/// re-enters visibility. Hosts should key per-tile visual state (mounted
/// views, running animations) by `TileId` rather than by list position.
///
/// Ids are only comparable within one engine instance; see
/// [`GridId`](crate::GridId).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileId(TileCoord);

impl TileId {
    /// The id of the tile at `coord`.
    #[must_use]
    pub const fn of(coord: TileCoord) -> Self {
        Self(coord)
    }

    /// The coordinate this id was derived from.
    #[must_use]
    pub const fn coord(self) -> TileCoord {
        self.0
    }
}

impl From<TileCoord> for TileId {
    fn from(coord: TileCoord) -> Self {
        Self::of(coord)
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.col, self.0.row)
    }
}

/// A visible tile, positioned in world space.
///
/// Descriptors are plain values derived from the tile coordinate and the grid
/// geometry. The center does not depend on the camera: moving the camera
/// changes which tiles are visible, never where a tile sits.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TileDescriptor {
    /// Stable identity of the tile.
    pub id: TileId,
    /// World-space center of the tile.
    pub center: Point,
    /// Size of the tile (equal to the measured content size).
    pub size: Size,
}

impl TileDescriptor {
    /// Builds the descriptor for `coord` on `grid`.
    #[must_use]
    pub fn new(coord: TileCoord, grid: &TileGrid) -> Self {
        Self {
            id: TileId::of(coord),
            center: grid.tile_center(coord),
            size: grid.tile_size(),
        }
    }

    /// The tile coordinate.
    #[must_use]
    pub fn coord(&self) -> TileCoord {
        self.id.coord()
    }

    /// Tile width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.size.width
    }

    /// Tile height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.size.height
    }

    /// World-space rectangle covered by the tile.
    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    /// Where the tile's center lands on screen for a given camera position.
    ///
    /// This is `center - camera`: the renderer translates the whole plane
    /// opposite to camera motion.
    #[must_use]
    pub fn screen_position(&self, camera: Vec2) -> Point {
        self.center - camera
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

use kurbo::{Point, Rect, Size, Vec2};
use smallvec::SmallVec;

use crate::descriptor::{TileDescriptor, TileId};
use crate::error::GridError;
use crate::geometry::{TileCoord, TileRange};
use crate::mapper::TileGrid;

// Pointer-sized so the crate builds on every target with atomic `usize`,
// including 32-bit ones that lack 64-bit atomics.
static NEXT_GRID_ID: AtomicUsize = AtomicUsize::new(1);

/// Opaque identity of a [`GridEngine`] instance.
///
/// Every constructed engine gets a fresh id. When the id of the engine a host
/// renders from changes, all mounted tiles must be discarded and recreated:
/// [`TileId`]s from different instances are not comparable.
///
/// Ids come from a process-wide counter of pointer width, so on 32-bit
/// targets they repeat after 2³² constructions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(u64);

impl GridId {
    fn next() -> Self {
        Self(NEXT_GRID_ID.fetch_add(1, Ordering::Relaxed) as u64)
    }

    /// Raw numeric value of the id.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "grid#{}", self.0)
    }
}

/// Construction options for a [`GridEngine`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GridOptions {
    /// Extra rings of tiles materialized beyond strict viewport overlap.
    ///
    /// A margin hides popping during continuous motion. It does not guarantee
    /// coverage across instantaneous jumps larger than the margin.
    pub margin: u32,
}

impl GridOptions {
    /// Default margin: one ring of tiles around the viewport.
    pub const DEFAULT_MARGIN: u32 = 1;

    /// Largest accepted margin.
    ///
    /// An engine materializes at least `(2 * margin + 1)²` tiles, so this caps
    /// a single instance at a few tens of thousands of descriptors.
    pub const MAX_MARGIN: u32 = 64;

    /// Options with the default margin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            margin: Self::DEFAULT_MARGIN,
        }
    }

    /// Returns these options with `margin` replaced.
    #[must_use]
    pub const fn with_margin(mut self, margin: u32) -> Self {
        self.margin = margin;
        self
    }
}

impl Default for GridOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Membership change of the visible tile set.
///
/// Produced by [`GridEngine::set_camera_position`] only when at least one tile
/// entered or left visibility.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileSetChange {
    /// Engine instance the change belongs to.
    pub grid: GridId,
    /// Engine revision after the change.
    pub revision: u64,
    /// Tiles that became visible, in row-major order.
    pub entered: SmallVec<[TileCoord; 8]>,
    /// Tiles that are no longer visible, in row-major order.
    pub exited: SmallVec<[TileCoord; 8]>,
}

/// Virtualization engine for one infinitely tiled piece of content.
///
/// The engine owns a camera position (the world-space point shown at the
/// viewport center) and derives from it the set of tiles that must be
/// materialized. Tiles are exactly one content size apart, so the tile size
/// equals the viewport size the engine was built with. That size is fixed for
/// the lifetime of the instance; a new size requires a new engine (see
/// [`GridSlot`](crate::GridSlot)).
///
/// Camera motion never moves a tile in world space. It only changes which
/// tiles are visible. Renderers position each tile at
/// [`TileDescriptor::center`] and translate the whole plane by
/// [`GridEngine::screen_offset`].
///
/// ```rust
/// use kurbo::{Size, Vec2};
/// use understory_infinite_grid::{GridEngine, GridOptions, TileCoord};
///
/// let options = GridOptions::new().with_margin(0);
/// let mut grid = GridEngine::with_options(Size::new(100.0, 100.0), options).unwrap();
/// assert_eq!(grid.items().len(), 1);
///
/// let change = grid.set_camera_position(Vec2::new(50.0, 0.0)).unwrap().unwrap();
/// assert_eq!(change.entered.as_slice(), [TileCoord::new(1, 0)]);
/// assert_eq!(grid.items().len(), 2);
/// ```
#[derive(Clone)]
pub struct GridEngine {
    id: GridId,
    viewport_size: Size,
    grid: TileGrid,
    margin: u32,
    camera: Vec2,
    visible: TileRange,
    items: Vec<TileDescriptor>,
    revision: u64,
}

impl GridEngine {
    /// Creates an engine for content of `viewport_size` with default options.
    ///
    /// The camera starts at the origin.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidViewportSize`] if a dimension is negative or not
    /// finite. A zero dimension is accepted and yields no tiles.
    /// [`GridError::MarginTooLarge`] if the margin exceeds
    /// [`GridOptions::MAX_MARGIN`].
    pub fn new(viewport_size: Size) -> Result<Self, GridError> {
        Self::with_options(viewport_size, GridOptions::default())
    }

    /// Creates an engine for content of `viewport_size`.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::new`].
    pub fn with_options(viewport_size: Size, options: GridOptions) -> Result<Self, GridError> {
        validate_size(viewport_size)?;
        if options.margin > GridOptions::MAX_MARGIN {
            log::warn!("rejected margin {}", options.margin);
            return Err(GridError::MarginTooLarge {
                margin: options.margin,
                max: GridOptions::MAX_MARGIN,
            });
        }
        let grid = TileGrid::centered(viewport_size);
        let camera = Vec2::ZERO;
        let visible = Self::range_for(&grid, viewport_size, camera, options.margin);
        let items = visible
            .iter()
            .map(|coord| TileDescriptor::new(coord, &grid))
            .collect();
        let engine = Self {
            id: GridId::next(),
            viewport_size,
            grid,
            margin: options.margin,
            camera,
            visible,
            items,
            revision: 0,
        };
        log::debug!(
            "created {} for {}x{} content with margin {} ({} tiles)",
            engine.id,
            viewport_size.width,
            viewport_size.height,
            options.margin,
            engine.items.len()
        );
        Ok(engine)
    }

    /// Identity of this instance.
    #[must_use]
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Content size this instance was built for; also the tile size.
    #[must_use]
    pub fn viewport_size(&self) -> Size {
        self.viewport_size
    }

    /// Tiling geometry.
    #[must_use]
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Margin in whole tiles.
    #[must_use]
    pub fn margin(&self) -> u32 {
        self.margin
    }

    /// Current camera position.
    #[must_use]
    pub fn camera_position(&self) -> Vec2 {
        self.camera
    }

    /// Revision counter; bumps only when visible membership changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Moves the camera.
    ///
    /// Setting the current position again is a no-op. Otherwise the visible
    /// range is recomputed, and if its membership differs the returned change
    /// lists the tiles that entered and exited. Most camera ticks stay within
    /// the same range and return `Ok(None)`.
    ///
    /// # Errors
    ///
    /// [`GridError::NonFiniteCamera`] if a component is NaN or infinite; the
    /// engine state is left unchanged.
    pub fn set_camera_position(
        &mut self,
        position: Vec2,
    ) -> Result<Option<TileSetChange>, GridError> {
        if !(position.x.is_finite() && position.y.is_finite()) {
            log::warn!("{}: rejected camera position {position:?}", self.id);
            return Err(GridError::NonFiniteCamera {
                x: position.x,
                y: position.y,
            });
        }
        if position == self.camera {
            return Ok(None);
        }
        self.camera = position;

        let visible = Self::range_for(&self.grid, self.viewport_size, position, self.margin);
        if visible == self.visible {
            return Ok(None);
        }

        let entered: SmallVec<[TileCoord; 8]> = visible.difference(&self.visible).collect();
        let exited: SmallVec<[TileCoord; 8]> = self.visible.difference(&visible).collect();
        self.visible = visible;

        self.items.retain(|item| visible.contains(item.coord()));
        let grid = self.grid;
        self.items
            .extend(entered.iter().map(|&coord| TileDescriptor::new(coord, &grid)));
        self.items
            .sort_unstable_by_key(|item| (item.coord().row, item.coord().col));

        self.revision = self.revision.wrapping_add(1);
        log::trace!(
            "{} rev {}: +{} -{} tiles, {} visible",
            self.id,
            self.revision,
            entered.len(),
            exited.len(),
            self.items.len()
        );
        Ok(Some(TileSetChange {
            grid: self.id,
            revision: self.revision,
            entered,
            exited,
        }))
    }

    /// Moves the camera by `delta`.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::set_camera_position`].
    pub fn pan_by(&mut self, delta: Vec2) -> Result<Option<TileSetChange>, GridError> {
        self.set_camera_position(self.camera + delta)
    }

    /// Visible tile descriptors in row-major order.
    ///
    /// Membership changes as the camera moves; key per-tile state by
    /// [`TileDescriptor::id`], never by position in this slice.
    #[must_use]
    pub fn items(&self) -> &[TileDescriptor] {
        &self.items
    }

    /// Range of visible tile coordinates, margin included.
    #[must_use]
    pub fn visible_range(&self) -> TileRange {
        self.visible
    }

    /// Returns `true` if the tile at `coord` is currently materialized.
    #[must_use]
    pub fn is_visible(&self, coord: TileCoord) -> bool {
        self.visible.contains(coord)
    }

    /// Descriptor for `id`, if that tile is currently visible.
    #[must_use]
    pub fn descriptor(&self, id: TileId) -> Option<&TileDescriptor> {
        if !self.visible.contains(id.coord()) {
            return None;
        }
        let key = (id.coord().row, id.coord().col);
        self.items
            .binary_search_by_key(&key, |item| (item.coord().row, item.coord().col))
            .ok()
            .map(|index| &self.items[index])
    }

    /// World-space rectangle shown by the viewport, without margin.
    #[must_use]
    pub fn visible_world_rect(&self) -> Rect {
        Rect::from_center_size(self.camera.to_point(), self.viewport_size)
    }

    /// Whole-scene translation the renderer applies: `-camera`.
    #[must_use]
    pub fn screen_offset(&self) -> Vec2 {
        -self.camera
    }

    /// Screen position of a tile's center under the current camera.
    #[must_use]
    pub fn screen_position(&self, item: &TileDescriptor) -> Point {
        item.screen_position(self.camera)
    }

    /// Snapshot of the engine state for debugging and inspection.
    #[must_use]
    pub fn debug_info(&self) -> GridEngineDebugInfo {
        GridEngineDebugInfo {
            id: self.id,
            viewport_size: self.viewport_size,
            camera: self.camera,
            margin: self.margin,
            visible_range: self.visible,
            visible_world_rect: self.visible_world_rect(),
            tile_count: self.items.len(),
            revision: self.revision,
        }
    }

    fn range_for(grid: &TileGrid, viewport_size: Size, camera: Vec2, margin: u32) -> TileRange {
        grid.visible_range_around(camera.to_point(), viewport_size, margin)
    }
}

impl fmt::Debug for GridEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridEngine")
            .field("id", &self.id)
            .field("viewport_size", &self.viewport_size)
            .field("grid", &self.grid)
            .field("margin", &self.margin)
            .field("camera", &self.camera)
            .field("visible", &self.visible)
            .field("items", &self.items.len())
            .field("revision", &self.revision)
            .finish()
    }
}

/// Debug snapshot of a [`GridEngine`] state.
#[derive(Clone, Copy, Debug)]
pub struct GridEngineDebugInfo {
    /// Instance id.
    pub id: GridId,
    /// Content size, also the tile size.
    pub viewport_size: Size,
    /// Current camera position.
    pub camera: Vec2,
    /// Margin in whole tiles.
    pub margin: u32,
    /// Visible coordinate range, margin included.
    pub visible_range: TileRange,
    /// World-space rectangle shown by the viewport.
    pub visible_world_rect: Rect,
    /// Number of materialized tiles.
    pub tile_count: usize,
    /// Membership revision.
    pub revision: u64,
}

pub(crate) fn validate_size(size: Size) -> Result<(), GridError> {
    let ok = |v: f64| v.is_finite() && v >= 0.0;
    if ok(size.width) && ok(size.height) {
        Ok(())
    } else {
        log::warn!("rejected viewport size {size:?}");
        Err(GridError::InvalidViewportSize {
            width: size.width,
            height: size.height,
        })
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use kurbo::{Point, Rect, Size, Vec2};

    use super::{GridEngine, GridOptions};
    use crate::descriptor::TileId;
    use crate::error::GridError;
    use crate::geometry::TileCoord;

    const HUNDRED: Size = Size::new(100.0, 100.0);

    fn engine(margin: u32) -> GridEngine {
        GridEngine::with_options(HUNDRED, GridOptions::new().with_margin(margin)).unwrap()
    }

    fn coords(engine: &GridEngine) -> Vec<(i64, i64)> {
        engine
            .items()
            .iter()
            .map(|item| (item.coord().col, item.coord().row))
            .collect()
    }

    #[test]
    fn starts_at_origin_with_origin_tile() {
        let e = engine(0);
        assert_eq!(e.camera_position(), Vec2::ZERO);
        assert_eq!(coords(&e), [(0, 0)]);
        assert_eq!(e.revision(), 0);
        assert_eq!(e.items()[0].center, Point::ZERO);
        assert_eq!(e.items()[0].size, HUNDRED);
    }

    #[test]
    fn concrete_pan_scenario() {
        let mut e = engine(0);

        let change = e.set_camera_position(Vec2::new(100.0, 0.0)).unwrap().unwrap();
        assert_eq!(coords(&e), [(1, 0)]);
        assert_eq!(change.entered.as_slice(), [TileCoord::new(1, 0)]);
        assert_eq!(change.exited.as_slice(), [TileCoord::ORIGIN]);
        assert!(e.descriptor(TileId::of(TileCoord::ORIGIN)).is_none());

        let change = e.set_camera_position(Vec2::new(50.0, 0.0)).unwrap().unwrap();
        assert_eq!(coords(&e), [(0, 0), (1, 0)]);
        assert_eq!(change.entered.as_slice(), [TileCoord::ORIGIN]);
        assert!(change.exited.is_empty());
        assert_eq!(e.revision(), 2);
    }

    #[test]
    fn same_position_is_a_no_op() {
        let mut e = engine(1);
        assert!(e.set_camera_position(Vec2::new(10.0, 0.0)).unwrap().is_some());
        let before = e.debug_info();
        assert!(e.set_camera_position(Vec2::new(10.0, 0.0)).unwrap().is_none());
        assert_eq!(e.revision(), before.revision);
        assert_eq!(e.visible_range(), before.visible_range);
    }

    #[test]
    fn small_moves_do_not_change_membership() {
        let mut e = engine(1);
        // Straddle the boundary between columns 0 and 1, then wiggle inside it.
        e.set_camera_position(Vec2::new(50.0, 0.0)).unwrap();
        let revision = e.revision();
        for step in 1..10 {
            let pos = Vec2::new(50.0 + f64::from(step) * 0.5, 0.0);
            assert!(e.set_camera_position(pos).unwrap().is_none());
        }
        assert_eq!(e.camera_position(), Vec2::new(54.5, 0.0));
        assert_eq!(e.revision(), revision);
    }

    #[test]
    fn geometry_is_independent_of_camera() {
        let mut e = engine(1);
        let id = TileId::of(TileCoord::new(1, 1));
        let before = *e.descriptor(id).unwrap();
        e.set_camera_position(Vec2::new(60.0, 40.0)).unwrap();
        let after = *e.descriptor(id).unwrap();
        assert_eq!(before, after);
        assert_eq!(
            e.screen_position(&after),
            Point::new(40.0, 60.0),
            "screen position is center minus camera"
        );
        assert_eq!(e.screen_offset(), Vec2::new(-60.0, -40.0));
    }

    #[test]
    fn non_finite_camera_is_rejected_without_side_effects() {
        let mut e = engine(1);
        e.set_camera_position(Vec2::new(30.0, 0.0)).unwrap();
        let err = e.set_camera_position(Vec2::new(f64::NAN, 0.0)).unwrap_err();
        assert!(matches!(err, GridError::NonFiniteCamera { .. }));
        assert!(
            e.set_camera_position(Vec2::new(0.0, f64::INFINITY))
                .is_err()
        );
        assert_eq!(e.camera_position(), Vec2::new(30.0, 0.0));
        assert_eq!(e.items().len(), 12);
    }

    #[test]
    fn invalid_sizes_are_rejected() {
        assert!(matches!(
            GridEngine::new(Size::new(-1.0, 10.0)),
            Err(GridError::InvalidViewportSize { .. })
        ));
        assert!(GridEngine::new(Size::new(10.0, f64::NAN)).is_err());
        assert!(GridEngine::new(Size::new(f64::INFINITY, 10.0)).is_err());
    }

    #[test]
    fn zero_area_viewport_has_no_items() {
        let mut e = GridEngine::new(Size::new(0.0, 100.0)).unwrap();
        assert!(e.items().is_empty());
        assert!(e.set_camera_position(Vec2::new(500.0, 0.0)).unwrap().is_none());
        assert!(e.items().is_empty());
    }

    #[test]
    fn ids_are_unique_per_construction() {
        let a = GridEngine::new(HUNDRED).unwrap();
        let b = GridEngine::new(HUNDRED).unwrap();
        assert_ne!(a.id(), b.id());
        assert!(a.id().get() < b.id().get(), "ids increase within a thread");
    }

    #[test]
    fn far_camera_keeps_a_full_ring() {
        let mut e = engine(1);
        let change = e.set_camera_position(Vec2::new(1e20, 0.0)).unwrap().unwrap();
        assert_eq!(e.items().len(), 9);
        assert_eq!(change.exited.len(), 9);
        let under_camera = TileCoord::new(1_000_000_000_000_000_000, 0);
        assert!(e.is_visible(under_camera));
        assert!(e.descriptor(TileId::of(under_camera)).is_some());
    }

    #[test]
    fn oversized_margin_is_rejected() {
        let err = GridEngine::with_options(HUNDRED, GridOptions::new().with_margin(u32::MAX))
            .unwrap_err();
        assert_eq!(
            err,
            GridError::MarginTooLarge {
                margin: u32::MAX,
                max: GridOptions::MAX_MARGIN,
            }
        );
        let over = GridOptions::new().with_margin(GridOptions::MAX_MARGIN + 1);
        assert!(GridEngine::with_options(HUNDRED, over).is_err());
    }

    #[test]
    fn largest_margin_is_accepted() {
        let e = engine(GridOptions::MAX_MARGIN);
        let side = 2 * GridOptions::MAX_MARGIN as usize + 1;
        assert_eq!(e.items().len(), side * side);
    }

    #[test]
    fn descriptor_lookup_follows_membership() {
        let mut e = engine(2);
        for pos in [(130.0, -70.0), (-260.0, 15.0), (45.0, 410.0)] {
            e.set_camera_position(Vec2::new(pos.0, pos.1)).unwrap();
            for item in e.items() {
                assert_eq!(e.descriptor(item.id), Some(item));
            }
            let range = e.visible_range();
            for coord in range.expand(1).difference(&range) {
                assert!(e.descriptor(TileId::of(coord)).is_none());
            }
        }
    }

    #[test]
    fn pan_by_accumulates() {
        let mut e = engine(0);
        e.pan_by(Vec2::new(30.0, 0.0)).unwrap();
        e.pan_by(Vec2::new(30.0, -10.0)).unwrap();
        assert_eq!(e.camera_position(), Vec2::new(60.0, -10.0));
        assert_eq!(
            e.visible_world_rect(),
            Rect::new(10.0, -60.0, 110.0, 40.0)
        );
        assert_eq!(coords(&e), [(0, -1), (1, -1), (0, 0), (1, 0)]);
    }

    #[test]
    fn teleport_replaces_everything() {
        let mut e = engine(1);
        let change = e
            .set_camera_position(Vec2::new(10_000.0, 10_000.0))
            .unwrap()
            .unwrap();
        assert_eq!(change.exited.len(), 9);
        assert_eq!(change.entered.len(), e.items().len());
        assert!(e.is_visible(TileCoord::new(100, 100)));
        assert!(!e.is_visible(TileCoord::ORIGIN));
    }
}

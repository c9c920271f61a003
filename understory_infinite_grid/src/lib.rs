// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_infinite_grid --heading-base-level=0

//! Understory Infinite Grid: virtualization for an infinitely tiled plane.
//!
//! A single piece of content is conceptually repeated forever in both axes. A
//! camera position selects which finite set of repetitions ("tiles") must be
//! materialized. This crate is the headless engine behind that: it tracks the
//! camera, derives the visible tiles with a margin, and gives every tile an
//! identity tied to its grid coordinate so animated transitions stay
//! continuous while the camera moves.
//!
//! The core pieces are:
//!
//! - [`TileCoord`] / [`TileRange`]: integer tile coordinates and rectangular
//!   sets of them. Continuous values use Kurbo's `Vec2`, `Point` and `Size`.
//! - [`TileGrid`] and [`visible_coordinates`]: map a world-space viewport to
//!   the tiles overlapping it.
//! - [`GridEngine`]: owns the camera and the visible [`TileDescriptor`] list,
//!   and reports [`TileSetChange`]s when membership changes.
//! - [`GridSlot`]: rebuilds the engine, with a fresh [`GridId`], whenever the
//!   measured content size changes.
//! - [`ObservableGrid`]: lets camera producers push positions at frame rate
//!   while [`TileSetObserver`]s only hear about membership changes.
//!
//! It does **not** capture input, animate the camera, measure content, or
//! draw anything. Hosts are expected to:
//!
//! - Measure the content and feed the size to [`GridSlot::set_content_size`]
//!   (or [`ObservableGrid::set_content_size`]), debouncing resizes.
//! - Push camera positions from their gesture/spring layer.
//! - Mount one visual per [`TileDescriptor`], keyed by [`TileId`], positioned
//!   at [`TileDescriptor::center`], and translate the whole scene by
//!   [`GridEngine::screen_offset`].
//! - Unmount everything when the [`GridId`] changes.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::{Size, Vec2};
//! use understory_infinite_grid::{GridEngine, GridOptions, TileCoord, TileId};
//!
//! let mut grid =
//!     GridEngine::with_options(Size::new(100.0, 100.0), GridOptions::new().with_margin(0))
//!         .unwrap();
//!
//! // The viewport exactly covers the origin tile.
//! assert_eq!(grid.items().len(), 1);
//!
//! // Straddle the boundary with the next column.
//! grid.set_camera_position(Vec2::new(50.0, 0.0)).unwrap();
//! let ids: Vec<TileId> = grid.items().iter().map(|item| item.id).collect();
//! assert_eq!(ids, [TileId::of(TileCoord::new(0, 0)), TileId::of(TileCoord::new(1, 0))]);
//!
//! // Tiles never move in world space; the renderer offsets the scene instead.
//! let item = grid.items()[1];
//! assert_eq!(grid.screen_position(&item).x, 50.0);
//! ```
//!
//! ## Invalid input
//!
//! Non-finite camera positions, negative or non-finite sizes, and margins above
//! [`GridOptions::MAX_MARGIN`] are rejected with a [`GridError`] and leave the
//! previous state untouched. Zero-area
//! content is valid and simply has no tiles.
//!
//! This crate is `no_std` and uses `alloc`. It needs pointer-sized atomics
//! for [`GridId`] allocation.

#![no_std]

extern crate alloc;

mod binder;
mod descriptor;
mod engine;
mod error;
mod geometry;
mod lifecycle;
mod mapper;

pub use binder::{ObservableGrid, SubscriptionId, TileSetObserver};
pub use descriptor::{TileDescriptor, TileId};
pub use engine::{GridEngine, GridEngineDebugInfo, GridId, GridOptions, TileSetChange};
pub use error::GridError;
pub use geometry::{TileCoord, TileRange, TileRangeIter};
pub use lifecycle::{GridSlot, SlotUpdate};
pub use mapper::{TileGrid, visible_coordinates};

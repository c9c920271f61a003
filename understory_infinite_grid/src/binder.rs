// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observable wrapper connecting camera producers to tile consumers.
//!
//! [`ObservableGrid`] separates two update rates:
//!
//! - Camera producers (springs, drag handlers, wheel handlers) push positions
//!   as often as they like, typically every animation frame.
//! - Subscribed [`TileSetObserver`]s hear about it only when the visible tile
//!   set gains or loses members, or when the engine instance is replaced.
//!
//! Most camera ticks are therefore absorbed by the renderer as a plain
//! whole-scene translation ([`ObservableGrid::screen_offset`]) with no tile
//! work at all.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! use kurbo::{Size, Vec2};
//! use understory_infinite_grid::{GridOptions, ObservableGrid, TileSetChange};
//!
//! let mut grid = ObservableGrid::new(GridOptions::new().with_margin(0));
//! grid.set_content_size(Size::new(100.0, 100.0)).unwrap();
//!
//! let changes = Rc::new(Cell::new(0));
//! let seen = changes.clone();
//! grid.subscribe(move |_: &TileSetChange| seen.set(seen.get() + 1));
//!
//! // The first move brings column 1 into view; the second keeps the same set.
//! grid.set_camera_position(Vec2::new(10.0, 0.0)).unwrap();
//! grid.set_camera_position(Vec2::new(20.0, 0.0)).unwrap();
//! assert_eq!(changes.get(), 1);
//! ```

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Size, Vec2};

use crate::descriptor::TileDescriptor;
use crate::engine::{GridEngine, GridId, GridOptions, TileSetChange};
use crate::error::GridError;
use crate::lifecycle::{GridSlot, SlotUpdate};

/// Receives render-relevant notifications from an [`ObservableGrid`].
pub trait TileSetObserver {
    /// Tiles entered or left the visible set of the current engine.
    fn tile_set_changed(&mut self, change: &TileSetChange);

    /// The engine was replaced; every mounted tile must be discarded and the
    /// items of `current` mounted from scratch.
    ///
    /// `previous` is `None` when content was measured for the first time.
    fn grid_replaced(&mut self, previous: Option<GridId>, current: &GridEngine) {
        let _ = (previous, current);
    }
}

impl<F> TileSetObserver for F
where
    F: FnMut(&TileSetChange),
{
    fn tile_set_changed(&mut self, change: &TileSetChange) {
        self(change);
    }
}

/// Handle returned by [`ObservableGrid::subscribe`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// A [`GridSlot`] plus subscribers.
pub struct ObservableGrid {
    slot: GridSlot,
    observers: Vec<(SubscriptionId, Box<dyn TileSetObserver>)>,
    next_subscription: u64,
}

impl ObservableGrid {
    /// Creates an unmeasured grid; engines it builds use `options`.
    #[must_use]
    pub fn new(options: GridOptions) -> Self {
        Self {
            slot: GridSlot::new(options),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Registers an observer.
    pub fn subscribe<O>(&mut self, observer: O) -> SubscriptionId
    where
        O: TileSetObserver + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes an observer. Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Number of registered observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Feeds a content measurement in.
    ///
    /// A new size replaces the engine and notifies every observer through
    /// [`TileSetObserver::grid_replaced`].
    ///
    /// # Errors
    ///
    /// See [`GridSlot::set_content_size`].
    pub fn set_content_size(&mut self, size: Size) -> Result<SlotUpdate, GridError> {
        let update = self.slot.set_content_size(size)?;
        if let SlotUpdate::Replaced { previous, .. } = update
            && let Some(engine) = self.slot.engine()
        {
            for (_, observer) in &mut self.observers {
                observer.grid_replaced(previous, engine);
            }
        }
        Ok(update)
    }

    /// Pushes a new camera position.
    ///
    /// Returns `true` if the visible set changed and observers were notified.
    /// Before the content has been measured there is no engine and the push is
    /// dropped; a freshly created engine always starts at the origin.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::set_camera_position`].
    pub fn set_camera_position(&mut self, position: Vec2) -> Result<bool, GridError> {
        let Some(engine) = self.slot.engine_mut() else {
            log::trace!("camera update {position:?} dropped: content not measured");
            return Ok(false);
        };
        let Some(change) = engine.set_camera_position(position)? else {
            return Ok(false);
        };
        for (_, observer) in &mut self.observers {
            observer.tile_set_changed(&change);
        }
        Ok(true)
    }

    /// Pushes only the x component, keeping the current y.
    ///
    /// Suits producers that animate each axis independently.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::set_camera_position`].
    pub fn set_camera_x(&mut self, x: f64) -> Result<bool, GridError> {
        match self.camera_position() {
            Some(camera) => self.set_camera_position(Vec2::new(x, camera.y)),
            None => Ok(false),
        }
    }

    /// Pushes only the y component, keeping the current x.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::set_camera_position`].
    pub fn set_camera_y(&mut self, y: f64) -> Result<bool, GridError> {
        match self.camera_position() {
            Some(camera) => self.set_camera_position(Vec2::new(camera.x, y)),
            None => Ok(false),
        }
    }

    /// Moves the camera by `delta`.
    ///
    /// # Errors
    ///
    /// See [`GridEngine::set_camera_position`].
    pub fn pan_by(&mut self, delta: Vec2) -> Result<bool, GridError> {
        match self.camera_position() {
            Some(camera) => self.set_camera_position(camera + delta),
            None => Ok(false),
        }
    }

    /// The current engine, if content has been measured.
    #[must_use]
    pub fn engine(&self) -> Option<&GridEngine> {
        self.slot.engine()
    }

    /// Id of the current engine.
    #[must_use]
    pub fn id(&self) -> Option<GridId> {
        self.slot.id()
    }

    /// Current camera position, if content has been measured.
    #[must_use]
    pub fn camera_position(&self) -> Option<Vec2> {
        self.slot.engine().map(GridEngine::camera_position)
    }

    /// Visible tiles; empty before measurement.
    #[must_use]
    pub fn items(&self) -> &[TileDescriptor] {
        self.slot.items()
    }

    /// Whole-scene translation for the renderer: `-camera`, or zero before
    /// measurement.
    #[must_use]
    pub fn screen_offset(&self) -> Vec2 {
        self.slot
            .engine()
            .map_or(Vec2::ZERO, GridEngine::screen_offset)
    }
}

impl Default for ObservableGrid {
    fn default() -> Self {
        Self::new(GridOptions::default())
    }
}

impl fmt::Debug for ObservableGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableGrid")
            .field("slot", &self.slot)
            .field("observers", &self.observers.len())
            .field("next_subscription", &self.next_subscription)
            .finish()
    }
}

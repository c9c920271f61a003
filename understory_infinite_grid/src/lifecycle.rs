// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine instance lifecycle: when to rebuild versus update.
//!
//! A [`GridEngine`]'s viewport size is fixed at construction, because the tile
//! size is derived from it. [`GridSlot`] holds the engine for one piece of
//! content and replaces it, with a fresh [`GridId`] and the camera back at the
//! origin, whenever the measured content size changes. Hosts should treat a
//! replacement as "unmount every tile, then mount the new instance's items".
//!
//! Resize measurements are expected to be debounced by the caller; the slot
//! rebuilds on every distinct size it is given.

use kurbo::Size;

use crate::descriptor::TileDescriptor;
use crate::engine::{GridEngine, GridId, GridOptions, validate_size};
use crate::error::GridError;

/// Outcome of [`GridSlot::set_content_size`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SlotUpdate {
    /// The size matched the current engine; nothing changed.
    Unchanged,
    /// A new engine was created.
    Replaced {
        /// The discarded instance, or `None` on first measurement.
        previous: Option<GridId>,
        /// The new instance.
        current: GridId,
    },
}

/// Holds at most one [`GridEngine`] for a piece of content.
#[derive(Clone, Debug, Default)]
pub struct GridSlot {
    options: GridOptions,
    engine: Option<GridEngine>,
}

impl GridSlot {
    /// Creates an empty slot; engines it builds use `options`.
    #[must_use]
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            engine: None,
        }
    }

    /// Options used for every engine this slot builds.
    #[must_use]
    pub fn options(&self) -> GridOptions {
        self.options
    }

    /// Feeds a content measurement into the slot.
    ///
    /// # Errors
    ///
    /// [`GridError::InvalidViewportSize`] for negative or non-finite sizes, and
    /// [`GridError::MarginTooLarge`] when the slot's options carry a margin the
    /// engine refuses. The current engine, if any, is kept.
    pub fn set_content_size(&mut self, size: Size) -> Result<SlotUpdate, GridError> {
        validate_size(size)?;
        if let Some(engine) = &self.engine
            && engine.viewport_size() == size
        {
            return Ok(SlotUpdate::Unchanged);
        }
        let next = GridEngine::with_options(size, self.options)?;
        let current = next.id();
        let previous = self.engine.replace(next).map(|old| old.id());
        if let Some(previous) = previous {
            log::debug!("content resized to {size:?}: {previous} replaced by {current}");
        }
        Ok(SlotUpdate::Replaced { previous, current })
    }

    /// The current engine, if content has been measured.
    #[must_use]
    pub fn engine(&self) -> Option<&GridEngine> {
        self.engine.as_ref()
    }

    /// Mutable access to the current engine.
    pub fn engine_mut(&mut self) -> Option<&mut GridEngine> {
        self.engine.as_mut()
    }

    /// Id of the current engine.
    #[must_use]
    pub fn id(&self) -> Option<GridId> {
        self.engine.as_ref().map(GridEngine::id)
    }

    /// Visible tiles of the current engine; empty before measurement.
    #[must_use]
    pub fn items(&self) -> &[TileDescriptor] {
        match &self.engine {
            Some(engine) => engine.items(),
            None => &[],
        }
    }
}

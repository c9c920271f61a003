// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Input rejected by the grid.
///
/// Every operation that can fail leaves the previous state untouched.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GridError {
    /// A camera position with a NaN or infinite component.
    NonFiniteCamera {
        /// Rejected x component.
        x: f64,
        /// Rejected y component.
        y: f64,
    },
    /// A viewport size that is negative or not finite.
    InvalidViewportSize {
        /// Rejected width.
        width: f64,
        /// Rejected height.
        height: f64,
    },
    /// A margin above [`GridOptions::MAX_MARGIN`](crate::GridOptions::MAX_MARGIN).
    MarginTooLarge {
        /// Rejected margin.
        margin: u32,
        /// Largest accepted margin.
        max: u32,
    },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonFiniteCamera { x, y } => {
                write!(f, "camera position ({x}, {y}) is not finite")
            }
            Self::InvalidViewportSize { width, height } => {
                write!(
                    f,
                    "viewport size {width}x{height} must be finite and non-negative"
                )
            }
            Self::MarginTooLarge { margin, max } => {
                write!(f, "margin {margin} exceeds the maximum of {max} tiles")
            }
        }
    }
}

impl core::error::Error for GridError {}

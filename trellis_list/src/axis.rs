// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Main/secondary axis selection.
//!
//! A vertical list scrolls along Y (main axis Y, secondary X); a
//! horizontal list swaps them. Everything orientation-specific in the
//! list reduces to these few accessors, so one `List` type serves both
//! orientations.

use kurbo::{Point, Rect, Size};

use trellis_element::element::{FULL_EXTENT, Limits};

/// Size limits along the secondary (cross) axis of a list.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AxisLimits {
    /// Smallest acceptable cross-axis extent.
    pub min: f64,
    /// Largest acceptable cross-axis extent.
    pub max: f64,
}

impl AxisLimits {
    /// Any extent from zero to [`FULL_EXTENT`].
    pub const FULL: Self = Self {
        min: 0.0,
        max: FULL_EXTENT,
    };

    /// Zero extent (used for empty lists).
    pub const NONE: Self = Self { min: 0.0, max: 0.0 };
}

impl Default for AxisLimits {
    fn default() -> Self {
        Self::FULL
    }
}

/// The scroll/layout direction of a list.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Main axis Y: rows stacked top to bottom.
    Vertical,
    /// Main axis X: columns laid out left to right.
    Horizontal,
}

impl Axis {
    /// Leading edge of `r` along the main axis.
    #[must_use]
    pub const fn main_start(self, r: Rect) -> f64 {
        match self {
            Self::Vertical => r.y0,
            Self::Horizontal => r.x0,
        }
    }

    /// Trailing edge of `r` along the main axis.
    #[must_use]
    pub const fn main_end(self, r: Rect) -> f64 {
        match self {
            Self::Vertical => r.y1,
            Self::Horizontal => r.x1,
        }
    }

    /// Extent of `r` along the main axis.
    #[must_use]
    pub const fn main_extent(self, r: Rect) -> f64 {
        self.main_end(r) - self.main_start(r)
    }

    /// The main-axis coordinate of `p`.
    #[must_use]
    pub const fn main_pos(self, p: Point) -> f64 {
        match self {
            Self::Vertical => p.y,
            Self::Horizontal => p.x,
        }
    }

    /// Carve a cell's rectangle out of the list bounds: the cell occupies
    /// `[pos, pos + extent)` along the main axis (relative to the list's
    /// leading edge) and the full cross extent.
    #[must_use]
    pub fn cell_bounds(self, bounds: Rect, pos: f64, extent: f64) -> Rect {
        match self {
            Self::Vertical => Rect::new(
                bounds.x0,
                bounds.y0 + pos,
                bounds.x1,
                bounds.y0 + pos + extent,
            ),
            Self::Horizontal => Rect::new(
                bounds.x0 + pos,
                bounds.y0,
                bounds.x0 + pos + extent,
                bounds.y1,
            ),
        }
    }

    /// Combine a fixed main-axis size with secondary-axis limits.
    #[must_use]
    pub fn make_limits(self, main: f64, secondary: AxisLimits) -> Limits {
        match self {
            Self::Vertical => Limits {
                min: Size::new(secondary.min, main),
                max: Size::new(secondary.max, main),
            },
            Self::Horizontal => Limits {
                min: Size::new(main, secondary.min),
                max: Size::new(main, secondary.max),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_cell_bounds_stack_downward() {
        let bounds = Rect::new(10.0, 100.0, 110.0, 500.0);
        let cell = Axis::Vertical.cell_bounds(bounds, 40.0, 25.0);
        assert_eq!(cell, Rect::new(10.0, 140.0, 110.0, 165.0));
    }

    #[test]
    fn horizontal_cell_bounds_run_rightward() {
        let bounds = Rect::new(10.0, 100.0, 110.0, 500.0);
        let cell = Axis::Horizontal.cell_bounds(bounds, 40.0, 25.0);
        assert_eq!(cell, Rect::new(50.0, 100.0, 75.0, 500.0));
    }

    #[test]
    fn limits_place_main_size_on_the_right_axis() {
        let sec = AxisLimits {
            min: 50.0,
            max: 200.0,
        };
        let v = Axis::Vertical.make_limits(300.0, sec);
        assert_eq!(v.min, Size::new(50.0, 300.0));
        assert_eq!(v.max, Size::new(200.0, 300.0));

        let h = Axis::Horizontal.make_limits(300.0, sec);
        assert_eq!(h.min, Size::new(300.0, 50.0));
        assert_eq!(h.max, Size::new(300.0, 200.0));
    }
}

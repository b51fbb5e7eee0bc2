// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell composition: the contract through which application code supplies
//! list content on demand.
//!
//! A [`CellComposer`] answers how many cells exist, builds the element for
//! any index, and sizes cells along both axes. `compose(i)` must be
//! callable for any `0 <= i < len()` at any time and is free to allocate a
//! fresh element on every call — caching materialized cells is the list's
//! job, not the composer's.
//!
//! Composers are assembled from two halves: a [`CellContent`] (count,
//! resize, compose) and a sizing wrapper — [`WithLimits`] for known sizes,
//! [`DerivedLimits`] to probe the first cell once and reuse its metrics.

use trellis_element::context::Context;
use trellis_element::element::{Element, ElementBox};

use crate::axis::{Axis, AxisLimits};

/// Supplies list content on demand.
///
/// Sizing queries take `&mut self` so implementations may maintain caches
/// (see [`DerivedLimits`]).
pub trait CellComposer {
    /// Number of cells.
    fn len(&self) -> usize;

    /// Whether there are no cells.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Grow or shrink the backing content to `n` cells.
    fn resize(&mut self, n: usize);

    /// Build the element for cell `index`.
    ///
    /// `index` must be in `0..len()`; anything else is a programming
    /// error on the caller's side.
    fn compose(&mut self, index: usize) -> ElementBox;

    /// Size limits along the list's secondary (cross) axis.
    fn secondary_axis_limits(&mut self, ctx: &Context<'_>) -> AxisLimits;

    /// Extent of cell `index` along the list's main axis.
    fn main_axis_size(&mut self, index: usize, ctx: &Context<'_>) -> f64;
}

/// The content half of a composer: count, resize, and composition.
pub trait CellContent {
    /// Number of cells.
    fn len(&self) -> usize;

    /// Grow or shrink to `n` cells.
    fn resize(&mut self, n: usize);

    /// Build the element for cell `index`.
    fn compose(&mut self, index: usize) -> ElementBox;
}

/// Content backed by a cell count and a compose closure.
pub struct FnContent<F> {
    len: usize,
    compose: F,
}

impl<F> core::fmt::Debug for FnContent<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FnContent")
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(usize) -> ElementBox> FnContent<F> {
    /// `len` cells, each built by `compose`.
    #[must_use]
    pub fn new(len: usize, compose: F) -> Self {
        Self { len, compose }
    }
}

impl<F: FnMut(usize) -> ElementBox> CellContent for FnContent<F> {
    fn len(&self) -> usize {
        self.len
    }

    fn resize(&mut self, n: usize) {
        self.len = n;
    }

    fn compose(&mut self, index: usize) -> ElementBox {
        debug_assert!(index < self.len, "compose past the composer length");
        (self.compose)(index)
    }
}

/// A composer with statically known cell metrics.
#[derive(Debug)]
pub struct WithLimits<C> {
    content: C,
    main_axis_size: f64,
    secondary: AxisLimits,
}

impl<C: CellContent> WithLimits<C> {
    /// Every cell is `main_axis_size` long; the cross axis accepts
    /// `secondary`.
    #[must_use]
    pub fn new(content: C, main_axis_size: f64, secondary: AxisLimits) -> Self {
        Self {
            content,
            main_axis_size,
            secondary,
        }
    }
}

impl<C: CellContent> CellComposer for WithLimits<C> {
    fn len(&self) -> usize {
        self.content.len()
    }

    fn resize(&mut self, n: usize) {
        self.content.resize(n);
    }

    fn compose(&mut self, index: usize) -> ElementBox {
        self.content.compose(index)
    }

    fn secondary_axis_limits(&mut self, _ctx: &Context<'_>) -> AxisLimits {
        self.secondary
    }

    fn main_axis_size(&mut self, _index: usize, _ctx: &Context<'_>) -> f64 {
        self.main_axis_size
    }
}

#[derive(Copy, Clone, Debug)]
struct Derived {
    main: f64,
    secondary: AxisLimits,
}

/// A composer that derives fixed cell metrics from the first cell.
///
/// The probe composes cell 0 once, reads its limits, and caches the
/// result: for a vertical list the cross limits come from the probe's
/// width limits and the main size from its minimum height (swapped for
/// horizontal lists).
///
/// An empty composer yields [`AxisLimits::NONE`] and zero main size
/// instead of probing — index-0 derivation is only defined for non-empty
/// content, and callers must not rely on it otherwise.
#[derive(Debug)]
pub struct DerivedLimits<C> {
    content: C,
    axis: Axis,
    derived: Option<Derived>,
}

impl<C: CellContent> DerivedLimits<C> {
    /// Derivation for a vertical list.
    #[must_use]
    pub fn vertical(content: C) -> Self {
        Self {
            content,
            axis: Axis::Vertical,
            derived: None,
        }
    }

    /// Derivation for a horizontal list.
    #[must_use]
    pub fn horizontal(content: C) -> Self {
        Self {
            content,
            axis: Axis::Horizontal,
            derived: None,
        }
    }

    fn derive(&mut self, ctx: &Context<'_>) -> Derived {
        if let Some(d) = self.derived {
            return d;
        }
        let d = if self.content.len() == 0 {
            Derived {
                main: 0.0,
                secondary: AxisLimits::NONE,
            }
        } else {
            let mut probe = self.content.compose(0);
            let limits = probe.limits(ctx);
            match self.axis {
                Axis::Vertical => Derived {
                    main: limits.min.height,
                    secondary: AxisLimits {
                        min: limits.min.width,
                        max: limits.max.width,
                    },
                },
                Axis::Horizontal => Derived {
                    main: limits.min.width,
                    secondary: AxisLimits {
                        min: limits.min.height,
                        max: limits.max.height,
                    },
                },
            }
        };
        self.derived = Some(d);
        d
    }
}

impl<C: CellContent> CellComposer for DerivedLimits<C> {
    fn len(&self) -> usize {
        self.content.len()
    }

    fn resize(&mut self, n: usize) {
        let was_empty = self.content.len() == 0;
        self.content.resize(n);
        if was_empty {
            // The empty-content placeholder metrics are not real.
            self.derived = None;
        }
    }

    fn compose(&mut self, index: usize) -> ElementBox {
        self.content.compose(index)
    }

    fn secondary_axis_limits(&mut self, ctx: &Context<'_>) -> AxisLimits {
        self.derive(ctx).secondary
    }

    fn main_axis_size(&mut self, _index: usize, ctx: &Context<'_>) -> f64 {
        self.derive(ctx).main
    }
}

// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=trellis_list --heading-base-level=0

//! Trellis List: a virtualized list element over lazily composed cells.
//!
//! The list keeps a per-cell table of cumulative main-axis offsets (a
//! prefix sum of cell extents) and materializes child elements only for
//! cells intersecting the current clip window:
//!
//! - [`composer::CellComposer`]: the contract through which application
//!   code supplies content on demand — cell count, per-index composition,
//!   and sizing along both axes. [`composer::FnContent`] plus
//!   [`composer::WithLimits`] / [`composer::DerivedLimits`] cover the
//!   common cases.
//! - [`axis::Axis`]: vertical and horizontal lists share one
//!   implementation; everything orientation-specific reduces to a few
//!   rect accessors.
//! - [`list::List`]: the element. Draw passes binary-search the offset
//!   table for the clip's cut-in point, materialize what is missing,
//!   re-layout only cells whose cached layout generation went stale, and
//!   evict what scrolled away. Structural mutations
//!   ([`list::List::insert`], [`list::List::erase`],
//!   [`list::List::move_to`]) queue and apply at the next sync point so
//!   the cell count stays stable during any pass.
//!
//! Dispatch (click, hover, keys, focus) comes from
//! [`trellis_element::composite::Composite`], so virtualized cells get
//! the same gesture guarantees as ordinary children: one receiver per
//! press-drag-release, balanced hover enter/leave episodes, and a
//! per-level focus chain.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod axis;
pub mod composer;
pub mod index_ops;
pub mod list;

pub use axis::{Axis, AxisLimits};
pub use composer::{CellComposer, CellContent, DerivedLimits, FnContent, WithLimits};
pub use index_ops::{erase_indices, move_indices};
pub use list::{CellRetention, List};

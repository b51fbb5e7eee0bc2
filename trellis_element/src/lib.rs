// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=trellis_element --heading-base-level=0

//! Trellis Element: the capability-based element protocol and its
//! composition machinery.
//!
//! This crate defines the tree of drawable, hit-testable, focusable UI
//! nodes at the core of Trellis:
//!
//! - [`element::Element`]: the core protocol (size negotiation, layout,
//!   draw, hit-test) plus capability traits — [`element::Pointer`],
//!   [`element::Keyboard`], [`element::Focusable`],
//!   [`element::DropTarget`] — reached through accessors, so implementers
//!   only provide the capabilities they need.
//! - [`context::Context`]: the transient traversal record (bounds, parent
//!   link, owning view) rebuilt on every descent.
//! - [`context::View`]: the collaborator contract toward the platform
//!   host (repaints, deferred callbacks, the undo stack, clipboard,
//!   pointer shape).
//! - [`proxy::Proxy`]: decorators wrapping exactly one child and
//!   forwarding the protocol unless overridden.
//! - [`composite::Composite`]: ordered-children dispatch — hit scanning,
//!   click gesture tracking, hover enter/leave episodes, key/text
//!   routing, and the per-level focus chain.
//! - [`surface::Surface`]: the minimal drawing contract elements emit
//!   geometry through, with a recording reference implementation.
//! - [`headless::HeadlessView`]: an inspectable host-free view.
//!
//! ## Minimal example
//!
//! A layer with one focusable control, driven headlessly:
//!
//! ```
//! use kurbo::{Point, Rect};
//! use trellis_element::composite::Composite;
//! use trellis_element::context::Context;
//! use trellis_element::element::{Element, boxed};
//! use trellis_element::headless::HeadlessView;
//! use trellis_element::layer::Layer;
//!
//! struct Block;
//! impl Element for Block {
//!     fn wants_control(&self) -> bool {
//!         true
//!     }
//! }
//!
//! let mut root = Layer::new().with(boxed(Block));
//! let view = HeadlessView::new();
//! let ctx = Context::root(&view, Rect::new(0.0, 0.0, 320.0, 240.0));
//!
//! let hit = root.hit_element(&ctx, Point::new(10.0, 10.0), true);
//! assert_eq!(hit.map(|(ix, _)| ix), Some(0));
//! ```
//!
//! Single-threaded by design: all traversal and dispatch run on the one
//! UI thread, deferred work goes through [`context::View::post`], and
//! cancellation is structural (weak handles checked at fire time).
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod composite;
pub mod context;
pub mod element;
pub mod events;
pub mod headless;
pub mod layer;
pub mod proxy;
pub mod surface;

pub use composite::{Composite, CompositeState};
pub use context::{Context, Postback, ScrollRequest, UndoAction, UndoEntry, View};
pub use element::{
    DropTarget, EVERYWHERE, Element, ElementBox, FULL_EXTENT, Focusable, FocusRequest, Keyboard,
    Limits, Pointer, Stretch, boxed, intersects,
};
pub use events::{
    Button, CursorShape, CursorStatus, DropInfo, Key, KeyAction, KeyEvent, Modifiers, MouseButton,
    TextEvent,
};
pub use proxy::{FixedSize, Margin, Proxy};
pub use surface::{DrawOp, Recorder, Surface};

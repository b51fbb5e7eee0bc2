// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The view contract and the per-descent context chain.
//!
//! A [`Context`] is a transient, stack-allocated traversal record: the
//! element's allocated rectangle, a link to the parent context, and the
//! owning [`View`]. It is rebuilt on every descent and never persisted.
//!
//! [`View`] is the collaborator boundary toward the platform host: repaint
//! requests, deferred callbacks, the undo stack, and a few intentionally
//! process-wide settings (pointer shape, clipboard) all go through it.
//! Everything on the trait is `&self`: hosts are expected to queue the
//! requests and act on them between traversal passes, which is what keeps
//! the single-threaded cooperative model free of re-entrancy.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::Cell;
use core::fmt;
use core::time::Duration;

use kurbo::{Point, Rect};

use crate::events::CursorShape;

/// A zero-argument restore thunk for the undo log.
///
/// Cloneable because one thunk can appear in two entries when a pending
/// typing burst is flushed by a discontinuous edit. Thunks must tolerate
/// the element being gone (upgrade a weak handle, no-op on failure).
pub type UndoAction = Rc<dyn Fn()>;

/// An undo/redo pair pushed onto the view's undo stack.
#[derive(Clone)]
pub struct UndoEntry {
    /// Restores the state before the edit.
    pub undo: UndoAction,
    /// Restores the state after the edit.
    pub redo: UndoAction,
}

impl fmt::Debug for UndoEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoEntry").finish_non_exhaustive()
    }
}

/// A deferred callback scheduled through [`View::post`].
///
/// The callback receives the view again at fire time so it can request
/// repaints without capturing a reference into the tree.
pub type Postback = Box<dyn FnOnce(&dyn View)>;

/// The owning view: the collaborator that hosts the element tree.
///
/// Only [`View::refresh`] and [`View::post`] are required; the rest have
/// conservative defaults so minimal hosts stay small.
pub trait View {
    /// Request a repaint of the whole view.
    fn refresh(&self);

    /// Request a repaint of `area` (root coordinate space).
    fn refresh_rect(&self, area: Rect) {
        let _ = area;
        self.refresh();
    }

    /// The region being repainted by the current draw pass.
    ///
    /// Composite draw walks cull children against this.
    fn dirty(&self) -> Rect {
        crate::element::EVERYWHERE
    }

    /// Schedule `callback` to run on the UI thread after `delay`.
    ///
    /// Callbacks never run concurrently with an in-progress traversal;
    /// cancellation is structural (weak handles checked at fire time).
    fn post(&self, delay: Duration, callback: Postback);

    /// Push an entry onto the undo stack.
    fn add_undo(&self, entry: UndoEntry) {
        let _ = entry;
    }

    /// Undo the most recent entry. Returns `false` if the stack is empty.
    fn undo(&self) -> bool {
        false
    }

    /// Redo the most recently undone entry.
    fn redo(&self) -> bool {
        false
    }

    /// Current pointer position in the root coordinate space.
    fn cursor_pos(&self) -> Point {
        Point::ZERO
    }

    /// Set the process-wide pointer shape.
    fn set_cursor(&self, shape: CursorShape) {
        let _ = shape;
    }

    /// Read the host clipboard.
    fn clipboard(&self) -> String {
        String::new()
    }

    /// Replace the host clipboard contents.
    fn set_clipboard(&self, text: String) {
        let _ = text;
    }
}

/// A scroll-into-view request slot installed by an enclosing port.
///
/// Descendants deposit the rectangle they want visible; the port inspects
/// the slot after the forwarded call returns and adjusts its alignment.
/// This replaces an upward ancestor walk, which would alias the mutably
/// borrowed chain.
#[derive(Debug, Default)]
pub struct ScrollRequest(Cell<Option<Rect>>);

impl ScrollRequest {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self(Cell::new(None))
    }

    /// Deposit a request, widening any request already present.
    pub fn request(&self, area: Rect) {
        let merged = match self.0.get() {
            Some(prev) => prev.union(area),
            None => area,
        };
        self.0.set(Some(merged));
    }

    /// Take the pending request, leaving the slot empty.
    pub fn take(&self) -> Option<Rect> {
        self.0.take()
    }
}

/// Transient traversal record passed down every protocol call.
///
/// Invariants:
/// - `bounds` is the element's allocated rectangle in the coordinate space
///   established by the nearest ancestor that introduces scrolling.
/// - the chain terminates at a root whose parent is `None`.
#[derive(Copy, Clone)]
pub struct Context<'a> {
    /// The owning view.
    pub view: &'a dyn View,
    /// The element's allocated rectangle.
    pub bounds: Rect,
    parent: Option<&'a Context<'a>>,
    scroll: Option<&'a ScrollRequest>,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("bounds", &self.bounds)
            .field("depth", &self.depth())
            .finish_non_exhaustive()
    }
}

impl<'a> Context<'a> {
    /// Creates the root context for a traversal.
    #[must_use]
    pub const fn root(view: &'a dyn View, bounds: Rect) -> Self {
        Self {
            view,
            bounds,
            parent: None,
            scroll: None,
        }
    }

    /// Derives the context for a child occupying `bounds`.
    #[must_use]
    pub fn child(&'a self, bounds: Rect) -> Context<'a> {
        Context {
            view: self.view,
            bounds,
            parent: Some(self),
            scroll: self.scroll,
        }
    }

    /// Derives a child context with a scroll-request slot installed.
    #[must_use]
    pub fn child_with_scroll(&'a self, bounds: Rect, slot: &'a ScrollRequest) -> Context<'a> {
        Context {
            view: self.view,
            bounds,
            parent: Some(self),
            scroll: Some(slot),
        }
    }

    /// The parent context, `None` at the root.
    #[must_use]
    pub fn parent(&self) -> Option<&Context<'a>> {
        self.parent
    }

    /// Number of ancestors above this context.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut n = 0;
        let mut cur = self.parent;
        while let Some(c) = cur {
            n += 1;
            cur = c.parent;
        }
        n
    }

    /// Ask the nearest enclosing port to bring `area` into view.
    ///
    /// Returns `false` when no port encloses this element; callers then
    /// fall back to a plain refresh.
    pub fn scroll_into_view(&self, area: Rect) -> bool {
        match self.scroll {
            Some(slot) => {
                slot.request(area);
                true
            }
            None => false,
        }
    }
}

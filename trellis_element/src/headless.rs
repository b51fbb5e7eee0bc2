// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A headless [`View`] for tests and host-free use.
//!
//! Everything a real host would act on is queued and inspectable: repaint
//! regions, posted callbacks (fired manually, so tests control time), the
//! undo/redo stacks, the pointer shape, and a clipboard string.
//!
//! ```
//! use core::time::Duration;
//! use trellis_element::headless::HeadlessView;
//! use trellis_element::context::View;
//!
//! let view = HeadlessView::new();
//! view.post(Duration::from_millis(500), Box::new(|v| v.refresh()));
//! assert_eq!(view.posted_len(), 1);
//!
//! // Advance "time": fire everything that was posted.
//! view.fire_posted();
//! assert_eq!(view.full_refreshes(), 1);
//! ```

use alloc::string::String;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::time::Duration;

use kurbo::{Point, Rect};

use crate::context::{Postback, UndoEntry, View};
use crate::element::EVERYWHERE;
use crate::events::CursorShape;

/// An inspectable, host-free view implementation.
pub struct HeadlessView {
    dirty: Cell<Rect>,
    full_refreshes: Cell<usize>,
    refreshed: RefCell<Vec<Rect>>,
    posted: RefCell<Vec<(Duration, Postback)>>,
    undo_stack: RefCell<Vec<UndoEntry>>,
    redo_stack: RefCell<Vec<UndoEntry>>,
    cursor: Cell<Point>,
    cursor_shape: Cell<CursorShape>,
    clipboard: RefCell<String>,
}

impl fmt::Debug for HeadlessView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessView")
            .field("full_refreshes", &self.full_refreshes.get())
            .field("refreshed", &self.refreshed.borrow().len())
            .field("posted", &self.posted.borrow().len())
            .field("undo_depth", &self.undo_stack.borrow().len())
            .finish_non_exhaustive()
    }
}

impl Default for HeadlessView {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessView {
    /// A fresh view with an everywhere-dirty region.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dirty: Cell::new(EVERYWHERE),
            full_refreshes: Cell::new(0),
            refreshed: RefCell::new(Vec::new()),
            posted: RefCell::new(Vec::new()),
            undo_stack: RefCell::new(Vec::new()),
            redo_stack: RefCell::new(Vec::new()),
            cursor: Cell::new(Point::ZERO),
            cursor_shape: Cell::new(CursorShape::Arrow),
            clipboard: RefCell::new(String::new()),
        }
    }

    /// Constrain the dirty region reported to draw passes.
    pub fn set_dirty(&self, area: Rect) {
        self.dirty.set(area);
    }

    /// Pretend the pointer sits at `pos`.
    pub fn set_cursor_pos(&self, pos: Point) {
        self.cursor.set(pos);
    }

    /// Number of whole-view refresh requests so far.
    #[must_use]
    pub fn full_refreshes(&self) -> usize {
        self.full_refreshes.get()
    }

    /// Rectangles passed to [`View::refresh_rect`], in order.
    #[must_use]
    pub fn refreshed_rects(&self) -> Vec<Rect> {
        self.refreshed.borrow().clone()
    }

    /// Clear the refresh log.
    pub fn take_refreshes(&self) -> Vec<Rect> {
        core::mem::take(&mut *self.refreshed.borrow_mut())
    }

    /// Number of callbacks waiting to fire.
    #[must_use]
    pub fn posted_len(&self) -> usize {
        self.posted.borrow().len()
    }

    /// Delay of the next pending callback, if any.
    #[must_use]
    pub fn next_delay(&self) -> Option<Duration> {
        self.posted.borrow().first().map(|(d, _)| *d)
    }

    /// Fire every pending callback (in post order), returning how many
    /// ran. Callbacks may post again; those wait for the next call.
    pub fn fire_posted(&self) -> usize {
        let pending = core::mem::take(&mut *self.posted.borrow_mut());
        let count = pending.len();
        for (_, callback) in pending {
            callback(self);
        }
        count
    }

    /// Depth of the undo stack.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.borrow().len()
    }

    /// Depth of the redo stack.
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.borrow().len()
    }

    /// The last pointer shape set through the view.
    #[must_use]
    pub fn cursor_shape(&self) -> CursorShape {
        self.cursor_shape.get()
    }
}

impl View for HeadlessView {
    fn refresh(&self) {
        self.full_refreshes.set(self.full_refreshes.get() + 1);
    }

    fn refresh_rect(&self, area: Rect) {
        self.refreshed.borrow_mut().push(area);
    }

    fn dirty(&self) -> Rect {
        self.dirty.get()
    }

    fn post(&self, delay: Duration, callback: Postback) {
        self.posted.borrow_mut().push((delay, callback));
    }

    fn add_undo(&self, entry: UndoEntry) {
        self.undo_stack.borrow_mut().push(entry);
        self.redo_stack.borrow_mut().clear();
    }

    fn undo(&self) -> bool {
        let Some(entry) = self.undo_stack.borrow_mut().pop() else {
            return false;
        };
        (entry.undo)();
        self.redo_stack.borrow_mut().push(entry);
        true
    }

    fn redo(&self) -> bool {
        let Some(entry) = self.redo_stack.borrow_mut().pop() else {
            return false;
        };
        (entry.redo)();
        self.undo_stack.borrow_mut().push(entry);
        true
    }

    fn cursor_pos(&self) -> Point {
        self.cursor.get()
    }

    fn set_cursor(&self, shape: CursorShape) {
        self.cursor_shape.set(shape);
    }

    fn clipboard(&self) -> String {
        self.clipboard.borrow().clone()
    }

    fn set_clipboard(&self, text: String) {
        *self.clipboard.borrow_mut() = text;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use alloc::string::ToString;

    #[test]
    fn undo_redo_round_trip() {
        let view = HeadlessView::new();
        let value = Rc::new(Cell::new(0_i32));

        let (a, b) = (value.clone(), value.clone());
        view.add_undo(UndoEntry {
            undo: Rc::new(move || a.set(1)),
            redo: Rc::new(move || b.set(2)),
        });

        assert!(view.undo());
        assert_eq!(value.get(), 1);
        assert!(view.redo());
        assert_eq!(value.get(), 2);
        assert!(view.undo());
        assert!(!view.undo());
    }

    #[test]
    fn new_entries_clear_redo() {
        let view = HeadlessView::new();
        let entry = || UndoEntry {
            undo: Rc::new(|| {}),
            redo: Rc::new(|| {}),
        };
        view.add_undo(entry());
        assert!(view.undo());
        assert_eq!(view.redo_depth(), 1);
        view.add_undo(entry());
        assert_eq!(view.redo_depth(), 0);
    }

    #[test]
    fn clipboard_round_trip() {
        let view = HeadlessView::new();
        view.set_clipboard("hello".to_string());
        assert_eq!(view.clipboard(), "hello");
    }

    #[test]
    fn posted_callbacks_can_repost() {
        let view = HeadlessView::new();
        view.post(
            Duration::from_millis(500),
            Box::new(|v| {
                v.post(Duration::from_millis(500), Box::new(|_| {}));
            }),
        );
        assert_eq!(view.fire_posted(), 1);
        assert_eq!(view.posted_len(), 1);
    }
}

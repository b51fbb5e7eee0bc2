// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable text element.
//!
//! `TextEdit` exercises the whole dispatch protocol under mutation:
//! pointer gestures move the selection, keys and text input edit the
//! shared [`EditState`], every edit funnels through the undo log, and
//! the caret blinks on a self-rescheduling deferred callback.
//!
//! ## Undo coalescing
//!
//! Before any mutation a restore thunk (weak handle to the shared state
//! plus a snapshot) is captured. Plain typing only opens or extends a
//! burst: the pre-burst snapshot is parked in `typing_state` and no
//! entry is pushed. A *discontinuous* action — caret movement, an
//! explicit undo/redo, losing focus, or an edit of a different kind
//! (Enter, delete, cut, paste) — first flushes the burst as a single
//! entry covering everything typed, then pushes its own entry. Typing
//! "abc" therefore undoes in one step; typing "ab", moving the caret,
//! and typing "c" undoes in two.
//!
//! ## Caret blink
//!
//! Drawing a visible caret schedules a 500 ms callback holding a weak
//! handle to the blink cell. At fire time it flips the visibility,
//! requests a repaint of the padded caret rectangle, and clears the
//! pending flag so the next draw reschedules. If the element is dropped
//! first, the upgrade fails and the callback is a silent no-op — the
//! framework's cancellation idiom for deferred UI work.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::string::String;
use core::cell::{Cell, RefCell};
use core::fmt;
use core::time::Duration;

use kurbo::{Point, Rect, Size};
use peniko::Color;

use trellis_element::context::{Context, UndoAction, UndoEntry};
use trellis_element::element::{
    Element, FULL_EXTENT, Focusable, FocusRequest, Keyboard, Limits, Pointer,
};
use trellis_element::events::{CursorShape, CursorStatus, Key, KeyAction, KeyEvent, Modifiers,
    MouseButton, TextEvent};
use trellis_element::surface::Surface;

use crate::shaper::TextShaper;
use crate::state::{
    EditState, Selection, line_around, next_boundary, next_word, prev_boundary, prev_word,
    word_around,
};

/// Colors and metrics for selection and caret painting.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Text color.
    pub text: Color,
    /// Selection band color when focused.
    pub selection: Color,
    /// Caret color.
    pub caret: Color,
    /// Caret stroke width.
    pub caret_width: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            text: Color::BLACK,
            selection: Color::from_rgba8(0x33, 0x99, 0xff, 0xff),
            caret: Color::from_rgba8(0x20, 0x20, 0x20, 0xff),
            caret_width: 1.2,
        }
    }
}

/// Blink bookkeeping shared with the deferred callback.
#[derive(Debug, Default)]
struct Blink {
    show: Cell<bool>,
    pending: Cell<bool>,
}

/// An editable text box over a caller-chosen [`TextShaper`].
pub struct TextEdit<S> {
    state: Rc<RefCell<EditState>>,
    shaper: S,
    style: TextStyle,

    /// `(revision, width)` the shaper was last flowed for.
    flowed: Option<(u64, f64)>,
    current_size: Option<Size>,
    /// Remembered horizontal position for vertical caret motion.
    goal_x: f64,
    focused: bool,

    blink: Rc<Blink>,
    /// Pre-burst snapshot while a typing burst is open.
    typing_state: Option<UndoAction>,
}

impl<S> fmt::Debug for TextEdit<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("TextEdit")
            .field("len", &state.text.len())
            .field("selection", &state.selection)
            .field("focused", &self.focused)
            .field("typing_burst", &self.typing_state.is_some())
            .finish_non_exhaustive()
    }
}

impl<S: TextShaper> TextEdit<S> {
    /// An editor holding `text`, measured through `shaper`.
    #[must_use]
    pub fn new(text: impl Into<String>, shaper: S) -> Self {
        Self {
            state: Rc::new(RefCell::new(EditState::new(text))),
            shaper,
            style: TextStyle::default(),
            flowed: None,
            current_size: None,
            goal_x: 0.0,
            focused: false,
            blink: Rc::new(Blink {
                show: Cell::new(true),
                pending: Cell::new(false),
            }),
            typing_state: None,
        }
    }

    /// Replace the painting style.
    #[must_use]
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// The current text.
    #[must_use]
    pub fn contents(&self) -> String {
        self.state.borrow().text.clone()
    }

    /// Replace the whole text, clamping the selection onto it.
    pub fn set_text(&mut self, text: &str) {
        let mut state = self.state.borrow_mut();
        if state.text != text {
            state.text.clear();
            state.text.push_str(text);
            state.clamp_selection();
            state.touch();
        }
    }

    /// The current selection.
    #[must_use]
    pub fn selection(&self) -> Option<Selection> {
        self.state.borrow().selection
    }

    /// Move the selection without touching the text.
    pub fn select(&mut self, selection: Selection) {
        let mut state = self.state.borrow_mut();
        state.selection = Some(selection);
        state.clamp_selection();
        state.touch();
    }

    /// Select the entire buffer.
    pub fn select_all(&mut self) {
        let end = self.state.borrow().text.len();
        self.select(Selection { start: 0, end });
    }

    /// Clear the selection entirely.
    pub fn select_none(&mut self) {
        let mut state = self.state.borrow_mut();
        state.selection = None;
        state.touch();
    }

    /// Whether a typing burst is open (for inspection and tests).
    #[must_use]
    pub fn typing_burst_open(&self) -> bool {
        self.typing_state.is_some()
    }

    fn sel(&self) -> Option<Selection> {
        self.state.borrow().selection
    }

    fn set_sel(&mut self, selection: Selection) {
        let mut state = self.state.borrow_mut();
        state.selection = Some(selection);
        state.touch();
    }

    /// Splice `insert` over `lo..hi`, leaving the caret after it.
    fn replace_range(&mut self, lo: usize, hi: usize, insert: &str) {
        let mut state = self.state.borrow_mut();
        state.text.replace_range(lo..hi, insert);
        state.selection = Some(Selection::caret(lo + insert.len()));
        state.touch();
    }

    /// Remove the selection, or one character next to the caret.
    fn delete(&mut self, forward: bool) {
        let Some(sel) = self.sel() else {
            return;
        };
        let (mut lo, mut hi) = sel.range();
        if lo == hi {
            let text = self.state.borrow().text.clone();
            if forward {
                hi = next_boundary(&text, hi);
            } else {
                lo = prev_boundary(&text, lo);
            }
        }
        if lo != hi {
            self.replace_range(lo, hi, "");
        }
    }

    /// A restore thunk for the current state; survives the element.
    fn capture_state(&self) -> UndoAction {
        let snapshot = self.state.borrow().snapshot();
        let weak: Weak<RefCell<EditState>> = Rc::downgrade(&self.state);
        Rc::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().restore(snapshot.clone());
            }
        })
    }

    /// Close an open typing burst as one undo entry.
    fn flush_typing(&mut self, ctx: &Context<'_>) {
        if let Some(burst) = self.typing_state.take() {
            let now = self.capture_state();
            ctx.view.add_undo(UndoEntry {
                undo: burst,
                redo: now,
            });
        }
    }

    /// Push an edit's entry, flushing any open burst in front of it.
    ///
    /// The burst entry redoes to `undo_f`'s snapshot (the state right
    /// before this edit), so undo peels the edit first, then the burst.
    fn add_edit_undo(&mut self, ctx: &Context<'_>, undo_f: UndoAction, redo_f: UndoAction) {
        if let Some(burst) = self.typing_state.take() {
            ctx.view.add_undo(UndoEntry {
                undo: burst,
                redo: undo_f.clone(),
            });
        }
        ctx.view.add_undo(UndoEntry {
            undo: undo_f,
            redo: redo_f,
        });
    }

    /// Re-flow the shaper when the text or available width changed.
    fn ensure_flow(&mut self, width: f64) {
        let revision = self.state.borrow().revision;
        if self.flowed != Some((revision, width)) {
            let text = self.state.borrow().text.clone();
            self.shaper.flow(&text, width);
            self.flowed = Some((revision, width));
        }
    }

    fn caret_rect(&mut self, ctx: &Context<'_>) -> Option<Rect> {
        let sel = self.sel()?;
        if !sel.is_caret() {
            return None;
        }
        self.ensure_flow(ctx.bounds.width());
        let p = self.shaper.offset_point(sel.end);
        let height = self.shaper.line_height();
        let x = ctx.bounds.x0 + p.x;
        let y = ctx.bounds.y0 + p.y;
        Some(Rect::new(x, y, x + self.style.caret_width, y + height))
    }

    /// Bring the caret into view through the nearest port, or repaint.
    fn scroll_caret(&mut self, ctx: &Context<'_>, save_x: bool) {
        if let Some(caret) = self.caret_rect(ctx) {
            ctx.scroll_into_view(caret.inflate(1.0, 0.0));
            if save_x {
                self.goal_x = caret.x0 - ctx.bounds.x0;
            }
        }
        ctx.view.refresh_rect(ctx.bounds);
    }

    fn draw_selection(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        let Some(sel) = self.sel() else {
            return;
        };
        if sel.is_caret() || self.state.borrow().text.is_empty() {
            return;
        }
        let (lo, hi) = sel.range();
        self.ensure_flow(ctx.bounds.width());
        let height = self.shaper.line_height();
        let origin = Point::new(ctx.bounds.x0, ctx.bounds.y0);
        let ps = self.shaper.offset_point(lo) + origin.to_vec2();
        let pe = self.shaper.offset_point(hi) + origin.to_vec2();
        // Unfocused boxes keep a faint selection.
        let color = if self.focused {
            self.style.selection
        } else {
            self.style.selection.with_alpha(0.15)
        };

        if ps.y == pe.y {
            surface.fill_rect(Rect::new(ps.x, ps.y, pe.x, ps.y + height), color);
        } else {
            surface.fill_rect(Rect::new(ps.x, ps.y, ctx.bounds.x1, ps.y + height), color);
            if pe.y > ps.y + height {
                surface.fill_rect(
                    Rect::new(ctx.bounds.x0, ps.y + height, ctx.bounds.x1, pe.y),
                    color,
                );
            }
            surface.fill_rect(Rect::new(ctx.bounds.x0, pe.y, pe.x, pe.y + height), color);
        }
    }

    fn draw_text(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        self.ensure_flow(ctx.bounds.width());
        let text = self.state.borrow().text.clone();
        let height = self.shaper.line_height();
        for line in 0..self.shaper.line_count() {
            let (start, end) = self.shaper.line_range(line);
            if start < end {
                let origin = Point::new(ctx.bounds.x0, ctx.bounds.y0 + line as f64 * height);
                surface.fill_text(&text[start..end], origin, self.style.text);
            }
        }
    }

    fn draw_caret(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        if !self.focused {
            return;
        }
        let Some(caret) = self.caret_rect(ctx) else {
            return;
        };
        if self.blink.show.get() {
            let x = caret.x0 + self.style.caret_width / 2.0;
            surface.stroke_line(
                Point::new(x, caret.y0),
                Point::new(x, caret.y1),
                self.style.caret_width,
                self.style.caret,
            );
        }
        if !self.blink.pending.get() {
            self.blink.pending.set(true);
            let weak = Rc::downgrade(&self.blink);
            let area = caret.inflate(2.0, 2.0);
            ctx.view.post(
                Duration::from_millis(500),
                Box::new(move |view| {
                    // Element gone: nothing to blink.
                    if let Some(blink) = weak.upgrade() {
                        blink.show.set(!blink.show.get());
                        blink.pending.set(false);
                        view.refresh_rect(area);
                    }
                }),
            );
        }
    }
}

impl<S: TextShaper> Element for TextEdit<S> {
    fn limits(&mut self, _ctx: &Context<'_>) -> Limits {
        let line = self.shaper.line_height();
        // Once flowed, the minimum height is the full text extent, so an
        // enclosing port sees the real overflow.
        let height = self.current_size.map_or(line, |s| s.height.max(line));
        Limits {
            min: Size::new(200.0, height),
            max: Size::new(FULL_EXTENT, FULL_EXTENT),
        }
    }

    fn layout(&mut self, ctx: &Context<'_>) {
        self.ensure_flow(ctx.bounds.width());
        let new_size = self.shaper.size();
        if self.current_size.is_some_and(|old| old != new_size) {
            ctx.view.refresh_rect(ctx.bounds);
        }
        self.current_size = Some(new_size);
    }

    fn draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        self.draw_selection(ctx, surface);
        self.draw_text(ctx, surface);
        self.draw_caret(ctx, surface);
    }

    fn wants_control(&self) -> bool {
        true
    }

    fn pointer(&mut self) -> Option<&mut dyn Pointer> {
        Some(self)
    }

    fn keyboard(&mut self) -> Option<&mut dyn Keyboard> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl<S: TextShaper> Pointer for TextEdit<S> {
    fn click(&mut self, ctx: &Context<'_>, ev: &MouseButton) -> bool {
        self.blink.show.set(true);
        if !ev.down {
            return true;
        }
        // Moving the caret is a discontinuous action for the undo log.
        self.flush_typing(ctx);

        let text = self.state.borrow().text.clone();
        if text.is_empty() {
            self.set_sel(Selection::caret(0));
            self.scroll_caret(ctx, false);
            return true;
        }

        self.ensure_flow(ctx.bounds.width());
        let local = Point::new(ev.pos.x - ctx.bounds.x0, ev.pos.y - ctx.bounds.y0);
        let Some(hit) = self.shaper.hit(local) else {
            return true;
        };

        if ev.clicks == 2 {
            let (first, last) = word_around(&text, hit);
            self.set_sel(Selection {
                start: first,
                end: last,
            });
        } else if ev.clicks >= 3 {
            let (first, last) = line_around(&text, hit);
            self.set_sel(Selection {
                start: first,
                end: last,
            });
        } else if ev.modifiers.contains(Modifiers::SHIFT) {
            if let Some(mut sel) = self.sel() {
                // Extend whichever side the hit falls on.
                if hit < sel.start {
                    sel.start = hit;
                } else {
                    sel.end = hit;
                }
                self.set_sel(sel);
            } else {
                self.set_sel(Selection::caret(hit));
            }
        } else {
            self.set_sel(Selection::caret(hit));
        }

        self.goal_x = local.x;
        ctx.view.refresh_rect(ctx.bounds);
        true
    }

    fn drag(&mut self, ctx: &Context<'_>, ev: &MouseButton) {
        self.ensure_flow(ctx.bounds.width());
        let local = Point::new(ev.pos.x - ctx.bounds.x0, ev.pos.y - ctx.bounds.y0);
        if let Some(hit) = self.shaper.hit(local) {
            if let Some(mut sel) = self.sel() {
                sel.end = hit;
                self.set_sel(sel);
                self.goal_x = local.x;
                ctx.view.refresh_rect(ctx.bounds);
            }
        }
    }

    fn cursor(&mut self, ctx: &Context<'_>, p: Point, _status: CursorStatus) -> bool {
        if ctx.bounds.contains(p) {
            ctx.view.set_cursor(CursorShape::Ibeam);
            return true;
        }
        false
    }
}

impl<S: TextShaper> Keyboard for TextEdit<S> {
    fn key(&mut self, ctx: &Context<'_>, ev: &KeyEvent) -> bool {
        self.blink.show.set(true);
        let Some(sel) = self.sel() else {
            return false;
        };
        if ev.action == KeyAction::Release {
            return false;
        }

        let text = self.state.borrow().text.clone();
        let (lo, hi) = sel.range();
        let undo_f = self.capture_state();
        let shift = ev.modifiers.contains(Modifiers::SHIFT);
        let alt = ev.modifiers.contains(Modifiers::ALT);
        let action = ev.modifiers.contains(Modifiers::ACTION);

        let mut handled = false;
        let mut move_caret = false;
        let mut save_x = false;
        let mut edited = false;

        match ev.key {
            Key::Enter => {
                self.replace_range(lo, hi, "\n");
                let redo_f = self.capture_state();
                self.add_edit_undo(ctx, undo_f, redo_f);
                handled = true;
                save_x = true;
                edited = true;
            }

            Key::Backspace | Key::Delete => {
                self.delete(ev.key == Key::Delete);
                let redo_f = self.capture_state();
                self.add_edit_undo(ctx, undo_f, redo_f);
                handled = true;
                save_x = true;
                edited = true;
            }

            Key::Left => {
                let end = if alt {
                    prev_word(&text, sel.end)
                } else {
                    prev_boundary(&text, sel.end)
                };
                let collapsed = end.min(sel.start);
                self.set_sel(if shift {
                    Selection {
                        start: sel.start,
                        end,
                    }
                } else {
                    Selection::caret(collapsed)
                });
                move_caret = true;
                save_x = true;
                handled = true;
            }

            Key::Right => {
                let end = if alt {
                    next_word(&text, sel.end)
                } else {
                    next_boundary(&text, sel.end)
                };
                let collapsed = end.max(sel.start);
                self.set_sel(if shift {
                    Selection {
                        start: sel.start,
                        end,
                    }
                } else {
                    Selection::caret(collapsed)
                });
                move_caret = true;
                save_x = true;
                handled = true;
            }

            Key::Up | Key::Down => {
                self.ensure_flow(ctx.bounds.width());
                let from = self.shaper.offset_point(sel.end);
                let half = self.shaper.line_height() / 2.0;
                let y = if ev.key == Key::Up {
                    from.y - half
                } else {
                    from.y + self.shaper.line_height() + half
                };
                let end = match self.shaper.hit(Point::new(self.goal_x, y)) {
                    Some(offset) => offset,
                    None if ev.key == Key::Up => 0,
                    None => text.len(),
                };
                self.set_sel(Selection {
                    start: sel.start,
                    end,
                });
                move_caret = true;
                handled = true;
            }

            Key::Home | Key::End => {
                let (first, last) = line_around(&text, sel.end);
                let end = if ev.key == Key::Home { first } else { last };
                self.set_sel(Selection {
                    start: sel.start,
                    end,
                });
                move_caret = true;
                save_x = true;
                handled = true;
            }

            Key::Char('a') if action => {
                self.select_all();
                handled = true;
            }

            Key::Char('x') if action => {
                if lo != hi {
                    ctx.view.set_clipboard(String::from(&text[lo..hi]));
                    self.delete(false);
                    let redo_f = self.capture_state();
                    self.add_edit_undo(ctx, undo_f, redo_f);
                    edited = true;
                }
                save_x = true;
                handled = true;
            }

            Key::Char('c') if action => {
                if lo != hi {
                    ctx.view.set_clipboard(String::from(&text[lo..hi]));
                }
                handled = true;
            }

            Key::Char('v') if action => {
                let insert = ctx.view.clipboard();
                self.replace_range(lo, hi, &insert);
                let redo_f = self.capture_state();
                self.add_edit_undo(ctx, undo_f, redo_f);
                handled = true;
                save_x = true;
                edited = true;
            }

            Key::Char('z') if action => {
                self.flush_typing(ctx);
                if shift {
                    ctx.view.redo();
                } else {
                    ctx.view.undo();
                }
                ctx.view.refresh_rect(ctx.bounds);
                handled = true;
            }

            _ => {}
        }

        if move_caret {
            self.state.borrow_mut().clamp_selection();
            if !shift {
                if let Some(sel) = self.sel() {
                    self.set_sel(Selection::caret(sel.end));
                }
            }
            // Caret motion closes a typing burst.
            self.flush_typing(ctx);
        } else if edited {
            ctx.view.refresh_rect(ctx.bounds);
        }

        if handled {
            self.scroll_caret(ctx, save_x);
        }
        handled
    }

    fn text(&mut self, ctx: &Context<'_>, ev: &TextEvent) -> bool {
        self.blink.show.set(true);
        let Some(sel) = self.sel() else {
            return false;
        };

        // First edit of a burst: park the pre-burst snapshot.
        if self.typing_state.is_none() {
            self.typing_state = Some(self.capture_state());
        }

        let (lo, hi) = sel.range();
        let mut buf = [0_u8; 4];
        let inserted = ev.ch.encode_utf8(&mut buf);
        self.replace_range(lo, hi, inserted);

        self.scroll_caret(ctx, true);
        true
    }
}

impl<S: TextShaper> Focusable for TextEdit<S> {
    fn begin_focus(&mut self, _req: FocusRequest) -> bool {
        self.focused = true;
        self.blink.show.set(true);
        if self.sel().is_none() {
            self.set_sel(Selection::caret(0));
        }
        true
    }

    fn end_focus(&mut self, ctx: &Context<'_>) {
        // Blur is a discontinuous action: the burst becomes one entry.
        self.flush_typing(ctx);
        self.focused = false;
        ctx.view.refresh_rect(ctx.bounds);
    }
}

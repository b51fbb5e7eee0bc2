// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Composite dispatch: shared machinery for elements that own an ordered,
//! index-addressed collection of children.
//!
//! Implement [`Composite`] (child count, child access, per-child bounds)
//! and the provided `composite_*` methods supply hit scanning, click
//! gesture tracking, hover enter/leave bookkeeping, key and text routing,
//! and the per-level focus chain. Containers then forward their `Element`
//! and capability impls to these methods; the [`crate::impl_composite_dispatch`]
//! macro writes the capability forwarding.
//!
//! The contracts upheld here:
//!
//! - **Hit order**: [`Composite::hit_element`] scans children in index
//!   order, or back-to-front when [`Composite::reverse_index`] is set (so
//!   later-declared, overlaid children win), short-circuiting on the
//!   first hit. Bounds are consulted before the child is touched, which
//!   keeps lazily-materialized containers cheap.
//! - **Click tracking**: a press records the hit index; the release and
//!   every drag in between are routed to that recorded index even if the
//!   pointer has moved elsewhere, so one child sees the whole
//!   press-drag-release gesture.
//! - **Hover episodes**: each child receives exactly one `Entering`, any
//!   number of `Hovering`, and exactly one `Leaving` per continuous hover
//!   episode, including when the pointer leaves the composite itself.
//! - **Focus chain**: each composite remembers its own focused child
//!   index (and the last one, for restoration), so focus is a chain of
//!   per-level indices rather than a single tree-wide pointer. Tab
//!   traversal walks in direction `shift XOR reverse_index()`, skips
//!   children that refuse focus, and reports unhandled at the ends so an
//!   ancestor composite can continue the walk among its own children.

use alloc::vec::Vec;

use hashbrown::HashSet;
use kurbo::{Point, Rect, Vec2};

use crate::context::Context;
use crate::element::{Element, Focusable, FocusRequest, intersects};
use crate::events::{CursorStatus, DropInfo, Key, KeyAction, KeyEvent, Modifiers, MouseButton, TextEvent};
use crate::surface::Surface;

/// Per-composite dispatch bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct CompositeState {
    /// Index of the currently focused child.
    pub focus: Option<usize>,
    /// Focus index remembered across an `end_focus`/`begin_focus` detour.
    pub saved_focus: Option<usize>,
    /// Child receiving the current press-drag-release gesture.
    pub click_tracking: Option<usize>,
    /// Children currently inside a hover episode.
    pub hovering: HashSet<usize>,
}

impl CompositeState {
    /// Fresh state with nothing tracked.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops all tracked indices. Call after child-set mutations that
    /// invalidate indices wholesale.
    pub fn reset(&mut self) {
        self.focus = None;
        self.saved_focus = None;
        self.click_tracking = None;
        self.hovering.clear();
    }
}

/// An element owning an ordered collection of children.
///
/// Required methods abstract index-based access; the provided methods
/// implement the dispatch protocol over them. Child access takes
/// `&mut self` so containers may materialize children on demand.
pub trait Composite: Element {
    /// Number of children.
    fn len(&self) -> usize;

    /// Whether there are no children.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Access (and if necessary materialize) the child at `ix`.
    ///
    /// `ix` must be in `0..len()`; anything else is a programming error.
    fn child(&mut self, ix: usize) -> &mut dyn Element;

    /// The child's rectangle, computed without a full layout pass.
    fn bounds_of(&self, ctx: &Context<'_>, ix: usize) -> Rect;

    /// When `true`, hit-testing and focus scans run back-to-front.
    fn reverse_index(&self) -> bool {
        false
    }

    /// The dispatch bookkeeping for this composite.
    fn state(&mut self) -> &mut CompositeState;

    /// Find the child under `p`: index order (or reverse), bounds first,
    /// then the child's own `hit_test`, first hit wins.
    fn hit_element(&mut self, ctx: &Context<'_>, p: Point, control: bool) -> Option<(usize, Rect)> {
        let len = self.len();
        if self.reverse_index() {
            (0..len).rev().find_map(|ix| self.hit_child(ctx, p, control, ix))
        } else {
            (0..len).find_map(|ix| self.hit_child(ctx, p, control, ix))
        }
    }

    /// Test a single child; `None` unless `p` is inside and the child
    /// claims the hit.
    fn hit_child(
        &mut self,
        ctx: &Context<'_>,
        p: Point,
        control: bool,
        ix: usize,
    ) -> Option<(usize, Rect)> {
        let bounds = self.bounds_of(ctx, ix);
        if !bounds.contains(p) {
            return None;
        }
        let cctx = ctx.child(bounds);
        self.child(ix)
            .hit_test(&cctx, p, true, control)
            .then_some((ix, bounds))
    }

    /// Draw every child intersecting the view's dirty region.
    fn composite_draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        let dirty = ctx.view.dirty();
        for ix in 0..self.len() {
            let bounds = self.bounds_of(ctx, ix);
            if intersects(bounds, dirty) {
                let cctx = ctx.child(bounds);
                self.child(ix).draw(&cctx, surface);
            }
        }
    }

    /// Route a press to the hit child (recording it), a release to the
    /// recorded child.
    fn composite_click(&mut self, ctx: &Context<'_>, ev: &MouseButton) -> bool {
        if self.is_empty() {
            return false;
        }
        let target = if ev.down {
            self.hit_element(ctx, ev.pos, true)
        } else {
            let tracked = self.state().click_tracking;
            tracked
                .filter(|&ix| ix < self.len())
                .map(|ix| (ix, self.bounds_of(ctx, ix)))
        };
        let Some((ix, bounds)) = target else {
            self.state().click_tracking = None;
            return false;
        };
        if ev.down {
            let focusable = self
                .child(ix)
                .focusable()
                .is_some_and(|f| f.wants_focus());
            if focusable && self.state().focus != Some(ix) {
                self.focus_to(ctx, Some(ix));
            }
            self.state().click_tracking = Some(ix);
        }
        let cctx = ctx.child(bounds);
        let handled = self
            .child(ix)
            .pointer()
            .is_some_and(|h| h.click(&cctx, ev));
        if !ev.down || !handled {
            // Gesture over, or the press was refused.
            self.state().click_tracking = None;
        }
        handled
    }

    /// Route a drag to the child recorded at press time.
    fn composite_drag(&mut self, ctx: &Context<'_>, ev: &MouseButton) {
        let tracked = self.state().click_tracking;
        let Some(ix) = tracked.filter(|&ix| ix < self.len()) else {
            return;
        };
        let bounds = self.bounds_of(ctx, ix);
        let cctx = ctx.child(bounds);
        if let Some(h) = self.child(ix).pointer() {
            h.drag(&cctx, ev);
        }
    }

    /// Hover dispatch with per-child episode bookkeeping.
    fn composite_cursor(&mut self, ctx: &Context<'_>, p: Point, status: CursorStatus) -> bool {
        if status == CursorStatus::Leaving {
            return self.flush_hover(ctx, p);
        }
        let hit = self.hit_element(ctx, p, true);
        let hit_ix = hit.map(|(ix, _)| ix);
        let stale: Vec<usize> = self
            .state()
            .hovering
            .iter()
            .copied()
            .filter(|&ix| Some(ix) != hit_ix)
            .collect();
        for ix in stale {
            self.leave_child(ctx, p, ix);
        }
        let Some((ix, bounds)) = hit else {
            return false;
        };
        let entering = self.state().hovering.insert(ix);
        let child_status = if entering {
            CursorStatus::Entering
        } else {
            CursorStatus::Hovering
        };
        let cctx = ctx.child(bounds);
        self.child(ix)
            .pointer()
            .is_some_and(|h| h.cursor(&cctx, p, child_status))
    }

    /// Send `Leaving` to every child in a hover episode.
    fn flush_hover(&mut self, ctx: &Context<'_>, p: Point) -> bool {
        let stale: Vec<usize> = self.state().hovering.iter().copied().collect();
        let any = !stale.is_empty();
        for ix in stale {
            self.leave_child(ctx, p, ix);
        }
        any
    }

    /// End one child's hover episode.
    fn leave_child(&mut self, ctx: &Context<'_>, p: Point, ix: usize) {
        self.state().hovering.remove(&ix);
        if ix >= self.len() {
            return;
        }
        let bounds = self.bounds_of(ctx, ix);
        let cctx = ctx.child(bounds);
        if let Some(h) = self.child(ix).pointer() {
            h.cursor(&cctx, p, CursorStatus::Leaving);
        }
    }

    /// Route a scroll to the child under `p`.
    fn composite_scroll(&mut self, ctx: &Context<'_>, dir: Vec2, p: Point) -> bool {
        let Some((ix, bounds)) = self.hit_element(ctx, p, false) else {
            return false;
        };
        let cctx = ctx.child(bounds);
        self.child(ix)
            .pointer()
            .is_some_and(|h| h.scroll(&cctx, dir, p))
    }

    /// Route a key to the focused child, then fall back to Tab traversal.
    ///
    /// With no focused child every child gets a chance in order.
    fn composite_key(&mut self, ctx: &Context<'_>, ev: &KeyEvent) -> bool {
        if self.is_empty() {
            return false;
        }
        let focus = self.state().focus;
        if let Some(ix) = focus.filter(|&ix| ix < self.len()) {
            let bounds = self.bounds_of(ctx, ix);
            let cctx = ctx.child(bounds);
            if self.child(ix).keyboard().is_some_and(|k| k.key(&cctx, ev)) {
                return true;
            }
        } else {
            for ix in 0..self.len() {
                let bounds = self.bounds_of(ctx, ix);
                let cctx = ctx.child(bounds);
                if self.child(ix).keyboard().is_some_and(|k| k.key(&cctx, ev)) {
                    return true;
                }
            }
        }
        if ev.key == Key::Tab && ev.action != KeyAction::Release {
            let backward = ev.modifiers.contains(Modifiers::SHIFT) != self.reverse_index();
            return self.focus_step(ctx, backward);
        }
        false
    }

    /// Route text input to the focused child only.
    fn composite_text(&mut self, ctx: &Context<'_>, ev: &TextEvent) -> bool {
        let focus = self.state().focus;
        let Some(ix) = focus.filter(|&ix| ix < self.len()) else {
            return false;
        };
        let bounds = self.bounds_of(ctx, ix);
        let cctx = ctx.child(bounds);
        self.child(ix).keyboard().is_some_and(|k| k.text(&cctx, ev))
    }

    /// Route drop tracking to the child under the payload.
    fn composite_track_drop(
        &mut self,
        ctx: &Context<'_>,
        info: &DropInfo,
        status: CursorStatus,
    ) -> bool {
        let Some((ix, bounds)) = self.hit_element(ctx, info.pos, false) else {
            return false;
        };
        let cctx = ctx.child(bounds);
        self.child(ix)
            .drop_target()
            .is_some_and(|d| d.track_drop(&cctx, info, status))
    }

    /// Route a drop to the child under the payload.
    fn composite_drop(&mut self, ctx: &Context<'_>, info: &DropInfo) -> bool {
        let Some((ix, bounds)) = self.hit_element(ctx, info.pos, false) else {
            return false;
        };
        let cctx = ctx.child(bounds);
        self.child(ix)
            .drop_target()
            .is_some_and(|d| d.drop(&cctx, info))
    }

    /// Whether any child accepts focus.
    fn composite_wants_focus(&mut self) -> bool {
        (0..self.len()).any(|ix| {
            self.child(ix)
                .focusable()
                .is_some_and(|f| f.wants_focus())
        })
    }

    /// Activate focus: restore the remembered index, else scan per `req`.
    fn composite_begin_focus(&mut self, req: FocusRequest) -> bool {
        if self.state().focus.is_none() && req == FocusRequest::Restore {
            let saved = self.state().saved_focus;
            let saved = saved.filter(|&ix| ix < self.len());
            self.state().focus = saved;
        }
        if self.state().focus.is_none() {
            let len = self.len();
            let found = match req {
                FocusRequest::FromEnd => (0..len).rev().find(|&ix| {
                    self.child(ix)
                        .focusable()
                        .is_some_and(|f| f.wants_focus())
                }),
                _ => (0..len).find(|&ix| {
                    self.child(ix)
                        .focusable()
                        .is_some_and(|f| f.wants_focus())
                }),
            };
            self.state().focus = found;
        }
        let focus = self.state().focus;
        match focus {
            Some(ix) => {
                if let Some(f) = self.child(ix).focusable() {
                    f.begin_focus(req);
                }
                true
            }
            None => false,
        }
    }

    /// Deactivate focus, remembering the index for restoration.
    fn composite_end_focus(&mut self, ctx: &Context<'_>) {
        let focus = self.state().focus;
        if let Some(ix) = focus.filter(|&ix| ix < self.len()) {
            let bounds = self.bounds_of(ctx, ix);
            let cctx = ctx.child(bounds);
            if let Some(f) = self.child(ix).focusable() {
                f.end_focus(&cctx);
            }
        }
        let st = self.state();
        st.saved_focus = st.focus;
        st.focus = None;
    }

    /// The focused child index at this level, if any.
    fn focus_index(&mut self) -> Option<usize> {
        self.state().focus
    }

    /// Move focus to `ix` (or clear it), ending the old focus first and
    /// refreshing both children.
    fn focus_to(&mut self, ctx: &Context<'_>, ix: Option<usize>) {
        if self.state().focus == ix {
            return;
        }
        let previous = self.state().focus;
        if let Some(old) = previous.filter(|&old| old < self.len()) {
            let bounds = self.bounds_of(ctx, old);
            let cctx = ctx.child(bounds);
            if let Some(f) = self.child(old).focusable() {
                f.end_focus(&cctx);
            }
            ctx.view.refresh_rect(bounds);
        }
        self.state().focus = ix;
        if let Some(new) = ix.filter(|&new| new < self.len()) {
            if let Some(f) = self.child(new).focusable() {
                f.begin_focus(FocusRequest::Restore);
            }
            ctx.view.refresh_rect(self.bounds_of(ctx, new));
        }
    }

    /// One Tab step from the current focus. Returns `false` (unhandled)
    /// when the walk falls off either end, so an ancestor continues it.
    fn focus_step(&mut self, ctx: &Context<'_>, backward: bool) -> bool {
        let len = self.len();
        let current = self.state().focus;
        if backward {
            let mut ix = current.unwrap_or(len);
            while ix > 0 {
                ix -= 1;
                if self
                    .child(ix)
                    .focusable()
                    .is_some_and(|f| f.wants_focus())
                {
                    self.focus_to(ctx, Some(ix));
                    return true;
                }
            }
        } else {
            let mut ix = current.map_or(0, |c| c + 1);
            while ix < len {
                if self
                    .child(ix)
                    .focusable()
                    .is_some_and(|f| f.wants_focus())
                {
                    self.focus_to(ctx, Some(ix));
                    return true;
                }
                ix += 1;
            }
        }
        false
    }
}

/// Implements the four capability traits for a [`Composite`] container by
/// forwarding to the `composite_*` dispatch methods.
///
/// The `Element` impl stays hand-written (containers differ in limits,
/// layout, and draw); this macro only writes the part that is always the
/// same.
#[macro_export]
macro_rules! impl_composite_dispatch {
    ($ty:ty) => {
        impl $crate::element::Pointer for $ty {
            fn click(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::MouseButton,
            ) -> bool {
                $crate::composite::Composite::composite_click(self, ctx, ev)
            }

            fn drag(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::MouseButton,
            ) {
                $crate::composite::Composite::composite_drag(self, ctx, ev);
            }

            fn cursor(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                p: kurbo::Point,
                status: $crate::events::CursorStatus,
            ) -> bool {
                $crate::composite::Composite::composite_cursor(self, ctx, p, status)
            }

            fn scroll(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                dir: kurbo::Vec2,
                p: kurbo::Point,
            ) -> bool {
                $crate::composite::Composite::composite_scroll(self, ctx, dir, p)
            }
        }

        impl $crate::element::Keyboard for $ty {
            fn key(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::KeyEvent,
            ) -> bool {
                $crate::composite::Composite::composite_key(self, ctx, ev)
            }

            fn text(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::TextEvent,
            ) -> bool {
                $crate::composite::Composite::composite_text(self, ctx, ev)
            }
        }

        impl $crate::element::Focusable for $ty {
            fn wants_focus(&mut self) -> bool {
                $crate::composite::Composite::composite_wants_focus(self)
            }

            fn begin_focus(&mut self, req: $crate::element::FocusRequest) -> bool {
                $crate::composite::Composite::composite_begin_focus(self, req)
            }

            fn end_focus(&mut self, ctx: &$crate::context::Context<'_>) {
                $crate::composite::Composite::composite_end_focus(self, ctx);
            }
        }

        impl $crate::element::DropTarget for $ty {
            fn track_drop(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                info: &$crate::events::DropInfo,
                status: $crate::events::CursorStatus,
            ) -> bool {
                $crate::composite::Composite::composite_track_drop(self, ctx, info, status)
            }

            fn drop(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                info: &$crate::events::DropInfo,
            ) -> bool {
                $crate::composite::Composite::composite_drop(self, ctx, info)
            }
        }
    };
}

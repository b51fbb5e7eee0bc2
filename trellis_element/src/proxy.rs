// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxy machinery: decorators wrapping exactly one child.
//!
//! A [`Proxy`] forwards the entire element protocol to its subject
//! unchanged, except for the pieces a decorator overrides — usually just
//! [`Proxy::prepare`] (adjust the rectangle the subject occupies) and
//! [`Proxy::proxy_limits`]. Every forwarded call rebuilds the subject's
//! context from the prepared bounds, so the subject always sees its own
//! allocated rectangle.
//!
//! Decorators opt into scroll-request capture ([`Proxy::capture_scroll`])
//! when they can move their subject: a fresh [`ScrollRequest`] slot is
//! installed for the descent and inspected after the call returns.
//!
//! [`FixedSize`] and [`Margin`] are the two canonical decorators; the
//! [`crate::impl_proxy`] macro wires a `Proxy` implementation into the
//! `Element` and capability traits.

use kurbo::{Insets, Point, Rect, Size};

use crate::context::{Context, ScrollRequest};
use crate::element::{Element, ElementBox, FULL_EXTENT, FocusRequest, Limits, Stretch};
use crate::events::{CursorStatus, DropInfo, KeyEvent, MouseButton, TextEvent};
use crate::surface::Surface;

/// A decorator owning exactly one subject element.
///
/// The `proxy_*` methods carry the default "forward unchanged" behavior;
/// decorators override the few they care about.
pub trait Proxy {
    /// The wrapped element.
    fn subject(&self) -> &dyn Element;

    /// The wrapped element, mutably.
    fn subject_mut(&mut self) -> &mut dyn Element;

    /// Adjust the rectangle the subject will occupy.
    fn prepare(&mut self, ctx: &Context<'_>, bounds: &mut Rect) {
        let _ = (ctx, bounds);
    }

    /// When `true`, descents install a scroll-request slot and
    /// [`Proxy::scroll_request`] services anything deposited.
    fn capture_scroll(&self) -> bool {
        false
    }

    /// A descendant asked for `area` (root coordinates) to be brought
    /// into view.
    fn scroll_request(&mut self, ctx: &Context<'_>, area: Rect) {
        let _ = (ctx, area);
    }

    /// Run `f` against the subject with its prepared context.
    fn forward<R>(
        &mut self,
        ctx: &Context<'_>,
        f: impl FnOnce(&mut dyn Element, &Context<'_>) -> R,
    ) -> R {
        let mut bounds = ctx.bounds;
        self.prepare(ctx, &mut bounds);
        if self.capture_scroll() {
            let slot = ScrollRequest::new();
            let sctx = ctx.child_with_scroll(bounds, &slot);
            let r = f(self.subject_mut(), &sctx);
            if let Some(area) = slot.take() {
                self.scroll_request(ctx, area);
            }
            r
        } else {
            let sctx = ctx.child(bounds);
            f(self.subject_mut(), &sctx)
        }
    }

    /// Size negotiation; decorators that resize override this.
    fn proxy_limits(&mut self, ctx: &Context<'_>) -> Limits {
        self.subject_mut().limits(ctx)
    }

    /// Forwarded stretch.
    fn proxy_stretch(&self) -> Stretch {
        self.subject().stretch()
    }

    /// Forwarded span.
    fn proxy_span(&self) -> u32 {
        self.subject().span()
    }

    /// Forwarded layout with prepared bounds.
    fn proxy_layout(&mut self, ctx: &Context<'_>) {
        self.forward(ctx, |s, sctx| s.layout(sctx));
    }

    /// Forwarded draw with prepared bounds.
    fn proxy_draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        self.forward(ctx, |s, sctx| s.draw(sctx, surface));
    }

    /// Forwarded hit test with prepared bounds.
    fn proxy_hit_test(&mut self, ctx: &Context<'_>, p: Point, leaf: bool, control: bool) -> bool {
        self.forward(ctx, |s, sctx| s.hit_test(sctx, p, leaf, control))
    }

    /// Forwarded control query.
    fn proxy_wants_control(&self) -> bool {
        self.subject().wants_control()
    }

    /// Forwarded click.
    fn proxy_click(&mut self, ctx: &Context<'_>, ev: &MouseButton) -> bool {
        self.forward(ctx, |s, sctx| {
            s.pointer().is_some_and(|h| h.click(sctx, ev))
        })
    }

    /// Forwarded drag.
    fn proxy_drag(&mut self, ctx: &Context<'_>, ev: &MouseButton) {
        self.forward(ctx, |s, sctx| {
            if let Some(h) = s.pointer() {
                h.drag(sctx, ev);
            }
        });
    }

    /// Forwarded hover tracking.
    fn proxy_cursor(&mut self, ctx: &Context<'_>, p: Point, status: CursorStatus) -> bool {
        self.forward(ctx, |s, sctx| {
            s.pointer().is_some_and(|h| h.cursor(sctx, p, status))
        })
    }

    /// Forwarded scroll.
    fn proxy_scroll(&mut self, ctx: &Context<'_>, dir: kurbo::Vec2, p: Point) -> bool {
        self.forward(ctx, |s, sctx| {
            s.pointer().is_some_and(|h| h.scroll(sctx, dir, p))
        })
    }

    /// Forwarded key event.
    fn proxy_key(&mut self, ctx: &Context<'_>, ev: &KeyEvent) -> bool {
        self.forward(ctx, |s, sctx| s.keyboard().is_some_and(|k| k.key(sctx, ev)))
    }

    /// Forwarded text input.
    fn proxy_text(&mut self, ctx: &Context<'_>, ev: &TextEvent) -> bool {
        self.forward(ctx, |s, sctx| s.keyboard().is_some_and(|k| k.text(sctx, ev)))
    }

    /// Forwarded focus query.
    fn proxy_wants_focus(&mut self) -> bool {
        self.subject_mut().focusable().is_some_and(|f| f.wants_focus())
    }

    /// Forwarded focus activation.
    fn proxy_begin_focus(&mut self, req: FocusRequest) -> bool {
        self.subject_mut()
            .focusable()
            .is_some_and(|f| f.begin_focus(req))
    }

    /// Forwarded focus deactivation.
    fn proxy_end_focus(&mut self, ctx: &Context<'_>) {
        self.forward(ctx, |s, sctx| {
            if let Some(f) = s.focusable() {
                f.end_focus(sctx);
            }
        });
    }

    /// Forwarded drop tracking.
    fn proxy_track_drop(&mut self, ctx: &Context<'_>, info: &DropInfo, status: CursorStatus) -> bool {
        self.forward(ctx, |s, sctx| {
            s.drop_target().is_some_and(|d| d.track_drop(sctx, info, status))
        })
    }

    /// Forwarded drop.
    fn proxy_drop(&mut self, ctx: &Context<'_>, info: &DropInfo) -> bool {
        self.forward(ctx, |s, sctx| {
            s.drop_target().is_some_and(|d| d.drop(sctx, info))
        })
    }
}

/// Implements `Element` and the capability traits for a [`Proxy`] type by
/// forwarding to the `proxy_*` methods. Decorators customize behavior by
/// overriding `proxy_*` in their `Proxy` impl.
#[macro_export]
macro_rules! impl_proxy {
    ($ty:ty) => {
        impl $crate::element::Element for $ty {
            fn limits(&mut self, ctx: &$crate::context::Context<'_>) -> $crate::element::Limits {
                $crate::proxy::Proxy::proxy_limits(self, ctx)
            }

            fn stretch(&self) -> $crate::element::Stretch {
                $crate::proxy::Proxy::proxy_stretch(self)
            }

            fn span(&self) -> u32 {
                $crate::proxy::Proxy::proxy_span(self)
            }

            fn layout(&mut self, ctx: &$crate::context::Context<'_>) {
                $crate::proxy::Proxy::proxy_layout(self, ctx);
            }

            fn draw(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                surface: &mut dyn $crate::surface::Surface,
            ) {
                $crate::proxy::Proxy::proxy_draw(self, ctx, surface);
            }

            fn hit_test(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                p: kurbo::Point,
                leaf: bool,
                control: bool,
            ) -> bool {
                $crate::proxy::Proxy::proxy_hit_test(self, ctx, p, leaf, control)
            }

            fn wants_control(&self) -> bool {
                $crate::proxy::Proxy::proxy_wants_control(self)
            }

            fn pointer(&mut self) -> Option<&mut dyn $crate::element::Pointer> {
                Some(self)
            }

            fn keyboard(&mut self) -> Option<&mut dyn $crate::element::Keyboard> {
                Some(self)
            }

            fn focusable(&mut self) -> Option<&mut dyn $crate::element::Focusable> {
                Some(self)
            }

            fn drop_target(&mut self) -> Option<&mut dyn $crate::element::DropTarget> {
                Some(self)
            }
        }

        impl $crate::element::Pointer for $ty {
            fn click(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::MouseButton,
            ) -> bool {
                $crate::proxy::Proxy::proxy_click(self, ctx, ev)
            }

            fn drag(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::MouseButton,
            ) {
                $crate::proxy::Proxy::proxy_drag(self, ctx, ev);
            }

            fn cursor(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                p: kurbo::Point,
                status: $crate::events::CursorStatus,
            ) -> bool {
                $crate::proxy::Proxy::proxy_cursor(self, ctx, p, status)
            }

            fn scroll(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                dir: kurbo::Vec2,
                p: kurbo::Point,
            ) -> bool {
                $crate::proxy::Proxy::proxy_scroll(self, ctx, dir, p)
            }
        }

        impl $crate::element::Keyboard for $ty {
            fn key(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::KeyEvent,
            ) -> bool {
                $crate::proxy::Proxy::proxy_key(self, ctx, ev)
            }

            fn text(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                ev: &$crate::events::TextEvent,
            ) -> bool {
                $crate::proxy::Proxy::proxy_text(self, ctx, ev)
            }
        }

        impl $crate::element::Focusable for $ty {
            fn wants_focus(&mut self) -> bool {
                $crate::proxy::Proxy::proxy_wants_focus(self)
            }

            fn begin_focus(&mut self, req: $crate::element::FocusRequest) -> bool {
                $crate::proxy::Proxy::proxy_begin_focus(self, req)
            }

            fn end_focus(&mut self, ctx: &$crate::context::Context<'_>) {
                $crate::proxy::Proxy::proxy_end_focus(self, ctx);
            }
        }

        impl $crate::element::DropTarget for $ty {
            fn track_drop(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                info: &$crate::events::DropInfo,
                status: $crate::events::CursorStatus,
            ) -> bool {
                $crate::proxy::Proxy::proxy_track_drop(self, ctx, info, status)
            }

            fn drop(
                &mut self,
                ctx: &$crate::context::Context<'_>,
                info: &$crate::events::DropInfo,
            ) -> bool {
                $crate::proxy::Proxy::proxy_drop(self, ctx, info)
            }
        }
    };
}

/// Forces its subject to an exact size, anchored at the top-left of the
/// allocated rectangle.
pub struct FixedSize {
    size: Size,
    subject: ElementBox,
}

impl core::fmt::Debug for FixedSize {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FixedSize")
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl FixedSize {
    /// Wraps `subject`, pinning it to `size`.
    #[must_use]
    pub fn new(size: Size, subject: ElementBox) -> Self {
        Self { size, subject }
    }
}

impl Proxy for FixedSize {
    fn subject(&self) -> &dyn Element {
        &*self.subject
    }

    fn subject_mut(&mut self) -> &mut dyn Element {
        &mut *self.subject
    }

    fn proxy_limits(&mut self, _ctx: &Context<'_>) -> Limits {
        Limits::fixed(self.size)
    }

    fn prepare(&mut self, _ctx: &Context<'_>, bounds: &mut Rect) {
        *bounds = Rect::new(
            bounds.x0,
            bounds.y0,
            bounds.x0 + self.size.width,
            bounds.y0 + self.size.height,
        );
    }
}

impl_proxy!(FixedSize);

/// Insets its subject from the allocated rectangle.
pub struct Margin {
    insets: Insets,
    subject: ElementBox,
}

impl core::fmt::Debug for Margin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Margin")
            .field("insets", &self.insets)
            .finish_non_exhaustive()
    }
}

impl Margin {
    /// Wraps `subject` with the given insets on each side.
    #[must_use]
    pub fn new(insets: Insets, subject: ElementBox) -> Self {
        Self { insets, subject }
    }

    /// Wraps `subject` with the same inset on all sides.
    #[must_use]
    pub fn uniform(inset: f64, subject: ElementBox) -> Self {
        Self::new(Insets::uniform(inset), subject)
    }

    fn extra(&self) -> Size {
        Size::new(
            self.insets.x0 + self.insets.x1,
            self.insets.y0 + self.insets.y1,
        )
    }
}

impl Proxy for Margin {
    fn subject(&self) -> &dyn Element {
        &*self.subject
    }

    fn subject_mut(&mut self) -> &mut dyn Element {
        &mut *self.subject
    }

    fn proxy_limits(&mut self, ctx: &Context<'_>) -> Limits {
        let inner = self.subject_mut().limits(ctx);
        let extra = self.extra();
        Limits {
            min: Size::new(inner.min.width + extra.width, inner.min.height + extra.height),
            max: Size::new(
                (inner.max.width + extra.width).min(FULL_EXTENT),
                (inner.max.height + extra.height).min(FULL_EXTENT),
            ),
        }
    }

    fn prepare(&mut self, _ctx: &Context<'_>, bounds: &mut Rect) {
        let b = *bounds;
        *bounds = Rect::new(
            b.x0 + self.insets.x0,
            b.y0 + self.insets.y0,
            (b.x1 - self.insets.x1).max(b.x0 + self.insets.x0),
            (b.y1 - self.insets.y1).max(b.y0 + self.insets.y0),
        );
    }
}

impl_proxy!(Margin);

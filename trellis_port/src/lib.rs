// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=trellis_port --heading-base-level=0

//! Trellis Port: a clipping viewport decorator.
//!
//! A [`Port`] shows a window onto a subject that is larger than the
//! allocated rectangle. The subject is laid out at its natural minimum
//! extent and offset by two alignment fractions in `0..=1` (`0` shows
//! the start of the content, `1` the end); drawing is clipped to the
//! port bounds and every forwarded protocol call sees the same offset
//! rectangle, so hit-testing and input stay consistent with what is on
//! screen.
//!
//! The port owns the scroll interaction for its subtree:
//!
//! - Scroll events are offered to the subject first (nested scrollables
//!   win), then consumed by adjusting the alignment when there is
//!   overflow to move through.
//! - Descendants asking for a rectangle to be brought into view (a text
//!   box revealing its caret, say) deposit the request in the context's
//!   scroll slot; the port services it after the forwarded call
//!   returns, nudging its alignment by the smallest amount that makes
//!   the rectangle visible.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use core::fmt;

use kurbo::{Point, Rect, Size, Vec2};

use trellis_element::context::Context;
use trellis_element::element::{Element, ElementBox, Limits, Pointer};
use trellis_element::impl_proxy;
use trellis_element::proxy::Proxy;
use trellis_element::surface::Surface;

/// A clipping viewport over one subject element.
pub struct Port {
    subject: ElementBox,
    halign: f64,
    valign: f64,
}

impl fmt::Debug for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Port")
            .field("halign", &self.halign)
            .field("valign", &self.valign)
            .finish_non_exhaustive()
    }
}

impl Port {
    /// A port showing the start of `subject` on both axes.
    #[must_use]
    pub fn new(subject: ElementBox) -> Self {
        Self {
            subject,
            halign: 0.0,
            valign: 0.0,
        }
    }

    /// Horizontal alignment fraction in `0..=1`.
    #[must_use]
    pub fn halign(&self) -> f64 {
        self.halign
    }

    /// Vertical alignment fraction in `0..=1`.
    #[must_use]
    pub fn valign(&self) -> f64 {
        self.valign
    }

    /// Set the horizontal alignment fraction.
    pub fn set_halign(&mut self, align: f64) {
        self.halign = align.clamp(0.0, 1.0);
    }

    /// Set the vertical alignment fraction.
    pub fn set_valign(&mut self, align: f64) {
        self.valign = align.clamp(0.0, 1.0);
    }

    /// How far the subject's minimum extent exceeds the port bounds.
    fn overflow(&mut self, ctx: &Context<'_>) -> Size {
        let limits = self.subject.limits(ctx);
        Size::new(
            (limits.min.width - ctx.bounds.width()).max(0.0),
            (limits.min.height - ctx.bounds.height()).max(0.0),
        )
    }

    /// Consume a scroll delta against the available overflow.
    fn scroll_by(&mut self, ctx: &Context<'_>, dir: Vec2) -> bool {
        let overflow = self.overflow(ctx);
        let mut moved = false;
        if overflow.width > 0.0 && dir.x != 0.0 {
            let new = (self.halign - dir.x / overflow.width).clamp(0.0, 1.0);
            moved |= new != self.halign;
            self.halign = new;
        }
        if overflow.height > 0.0 && dir.y != 0.0 {
            let new = (self.valign - dir.y / overflow.height).clamp(0.0, 1.0);
            moved |= new != self.valign;
            self.valign = new;
        }
        if moved {
            ctx.view.refresh_rect(ctx.bounds);
        }
        moved
    }
}

impl Proxy for Port {
    fn subject(&self) -> &dyn Element {
        &*self.subject
    }

    fn subject_mut(&mut self) -> &mut dyn Element {
        &mut *self.subject
    }

    /// The subject gets its natural extent, offset by the alignment.
    fn prepare(&mut self, ctx: &Context<'_>, bounds: &mut Rect) {
        let limits = self.subject.limits(ctx);
        let width = bounds.width().max(limits.min.width);
        let height = bounds.height().max(limits.min.height);
        let dx = self.halign * (width - bounds.width());
        let dy = self.valign * (height - bounds.height());
        let x0 = bounds.x0 - dx;
        let y0 = bounds.y0 - dy;
        *bounds = Rect::new(x0, y0, x0 + width, y0 + height);
    }

    /// Content may shrink to nothing inside a port; only the maxima pass
    /// through.
    fn proxy_limits(&mut self, ctx: &Context<'_>) -> Limits {
        let limits = self.subject.limits(ctx);
        Limits {
            min: Size::ZERO,
            max: limits.max,
        }
    }

    fn proxy_draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        surface.push_clip(ctx.bounds);
        self.forward(ctx, |s, sctx| s.draw(sctx, surface));
        surface.pop_clip();
    }

    /// Offer the subject the scroll first; nested scrollables win.
    fn proxy_scroll(&mut self, ctx: &Context<'_>, dir: Vec2, p: Point) -> bool {
        let handled = self.forward(ctx, |s, sctx| {
            s.pointer().is_some_and(|h| h.scroll(sctx, dir, p))
        });
        if handled {
            return true;
        }
        self.scroll_by(ctx, dir)
    }

    fn capture_scroll(&self) -> bool {
        true
    }

    /// Nudge the alignment the minimal amount that reveals `area`.
    fn scroll_request(&mut self, ctx: &Context<'_>, area: Rect) {
        let b = ctx.bounds;
        let dx = if area.x0 < b.x0 {
            area.x0 - b.x0
        } else if area.x1 > b.x1 {
            area.x1 - b.x1
        } else {
            0.0
        };
        let dy = if area.y0 < b.y0 {
            area.y0 - b.y0
        } else if area.y1 > b.y1 {
            area.y1 - b.y1
        } else {
            0.0
        };
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        let overflow = self.overflow(ctx);
        if overflow.width > 0.0 && dx != 0.0 {
            self.halign = (self.halign + dx / overflow.width).clamp(0.0, 1.0);
        }
        if overflow.height > 0.0 && dy != 0.0 {
            self.valign = (self.valign + dy / overflow.height).clamp(0.0, 1.0);
        }
        ctx.view.refresh_rect(ctx.bounds);
    }
}

impl_proxy!(Port);

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;
    use trellis_element::context::Context;
    use trellis_element::element::{boxed, Pointer};
    use trellis_element::headless::HeadlessView;
    use trellis_element::surface::{DrawOp, Recorder};

    /// Fixed-size content that paints its own bounds.
    struct Canvas {
        size: Size,
    }

    impl Element for Canvas {
        fn limits(&mut self, _ctx: &Context<'_>) -> Limits {
            Limits {
                min: self.size,
                max: self.size,
            }
        }

        fn draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
            surface.fill_rect(ctx.bounds, peniko::Color::BLACK);
        }
    }

    const VIEWPORT: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

    fn tall_port() -> Port {
        Port::new(boxed(Canvas {
            size: Size::new(100.0, 400.0),
        }))
    }

    #[test]
    fn limits_allow_shrinking_below_content() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, VIEWPORT);
        let mut port = tall_port();
        let limits = port.limits(&ctx);
        assert_eq!(limits.min, Size::ZERO);
        assert_eq!(limits.max, Size::new(100.0, 400.0));
    }

    #[test]
    fn draw_clips_and_offsets_content() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, VIEWPORT);
        let mut port = tall_port();
        port.set_valign(0.5);

        let mut surface = Recorder::new(VIEWPORT);
        port.draw(&ctx, &mut surface);

        assert_eq!(surface.ops().first(), Some(&DrawOp::PushClip(VIEWPORT)));
        // Content is 300 units taller than the port; valign 0.5 shifts
        // it up by 150.
        let (area, _) = surface.fills().next().expect("content fill");
        assert_eq!(area, Rect::new(0.0, -150.0, 100.0, 250.0));
        assert_eq!(surface.ops().last(), Some(&DrawOp::PopClip));
    }

    #[test]
    fn scroll_consumes_overflow_and_stops_at_the_edges() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, VIEWPORT);
        let mut port = tall_port();

        // Wheel down by 60 of 300 overflow units.
        assert!(port.scroll(&ctx, Vec2::new(0.0, -60.0), Point::new(50.0, 50.0)));
        assert_eq!(port.valign(), 0.2);

        // Scrolling past the end clamps and eventually stops consuming.
        assert!(port.scroll(&ctx, Vec2::new(0.0, -600.0), Point::new(50.0, 50.0)));
        assert_eq!(port.valign(), 1.0);
        assert!(!port.scroll(&ctx, Vec2::new(0.0, -10.0), Point::new(50.0, 50.0)));

        // No horizontal overflow: horizontal scrolls fall through.
        assert!(!port.scroll(&ctx, Vec2::new(30.0, 0.0), Point::new(50.0, 50.0)));
    }

    #[test]
    fn scroll_request_reveals_the_area() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, VIEWPORT);
        let mut port = tall_port();

        // A descendant wants y 180..196 visible; the port must move down
        // by 96 units (96/300 of the overflow).
        port.scroll_request(&ctx, Rect::new(10.0, 180.0, 20.0, 196.0));
        assert_eq!(port.valign(), 0.32);

        // Already visible: nothing moves.
        let before = port.valign();
        port.scroll_request(&ctx, Rect::new(10.0, 10.0, 20.0, 20.0));
        assert_eq!(port.valign(), before);
    }
}

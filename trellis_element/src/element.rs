// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The element protocol: one core trait plus capability traits.
//!
//! Every node implements [`Element`] (size negotiation, layout, draw,
//! hit-test). Input handling is split into capability groups reached
//! through accessors — [`Element::pointer`], [`Element::keyboard`],
//! [`Element::focusable`], [`Element::drop_target`] — so implementers only
//! provide what they need and dispatch sites can cheaply ask "does this
//! node handle keys at all?". A plain label implements nothing beyond
//! `Element`; a text box implements all four groups.
//!
//! Ownership is strictly top-down: parents own children as
//! [`ElementBox`]es, no element owns its parent, and identity is by
//! address. Side effects are confined to the element itself and to
//! explicit requests on the context's view; cross-element effects go
//! through the composite or proxy that owns the relationship.

use alloc::boxed::Box;

use kurbo::{Point, Rect, Size, Vec2};

use crate::context::Context;
use crate::events::{CursorStatus, DropInfo, KeyEvent, MouseButton, TextEvent};
use crate::surface::Surface;

/// "Practically unbounded" extent for size limits.
pub const FULL_EXTENT: f64 = 1e6;

/// A rectangle covering the whole practically-addressable plane.
pub const EVERYWHERE: Rect = Rect::new(-FULL_EXTENT, -FULL_EXTENT, FULL_EXTENT, FULL_EXTENT);

/// Minimum and maximum extents an element will accept.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limits {
    /// Smallest acceptable size.
    pub min: Size,
    /// Largest acceptable size.
    pub max: Size,
}

impl Limits {
    /// No extent at all (collapsed).
    pub const NONE: Self = Self {
        min: Size::ZERO,
        max: Size::ZERO,
    };

    /// Any extent, from zero to [`FULL_EXTENT`].
    pub const FULL: Self = Self {
        min: Size::ZERO,
        max: Size::new(FULL_EXTENT, FULL_EXTENT),
    };

    /// An exact size: `min == max`.
    #[must_use]
    pub const fn fixed(size: Size) -> Self {
        Self {
            min: size,
            max: size,
        }
    }

    /// Clamps `size` into `min..=max` on both axes.
    #[must_use]
    pub fn clamp(&self, size: Size) -> Size {
        Size::new(
            size.width.clamp(self.min.width, self.max.width),
            size.height.clamp(self.min.height, self.max.height),
        )
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self::FULL
    }
}

/// Relative willingness to absorb extra space along each axis.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stretch {
    /// Horizontal weight.
    pub x: f64,
    /// Vertical weight.
    pub y: f64,
}

impl Stretch {
    /// Unit weight on both axes.
    pub const UNIT: Self = Self { x: 1.0, y: 1.0 };
}

impl Default for Stretch {
    fn default() -> Self {
        Self::UNIT
    }
}

/// How focus should land on an element when it is (re)activated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FocusRequest {
    /// Restore the remembered focus chain if there is one.
    Restore,
    /// Focus the first focusable descendant.
    FromStart,
    /// Focus the last focusable descendant.
    FromEnd,
}

/// An owned element tree node.
pub type ElementBox = Box<dyn Element>;

/// The core protocol every UI node implements.
///
/// All defaults are the "inert" behavior: unbounded limits, unit stretch,
/// no-op layout and draw, hit only by plain bounds inclusion, and no input
/// capabilities.
pub trait Element {
    /// Size negotiation: the extents this element will accept.
    ///
    /// `ctx.bounds` is the prospective parent rectangle, not an
    /// allocation; implementations must not treat it as their own bounds.
    fn limits(&mut self, ctx: &Context<'_>) -> Limits {
        let _ = ctx;
        Limits::FULL
    }

    /// Willingness to absorb extra space during parent layout.
    fn stretch(&self) -> Stretch {
        Stretch::UNIT
    }

    /// Number of grid/table columns this element spans.
    fn span(&self) -> u32 {
        1
    }

    /// Bounds were (re)assigned; recompute cached geometry.
    fn layout(&mut self, ctx: &Context<'_>) {
        let _ = ctx;
    }

    /// Paint into `surface`, clipped by the surface's current clip.
    fn draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        let _ = (ctx, surface);
    }

    /// Answer whether `p` hits this element.
    ///
    /// With `leaf == true` the deepest descendant passing the `control`
    /// filter answers (composites recurse); with `leaf == false` the
    /// outermost match answers from its own bounds, which lets modal
    /// overlays intercept before the drill-down. When `control` is set,
    /// only elements that [`Element::wants_control`] count.
    fn hit_test(&mut self, ctx: &Context<'_>, p: Point, leaf: bool, control: bool) -> bool {
        let _ = leaf;
        (!control || self.wants_control()) && ctx.bounds.contains(p)
    }

    /// Whether this element is an active control (participates in
    /// control-filtered hit tests).
    fn wants_control(&self) -> bool {
        false
    }

    /// Pointer capability (click/drag/hover/scroll), if any.
    fn pointer(&mut self) -> Option<&mut dyn Pointer> {
        None
    }

    /// Keyboard capability (keys and text input), if any.
    fn keyboard(&mut self) -> Option<&mut dyn Keyboard> {
        None
    }

    /// Focus capability, if any.
    fn focusable(&mut self) -> Option<&mut dyn Focusable> {
        None
    }

    /// Drag-and-drop target capability, if any.
    fn drop_target(&mut self) -> Option<&mut dyn DropTarget> {
        None
    }
}

/// Pointer interaction capability.
///
/// All handlers return handled/unhandled; unhandled propagates to an
/// ancestor or is dropped (a soft dispatch miss, never an error).
pub trait Pointer {
    /// A button press or release inside this element's bounds.
    fn click(&mut self, ctx: &Context<'_>, ev: &MouseButton) -> bool {
        let _ = (ctx, ev);
        false
    }

    /// Pointer movement while a press is being tracked.
    fn drag(&mut self, ctx: &Context<'_>, ev: &MouseButton) {
        let _ = (ctx, ev);
    }

    /// Hover tracking; see [`CursorStatus`] for the episode contract.
    fn cursor(&mut self, ctx: &Context<'_>, p: Point, status: CursorStatus) -> bool {
        let _ = (ctx, p, status);
        false
    }

    /// Wheel/trackpad scroll by `dir` at pointer position `p`.
    fn scroll(&mut self, ctx: &Context<'_>, dir: Vec2, p: Point) -> bool {
        let _ = (ctx, dir, p);
        false
    }
}

/// Keyboard interaction capability.
pub trait Keyboard {
    /// A key press/repeat/release routed via the focus chain.
    fn key(&mut self, ctx: &Context<'_>, ev: &KeyEvent) -> bool {
        let _ = (ctx, ev);
        false
    }

    /// Decoded text input routed to the focused element.
    fn text(&mut self, ctx: &Context<'_>, ev: &TextEvent) -> bool {
        let _ = (ctx, ev);
        false
    }
}

/// Focus capability.
///
/// Queries take `&mut self` so containers are free to consult (and lazily
/// materialize) children while answering.
pub trait Focusable {
    /// Whether this element currently accepts focus.
    fn wants_focus(&mut self) -> bool {
        true
    }

    /// Activate focus. Returns `false` when nothing could take it.
    fn begin_focus(&mut self, req: FocusRequest) -> bool;

    /// Deactivate focus. The context allows flushing pending work (for
    /// example an open typing burst) through the view.
    fn end_focus(&mut self, ctx: &Context<'_>);
}

/// Drag-and-drop target capability.
pub trait DropTarget {
    /// Track a payload being dragged across this element.
    fn track_drop(&mut self, ctx: &Context<'_>, info: &DropInfo, status: CursorStatus) -> bool {
        let _ = (ctx, info, status);
        false
    }

    /// The payload was released on this element.
    fn drop(&mut self, ctx: &Context<'_>, info: &DropInfo) -> bool {
        let _ = (ctx, info);
        false
    }
}

/// Boxes an element for tree ownership.
pub fn boxed<E: Element + 'static>(element: E) -> ElementBox {
    Box::new(element)
}

/// Returns `true` when `a` and `b` overlap with positive area.
#[must_use]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x0 < b.x1 && b.x0 < a.x1 && a.y0 < b.y1 && b.y0 < a.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessView;

    struct Inert;
    impl Element for Inert {}

    #[test]
    fn defaults_are_inert() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut e = Inert;

        assert_eq!(e.limits(&ctx), Limits::FULL);
        assert_eq!(e.stretch(), Stretch::UNIT);
        assert_eq!(e.span(), 1);
        assert!(e.pointer().is_none());
        assert!(e.keyboard().is_none());
        assert!(e.focusable().is_none());
    }

    #[test]
    fn default_hit_test_is_bounds_inclusion() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut e = Inert;

        assert!(e.hit_test(&ctx, Point::new(5.0, 5.0), true, false));
        assert!(!e.hit_test(&ctx, Point::new(15.0, 5.0), true, false));
        // Not a control, so the control filter rejects it.
        assert!(!e.hit_test(&ctx, Point::new(5.0, 5.0), true, true));
    }

    #[test]
    fn limits_clamp() {
        let lim = Limits {
            min: Size::new(10.0, 20.0),
            max: Size::new(100.0, 40.0),
        };
        assert_eq!(lim.clamp(Size::new(5.0, 30.0)), Size::new(10.0, 30.0));
        assert_eq!(lim.clamp(Size::new(500.0, 50.0)), Size::new(100.0, 40.0));
    }

    #[test]
    fn rect_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(intersects(a, Rect::new(5.0, 5.0, 15.0, 15.0)));
        // Edge-touching rectangles do not overlap.
        assert!(!intersects(a, Rect::new(10.0, 0.0, 20.0, 10.0)));
    }
}

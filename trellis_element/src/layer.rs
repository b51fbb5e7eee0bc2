// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A stacking composite: every child occupies the full bounds, painted in
//! push order, hit-tested back-to-front so overlays win.

use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Rect};

use crate::composite::{Composite, CompositeState};
use crate::context::Context;
use crate::element::{Element, ElementBox, Limits};
use crate::impl_composite_dispatch;
use crate::surface::Surface;

/// An ordered stack of overlaid children.
///
/// Later children paint on top and win hit tests
/// ([`Composite::reverse_index`] is set), which is what makes a `Layer`
/// the natural host for modal overlays and popups.
#[derive(Default)]
pub struct Layer {
    children: Vec<ElementBox>,
    state: CompositeState,
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layer")
            .field("children", &self.children.len())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl Layer {
    /// An empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a child on top of the stack.
    pub fn push(&mut self, child: ElementBox) {
        self.children.push(child);
    }

    /// Remove and return the topmost child.
    pub fn pop(&mut self) -> Option<ElementBox> {
        let top = self.children.pop();
        // Indices may now be stale wholesale.
        self.state.reset();
        top
    }

    /// Builder-style push.
    #[must_use]
    pub fn with(mut self, child: ElementBox) -> Self {
        self.push(child);
        self
    }
}

impl Composite for Layer {
    fn len(&self) -> usize {
        self.children.len()
    }

    fn child(&mut self, ix: usize) -> &mut dyn Element {
        &mut *self.children[ix]
    }

    fn bounds_of(&self, ctx: &Context<'_>, _ix: usize) -> Rect {
        ctx.bounds
    }

    fn reverse_index(&self) -> bool {
        true
    }

    fn state(&mut self) -> &mut CompositeState {
        &mut self.state
    }
}

impl Element for Layer {
    fn limits(&mut self, ctx: &Context<'_>) -> Limits {
        // The stack needs the union of its children's minima and the
        // intersection of their maxima.
        let mut limits = Limits::FULL;
        for child in &mut self.children {
            let l = child.limits(ctx);
            limits.min.width = limits.min.width.max(l.min.width);
            limits.min.height = limits.min.height.max(l.min.height);
            limits.max.width = limits.max.width.min(l.max.width).max(limits.min.width);
            limits.max.height = limits.max.height.min(l.max.height).max(limits.min.height);
        }
        limits
    }

    fn layout(&mut self, ctx: &Context<'_>) {
        for child in &mut self.children {
            let cctx = ctx.child(ctx.bounds);
            child.layout(&cctx);
        }
    }

    fn draw(&mut self, ctx: &Context<'_>, surface: &mut dyn Surface) {
        self.composite_draw(ctx, surface);
    }

    fn hit_test(&mut self, ctx: &Context<'_>, p: Point, leaf: bool, control: bool) -> bool {
        if leaf {
            self.hit_element(ctx, p, control).is_some()
        } else {
            (!control || self.wants_control()) && ctx.bounds.contains(p)
        }
    }

    fn wants_control(&self) -> bool {
        self.children.iter().any(|c| c.wants_control())
    }

    fn pointer(&mut self) -> Option<&mut dyn crate::element::Pointer> {
        Some(self)
    }

    fn keyboard(&mut self) -> Option<&mut dyn crate::element::Keyboard> {
        Some(self)
    }

    fn focusable(&mut self) -> Option<&mut dyn crate::element::Focusable> {
        Some(self)
    }

    fn drop_target(&mut self) -> Option<&mut dyn crate::element::DropTarget> {
        Some(self)
    }
}

impl_composite_dispatch!(Layer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Focusable, Keyboard, Pointer, boxed};
    use crate::events::{Key, KeyEvent, Modifiers, MouseButton};
    use crate::headless::HeadlessView;

    /// A focusable control that records what reached it.
    #[derive(Default)]
    struct Widget {
        clicks: u32,
        keys: u32,
        focused: bool,
    }

    impl Element for Widget {
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

    impl Pointer for Widget {
        fn click(&mut self, _ctx: &Context<'_>, ev: &MouseButton) -> bool {
            if ev.down {
                self.clicks += 1;
            }
            true
        }
    }

    impl Keyboard for Widget {
        fn key(&mut self, _ctx: &Context<'_>, ev: &KeyEvent) -> bool {
            if ev.key == Key::Char('w') {
                self.keys += 1;
                return true;
            }
            false
        }
    }

    impl Focusable for Widget {
        fn begin_focus(&mut self, _req: crate::element::FocusRequest) -> bool {
            self.focused = true;
            true
        }

        fn end_focus(&mut self, _ctx: &Context<'_>) {
            self.focused = false;
        }
    }

    fn three_widget_layer() -> Layer {
        Layer::new()
            .with(boxed(Widget::default()))
            .with(boxed(Widget::default()))
            .with(boxed(Widget::default()))
    }

    #[test]
    fn topmost_child_wins_hit_test() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = three_widget_layer();

        let hit = layer.hit_element(&ctx, Point::new(50.0, 50.0), true);
        assert_eq!(hit.map(|(ix, _)| ix), Some(2));
    }

    #[test]
    fn click_focuses_and_tracks_gesture() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = three_widget_layer();

        assert!(layer.composite_click(&ctx, &MouseButton::down_at(Point::new(50.0, 50.0))));
        assert_eq!(layer.focus_index(), Some(2));
        assert_eq!(layer.state().click_tracking, Some(2));

        // Release lands on the tracked child even at a different point.
        assert!(layer.composite_click(&ctx, &MouseButton::up_at(Point::new(1.0, 1.0))));
        assert_eq!(layer.state().click_tracking, None);
    }

    #[test]
    fn tab_walks_focus_and_falls_off_the_end() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = three_widget_layer();

        // Layer reverses iteration, so an unshifted Tab walks backwards
        // through indices (visually front-to-back).
        let tab = KeyEvent::press(Key::Tab);
        assert!(layer.composite_key(&ctx, &tab));
        assert_eq!(layer.focus_index(), Some(2));
        assert!(layer.composite_key(&ctx, &tab));
        assert_eq!(layer.focus_index(), Some(1));
        assert!(layer.composite_key(&ctx, &tab));
        assert_eq!(layer.focus_index(), Some(0));
        // Off the end: unhandled, ancestor would continue the walk.
        assert!(!layer.composite_key(&ctx, &tab));

        // Shift-Tab goes the other way.
        let shift_tab = KeyEvent::press_with(Key::Tab, Modifiers::SHIFT);
        assert!(layer.composite_key(&ctx, &shift_tab));
        assert_eq!(layer.focus_index(), Some(1));
    }

    #[test]
    fn focus_restores_remembered_index() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = three_widget_layer();

        layer.focus_to(&ctx, Some(1));
        layer.composite_end_focus(&ctx);
        assert_eq!(layer.focus_index(), None);

        assert!(layer.composite_begin_focus(crate::element::FocusRequest::Restore));
        assert_eq!(layer.focus_index(), Some(1));
    }

    #[test]
    fn key_routes_to_focused_child() {
        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = three_widget_layer();

        layer.focus_to(&ctx, Some(0));
        assert!(layer.composite_key(&ctx, &KeyEvent::press(Key::Char('w'))));
    }

    #[test]
    fn drop_routes_to_the_child_under_the_payload() {
        use alloc::string::String;

        use crate::element::DropTarget;
        use crate::events::DropInfo;

        #[derive(Default)]
        struct Bin {
            received: Option<String>,
        }

        impl Element for Bin {
            fn wants_control(&self) -> bool {
                true
            }

            fn drop_target(&mut self) -> Option<&mut dyn DropTarget> {
                Some(self)
            }
        }

        impl DropTarget for Bin {
            fn drop(&mut self, _ctx: &Context<'_>, info: &DropInfo) -> bool {
                self.received = info.get("text/uri-list").map(String::from);
                self.received.is_some()
            }
        }

        let view = HeadlessView::new();
        let ctx = Context::root(&view, Rect::new(0.0, 0.0, 100.0, 100.0));
        let mut layer = Layer::new().with(boxed(Bin::default()));

        let mut info = DropInfo {
            pos: Point::new(50.0, 50.0),
            ..DropInfo::default()
        };
        info.payload
            .insert(String::from("text/uri-list"), String::from("file:///tmp/a"));

        assert!(layer.composite_drop(&ctx, &info));
        // A payload landing outside the layer is a soft miss.
        info.pos = Point::new(500.0, 500.0);
        assert!(!layer.composite_drop(&ctx, &info));
    }
}

// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The drawing-surface contract, plus a recording reference surface.
//!
//! Rendering backends live outside this workspace; elements emit geometry
//! through [`Surface`] and the host binds it to a real canvas. The
//! operations are deliberately few: the core needs the current clip (the
//! virtualized list culls against it), a clip stack, and flat fills and
//! lines for selection bands and carets.
//!
//! [`Recorder`] implements the contract by recording operations, in the
//! manner of a reference renderer: tests assert on the recorded ops, and
//! headless hosts can replay them.

use alloc::string::String;
use alloc::vec::Vec;

use kurbo::{Point, Rect};
use peniko::Color;

/// Minimal drawing operations the element core emits.
pub trait Surface {
    /// The rectangle currently reachable by drawing, in root coordinates.
    ///
    /// Draw passes use this to skip content that cannot appear; the
    /// virtualized list binary-searches its cell table against it.
    fn clip_extent(&self) -> Rect;

    /// Intersect the clip with `area` and push it on the clip stack.
    fn push_clip(&mut self, area: Rect);

    /// Restore the clip in effect before the matching `push_clip`.
    fn pop_clip(&mut self);

    /// Fill `area` with a flat color.
    fn fill_rect(&mut self, area: Rect, color: Color);

    /// Stroke a line of the given width.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color);

    /// Hand a run of text to the renderer, anchored at its top-left.
    ///
    /// Glyph layout and font policy belong to the backend; elements that
    /// need caret/selection geometry measure through their own shaper and
    /// only emit the runs here.
    fn fill_text(&mut self, text: &str, origin: Point, color: Color);
}

/// One recorded drawing operation.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    /// A clip was pushed (already intersected with the previous clip).
    PushClip(Rect),
    /// A clip was popped.
    PopClip,
    /// A flat fill.
    FillRect {
        /// Filled area.
        area: Rect,
        /// Fill color.
        color: Color,
    },
    /// A stroked line.
    StrokeLine {
        /// Start point.
        from: Point,
        /// End point.
        to: Point,
        /// Stroke width.
        width: f64,
        /// Stroke color.
        color: Color,
    },
    /// A text run handed to the renderer.
    FillText {
        /// The run's contents.
        text: String,
        /// Top-left anchor.
        origin: Point,
        /// Text color.
        color: Color,
    },
}

/// A recording [`Surface`] for tests and headless hosts.
#[derive(Debug)]
pub struct Recorder {
    base: Rect,
    clips: Vec<Rect>,
    ops: Vec<DrawOp>,
}

impl Recorder {
    /// Creates a recorder whose base clip is `viewport`.
    #[must_use]
    pub fn new(viewport: Rect) -> Self {
        Self {
            base: viewport,
            clips: Vec::new(),
            ops: Vec::new(),
        }
    }

    /// All recorded operations, in order.
    #[must_use]
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Recorded fills, in order.
    pub fn fills(&self) -> impl Iterator<Item = (Rect, Color)> + '_ {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::FillRect { area, color } => Some((*area, *color)),
            _ => None,
        })
    }

    /// Forget everything recorded so far, keeping the base clip.
    pub fn clear(&mut self) {
        self.clips.clear();
        self.ops.clear();
    }
}

impl Surface for Recorder {
    fn clip_extent(&self) -> Rect {
        self.clips.last().copied().unwrap_or(self.base)
    }

    fn push_clip(&mut self, area: Rect) {
        let clipped = self.clip_extent().intersect(area);
        self.clips.push(clipped);
        self.ops.push(DrawOp::PushClip(clipped));
    }

    fn pop_clip(&mut self) {
        debug_assert!(!self.clips.is_empty(), "pop_clip without matching push_clip");
        self.clips.pop();
        self.ops.push(DrawOp::PopClip);
    }

    fn fill_rect(&mut self, area: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { area, color });
    }

    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: Color) {
        self.ops.push(DrawOp::StrokeLine {
            from,
            to,
            width,
            color,
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, color: Color) {
        self.ops.push(DrawOp::FillText {
            text: String::from(text),
            origin,
            color,
        });
    }
}

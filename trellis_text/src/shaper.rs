// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The text measurement contract the editor consumes.
//!
//! Font matching and glyph layout belong to the rendering backend; the
//! editor only ever asks the questions answered here: where a point
//! lands in the buffer, where a byte offset sits on screen, and how the
//! text breaks into lines. [`MonoShaper`] answers them for a fixed
//! advance and newline-only breaking, which is exact enough for tests,
//! terminals, and headless hosts.
//!
//! All geometry is flow-local: origin at the top-left of the first
//! line, `y` growing downward.

use alloc::vec::Vec;

use kurbo::{Point, Size};

use crate::state::{floor_boundary, next_boundary};

/// Measures flowed text for the editor.
pub trait TextShaper {
    /// Re-flow `text` for the given available width.
    fn flow(&mut self, text: &str, width: f64);

    /// Height of one line.
    fn line_height(&self) -> f64;

    /// Size of the flowed text (at least one line high).
    fn size(&self) -> Size;

    /// Number of flowed lines.
    fn line_count(&self) -> usize;

    /// Byte range of the given line, excluding any trailing newline.
    fn line_range(&self, line: usize) -> (usize, usize);

    /// The byte offset nearest to a flow-local point, `None` when the
    /// point is outside the flowed text vertically.
    fn hit(&self, p: Point) -> Option<usize>;

    /// Flow-local top-left of the caret for a byte offset.
    fn offset_point(&self, offset: usize) -> Point;
}

/// Fixed-advance, newline-broken reference shaper.
#[derive(Clone, Debug)]
pub struct MonoShaper {
    advance: f64,
    line_height: f64,
    /// Byte ranges per line, newline excluded.
    lines: Vec<(usize, usize)>,
    /// Character columns per line.
    cols: Vec<usize>,
    /// Copy of the flowed text for column/offset conversion.
    text: alloc::string::String,
}

impl MonoShaper {
    /// A shaper with the given cell advance and line height.
    #[must_use]
    pub fn new(advance: f64, line_height: f64) -> Self {
        Self {
            advance,
            line_height,
            lines: Vec::new(),
            cols: Vec::new(),
            text: alloc::string::String::new(),
        }
    }

    fn line_of(&self, offset: usize) -> usize {
        // The first line whose end reaches the offset owns it.
        self.lines
            .iter()
            .position(|&(_, end)| offset <= end)
            .unwrap_or(self.lines.len().saturating_sub(1))
    }

    fn col_of(&self, line: usize, offset: usize) -> usize {
        let (start, end) = self.lines[line];
        let offset = offset.clamp(start, end);
        self.text[start..offset].chars().count()
    }

    fn offset_at_col(&self, line: usize, col: usize) -> usize {
        let (start, end) = self.lines[line];
        let mut offset = start;
        for _ in 0..col {
            if offset >= end {
                break;
            }
            offset = next_boundary(&self.text, offset);
        }
        offset.min(end)
    }
}

impl TextShaper for MonoShaper {
    fn flow(&mut self, text: &str, _width: f64) {
        self.text.clear();
        self.text.push_str(text);
        self.lines.clear();
        self.cols.clear();

        let mut start = 0;
        loop {
            match self.text[start..].find('\n') {
                Some(rel) => {
                    let end = start + rel;
                    self.lines.push((start, end));
                    self.cols.push(self.text[start..end].chars().count());
                    start = end + 1;
                }
                None => {
                    let end = self.text.len();
                    self.lines.push((start, end));
                    self.cols.push(self.text[start..end].chars().count());
                    break;
                }
            }
        }
    }

    fn line_height(&self) -> f64 {
        self.line_height
    }

    fn size(&self) -> Size {
        let widest = self.cols.iter().copied().max().unwrap_or(0);
        let lines = self.lines.len().max(1);
        Size::new(
            widest as f64 * self.advance,
            lines as f64 * self.line_height,
        )
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_range(&self, line: usize) -> (usize, usize) {
        self.lines[line]
    }

    fn hit(&self, p: Point) -> Option<usize> {
        if self.lines.is_empty() || p.y < 0.0 {
            return None;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "non-negative and bounded by the line count check below"
        )]
        let line = (p.y / self.line_height) as usize;
        if line >= self.lines.len() {
            return None;
        }
        let x = p.x.max(0.0);
        #[expect(
            clippy::cast_possible_truncation,
            reason = "non-negative and clamped to the line's column count"
        )]
        let col = (x / self.advance + 0.5) as usize;
        Some(self.offset_at_col(line, col.min(self.cols[line])))
    }

    fn offset_point(&self, offset: usize) -> Point {
        if self.lines.is_empty() {
            return Point::ZERO;
        }
        let offset = floor_boundary(&self.text, offset);
        let line = self.line_of(offset);
        let col = self.col_of(line, offset);
        Point::new(col as f64 * self.advance, line as f64 * self.line_height)
    }
}

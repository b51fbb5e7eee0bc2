// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The editable-text state model: a UTF-8 buffer plus a selection, and
//! the boundary/word helpers the editor's caret motion is built on.
//!
//! Offsets are byte offsets and always sit on UTF-8 character
//! boundaries. A [`Selection`] keeps its endpoints in gesture order —
//! `end` is the moving end during a drag — and call sites normalize with
//! [`Selection::range`] before slicing. "No selection" (the element has
//! never been focused) is modeled as `Option::None`.
//!
//! The state lives behind `Rc<RefCell<_>>`, shared between the element
//! and the restore thunks it pushes onto the undo stack: a thunk holds a
//! weak handle plus a [`Snapshot`], so restoring after the element is
//! gone is a silent no-op. Every mutation bumps [`EditState::revision`],
//! which is how the element notices out-of-band restores and re-flows
//! its shaper.

use alloc::string::String;

/// A selection over the text buffer: byte offsets, possibly inverted.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    /// The anchor end.
    pub start: usize,
    /// The active (moving) end.
    pub end: usize,
}

impl Selection {
    /// A collapsed selection (a caret) at `at`.
    #[must_use]
    pub const fn caret(at: usize) -> Self {
        Self { start: at, end: at }
    }

    /// `true` when both ends coincide.
    #[must_use]
    pub const fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// The normalized `(low, high)` pair.
    #[must_use]
    pub const fn range(&self) -> (usize, usize) {
        if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        }
    }
}

/// A full copy of the editable state at one point in time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// The text buffer.
    pub text: String,
    /// The selection.
    pub selection: Option<Selection>,
}

/// The mutable editing state shared with undo thunks.
#[derive(Clone, Debug, Default)]
pub struct EditState {
    /// The UTF-8 text buffer.
    pub text: String,
    /// The selection, `None` before the first focus.
    pub selection: Option<Selection>,
    /// Bumped on every mutation, including out-of-band restores.
    pub revision: u64,
}

impl EditState {
    /// State holding `text` with no selection.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
            revision: 0,
        }
    }

    /// Copy out the restorable parts.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            text: self.text.clone(),
            selection: self.selection,
        }
    }

    /// Restore a snapshot taken earlier.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.text = snapshot.text;
        self.selection = snapshot.selection;
        self.revision += 1;
    }

    /// Record that the state changed.
    pub fn touch(&mut self) {
        self.revision += 1;
    }

    /// Pull both selection ends back onto the (possibly shorter) text.
    pub fn clamp_selection(&mut self) {
        let len = self.text.len();
        if let Some(sel) = &mut self.selection {
            sel.start = floor_boundary(&self.text, sel.start.min(len));
            sel.end = floor_boundary(&self.text, sel.end.min(len));
        }
    }
}

/// The boundary at or before `i`.
#[must_use]
pub fn floor_boundary(s: &str, i: usize) -> usize {
    let mut i = i.min(s.len());
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// The boundary after the character starting at `i` (or `len`).
#[must_use]
pub fn next_boundary(s: &str, i: usize) -> usize {
    s[i..].chars().next().map_or(s.len(), |c| i + c.len_utf8())
}

/// The boundary before the character ending at `i` (or `0`).
#[must_use]
pub fn prev_boundary(s: &str, i: usize) -> usize {
    s[..i].chars().next_back().map_or(0, |c| i - c.len_utf8())
}

fn char_at(s: &str, i: usize) -> Option<char> {
    s[i..].chars().next()
}

/// Whether `c` separates words for caret motion and double-click.
#[must_use]
pub fn is_word_break(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation()
}

/// End of the word run following `i`: skips separators, then the word.
#[must_use]
pub fn next_word(s: &str, i: usize) -> usize {
    let mut p = i.min(s.len());
    while p < s.len() && char_at(s, p).is_some_and(is_word_break) {
        p = next_boundary(s, p);
    }
    while p < s.len() && char_at(s, p).is_some_and(|c| !is_word_break(c)) {
        p = next_boundary(s, p);
    }
    p
}

/// Start of the word run preceding `i`.
#[must_use]
pub fn prev_word(s: &str, i: usize) -> usize {
    if i == 0 {
        return 0;
    }
    let mut p = prev_boundary(s, i);
    while p > 0 && char_at(s, p).is_some_and(is_word_break) {
        p = prev_boundary(s, p);
    }
    while p > 0 && char_at(s, p).is_some_and(|c| !is_word_break(c)) {
        p = prev_boundary(s, p);
    }
    if p > 0 {
        p = next_boundary(s, p);
    }
    p
}

/// The word run around `i`, for double-click selection.
#[must_use]
pub fn word_around(s: &str, i: usize) -> (usize, usize) {
    let i = i.min(s.len());
    let mut last = i;
    while last < s.len() && char_at(s, last).is_some_and(|c| !is_word_break(c)) {
        last = next_boundary(s, last);
    }
    let mut first = i;
    while first > 0 && char_at(s, first).is_some_and(|c| !is_word_break(c)) {
        first = prev_boundary(s, first);
    }
    if first > 0 {
        first = next_boundary(s, first);
    }
    (first.min(last), last)
}

/// The line around `i`, for triple-click selection; excludes the
/// newline itself.
#[must_use]
pub fn line_around(s: &str, i: usize) -> (usize, usize) {
    let i = i.min(s.len());
    let first = s[..i].rfind('\n').map_or(0, |p| p + 1);
    let last = s[i..].find('\n').map_or(s.len(), |p| i + p);
    (first, last)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_normalizes_either_order() {
        let forward = Selection { start: 2, end: 5 };
        let backward = Selection { start: 5, end: 2 };
        assert_eq!(forward.range(), (2, 5));
        assert_eq!(backward.range(), (2, 5));
    }

    #[test]
    fn boundaries_respect_multibyte_chars() {
        let s = "aéb";
        assert_eq!(next_boundary(s, 0), 1);
        assert_eq!(next_boundary(s, 1), 3);
        assert_eq!(prev_boundary(s, 3), 1);
        assert_eq!(prev_boundary(s, 1), 0);
        assert_eq!(floor_boundary(s, 2), 1);
    }

    #[test]
    fn word_motion_skips_separators() {
        let s = "one  two, three";
        assert_eq!(next_word(s, 0), 3);
        assert_eq!(next_word(s, 3), 8);
        assert_eq!(prev_word(s, 8), 5);
        assert_eq!(prev_word(s, 15), 10);
    }

    #[test]
    fn word_around_picks_the_run_under_the_caret() {
        let s = "hello world";
        assert_eq!(word_around(s, 2), (0, 5));
        assert_eq!(word_around(s, 8), (6, 11));
    }

    #[test]
    fn line_around_excludes_newlines() {
        let s = "ab\ncdef\ngh";
        assert_eq!(line_around(s, 1), (0, 2));
        assert_eq!(line_around(s, 5), (3, 7));
        assert_eq!(line_around(s, 9), (8, 10));
    }

    #[test]
    fn restore_bumps_revision_and_clamp_holds_boundaries() {
        let mut state = EditState::new("héllo");
        state.selection = Some(Selection { start: 0, end: 4 });
        let snap = state.snapshot();

        state.text = String::from("x");
        state.clamp_selection();
        assert_eq!(state.selection, Some(Selection { start: 0, end: 1 }));

        let r0 = state.revision;
        state.restore(snap);
        assert!(state.revision > r0);
        assert_eq!(state.text, "héllo");
    }
}

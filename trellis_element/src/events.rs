// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input event value types shared across the element protocol.
//!
//! These are plain data carriers: the platform host decodes native events
//! into these types and routes them into the root element. None of them
//! retain references into the tree.

use alloc::string::String;

use hashbrown::HashMap;
use kurbo::Point;

bitflags::bitflags! {
    /// Keyboard modifier state attached to pointer and key events.
    ///
    /// `ACTION` is the platform command modifier (Ctrl on Windows/Linux,
    /// Cmd on macOS); hosts map it when decoding, so shortcut handling in
    /// elements stays platform-neutral.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift key.
        const SHIFT   = 0b0000_0001;
        /// Control key.
        const CONTROL = 0b0000_0010;
        /// Alt / Option key.
        const ALT     = 0b0000_0100;
        /// Super / Windows / Command key.
        const SUPER   = 0b0000_1000;
        /// The platform "command" modifier for shortcuts.
        const ACTION  = 0b0001_0000;
    }
}

/// Which mouse button an event refers to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Primary button.
    Left,
    /// Middle button / wheel press.
    Middle,
    /// Secondary button.
    Right,
}

/// A mouse button transition (press or release), with click count.
///
/// `clicks` carries the host's click-count so elements can implement
/// double/triple-click gestures without tracking timing themselves.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MouseButton {
    /// `true` on press, `false` on release.
    pub down: bool,
    /// Click count for this press (1 = single, 2 = double, 3 = triple).
    pub clicks: u8,
    /// Which button changed state.
    pub button: Button,
    /// Modifier state at event time.
    pub modifiers: Modifiers,
    /// Pointer position in the root coordinate space.
    pub pos: Point,
}

impl MouseButton {
    /// A plain left-button press at `pos`.
    #[must_use]
    pub const fn down_at(pos: Point) -> Self {
        Self {
            down: true,
            clicks: 1,
            button: Button::Left,
            modifiers: Modifiers::empty(),
            pos,
        }
    }

    /// A plain left-button release at `pos`.
    #[must_use]
    pub const fn up_at(pos: Point) -> Self {
        Self {
            down: false,
            clicks: 1,
            button: Button::Left,
            modifiers: Modifiers::empty(),
            pos,
        }
    }
}

/// Phase of a key event.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Initial press.
    Press,
    /// Auto-repeat while held.
    Repeat,
    /// Release.
    Release,
}

/// Logical key identity.
///
/// Only the keys the core protocol reacts to are modeled; printable input
/// arrives separately as [`TextEvent`], while `Char` exists so letter
/// shortcuts (select-all, cut/copy/paste, undo) can be matched.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home.
    Home,
    /// End.
    End,
    /// Return / Enter.
    Enter,
    /// Backspace.
    Backspace,
    /// Forward delete.
    Delete,
    /// Tab.
    Tab,
    /// Escape.
    Escape,
    /// A character key, lowercased, used for shortcut matching.
    Char(char),
}

/// A keyboard event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical key.
    pub key: Key,
    /// Modifier state at event time.
    pub modifiers: Modifiers,
    /// Press, repeat, or release.
    pub action: KeyAction,
}

impl KeyEvent {
    /// A plain key press with no modifiers.
    #[must_use]
    pub const fn press(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
            action: KeyAction::Press,
        }
    }

    /// A key press with the given modifiers.
    #[must_use]
    pub const fn press_with(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            action: KeyAction::Press,
        }
    }
}

/// One decoded codepoint of text input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextEvent {
    /// The character entered.
    pub ch: char,
}

/// Pointer hover phase relative to an element's bounds.
///
/// Per continuous hover episode an element receives exactly one
/// `Entering`, any number of `Hovering`, and exactly one `Leaving`; the
/// composite dispatch machinery upholds this for every child it tracks.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CursorStatus {
    /// The pointer just entered the element's bounds.
    Entering,
    /// The pointer is moving within the element's bounds.
    Hovering,
    /// The pointer left the element's bounds (or the host surface).
    Leaving,
}

/// Process-wide pointer shape, set through the view.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum CursorShape {
    /// Standard arrow.
    #[default]
    Arrow,
    /// Text insertion beam.
    Ibeam,
    /// Crosshair.
    CrossHair,
    /// Pointing hand.
    Hand,
    /// Horizontal resize.
    HResize,
    /// Vertical resize.
    VResize,
}

/// Payload delivered by platform drag-and-drop adapters.
///
/// Keys are MIME-type-like strings (for example a URI-list key) mapping to
/// string payloads, plus the drop location in the root coordinate space.
#[derive(Clone, Debug, Default)]
pub struct DropInfo {
    /// MIME-keyed payloads.
    pub payload: HashMap<String, String>,
    /// Drop location.
    pub pos: Point,
}

impl DropInfo {
    /// Returns the payload for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.payload.get(key).map(String::as_str)
    }
}

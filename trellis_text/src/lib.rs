// Copyright 2025 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=trellis_text --heading-base-level=0

//! Trellis Text: the text-editing state machine.
//!
//! An editable text box built on the Trellis element protocol:
//!
//! - [`state`]: the UTF-8 buffer + selection model. Offsets are byte
//!   offsets on character boundaries; a selection keeps its ends in
//!   gesture order and is normalized at use. The state is shared behind
//!   `Rc<RefCell<_>>` with the undo thunks the editor pushes, which hold
//!   weak handles so restoring after the element is gone is a no-op.
//! - [`shaper`]: the measurement contract ([`shaper::TextShaper`]) the
//!   editor asks for hit offsets and caret geometry. Glyph layout and
//!   font policy belong to the rendering backend;
//!   [`shaper::MonoShaper`] is the fixed-advance reference.
//! - [`edit`]: [`edit::TextEdit`] itself — click/drag selection (with
//!   word and line multi-click), the editing key map, clipboard
//!   cut/copy/paste, undo capture with typing-burst coalescing, and the
//!   weak-handle caret blink.
//!
//! ## Undo model
//!
//! Every edit pushes a pair of zero-argument restore thunks through
//! [`trellis_element::context::View::add_undo`]. Contiguous typing
//! coalesces: the whole burst becomes one entry, closed by the next
//! discontinuous action (caret move, explicit undo/redo, blur, or a
//! structurally different edit), each of which then stands alone.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod edit;
pub mod shaper;
pub mod state;

pub use edit::{TextEdit, TextStyle};
pub use shaper::{MonoShaper, TextShaper};
pub use state::{EditState, Selection, Snapshot};

// SPDX-License-Identifier: MIT
//
// emacsy-keymap — keystroke plumbing for emacsy-plus.
//
// Everything between "a key was pressed" and "this named command should
// run" lives here: the normalized keystroke descriptor and its notation
// parser, layered keymaps with fallthrough and temporary suspension, the
// typed command registry, and the one-shot capture used by prefix keys
// such as `Ctrl-X` that need to read one more keystroke.
//
// This crate knows nothing about cells, cursors or search. Command
// functions are generic over whatever context the caller dispatches
// into, so the editor crate plugs its own facade in as `T`.

pub mod capture;
pub mod command;
pub mod error;
pub mod keymap;
pub mod keystroke;

pub use capture::{CaptureState, KeyCapture};
pub use command::{CommandFn, CommandName, CommandRegistry};
pub use error::{Error, Result};
pub use keymap::{KeyBindingTable, Layer, SuspendedBinding};
pub use keystroke::{KeyCode, KeyStroke, Modifiers};

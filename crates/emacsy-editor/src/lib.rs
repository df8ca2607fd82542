//! # emacsy-editor — Editor core for emacsy-plus
//!
//! Emacs-style editing on top of a notebook of code cells:
//!
//! - **[`position`]** — `Pos` (line, ch) and `Selection`, 0-indexed, plus
//!   rope/offset conversions
//! - **[`host`]** — the `Host` trait the editor drives (cells, cursors,
//!   selections, highlights)
//! - **[`notebook`]** — an in-memory `Host` used by the driver and tests
//! - **[`place`]** / **[`isearch`]** — incremental search across cell
//!   inputs and outputs, with backtracking on backspace
//! - **[`search_input`]** — minibuffer key handling for an open search
//! - **[`register`]** — kill buffer and named registers
//! - **[`options`]** — `set`-style session options
//! - **[`commands`]** / **[`emacs`]** — the command set and the `Emacsy`
//!   facade that routes keys to it

pub mod commands;
pub mod emacs;
pub mod error;
pub mod host;
pub mod isearch;
pub mod notebook;
pub mod options;
pub mod place;
pub mod position;
pub mod register;
pub mod search_input;
pub mod session;

pub use emacs::{Command, Dispatch, Emacsy, Pending, EMACS_LAYER};
pub use error::{Error, Result};
pub use host::{Area, AreaError, Host, MarkId};
pub use isearch::{ISearcher, SearchStatus};
pub use notebook::{Cell, CellOutput, Notebook};
pub use options::{Options, SetDirective};
pub use place::{Place, PlaceInit};
pub use position::{Pos, Selection};
pub use register::{Bookmark, KillRing, RegisterFile};
pub use search_input::{CloseReason, SearchInputController, SearchOutcome};
pub use session::Session;

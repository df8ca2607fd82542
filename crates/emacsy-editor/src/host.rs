//! The host interface.
//!
//! Everything the editor core needs from the notebook it runs inside:
//! enumerate cells, read an area's text, move the cursor and selection,
//! edit the input, paint highlight marks and scroll. [`Notebook`] is the
//! in-memory implementation; an embedding passes its own.
//!
//! Cells have two areas. The input is always present and editable; the
//! output may be absent (never executed) or of a kind the search can't
//! read (an image), which [`Host::text`] reports as an [`AreaError`].
//!
//! [`Notebook`]: crate::notebook::Notebook

use std::fmt;

use thiserror::Error;

use crate::position::{Pos, Selection};

/// One of the two text areas of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Area {
    /// The editable source.
    Input,
    /// Text produced by running the cell.
    Output,
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// Why an area couldn't be accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AreaError {
    /// The cell has no output.
    #[error("cell {cell} has no output")]
    NoOutput { cell: usize },

    /// The output exists but isn't plain text.
    #[error("cell {cell} output is not text")]
    UnsupportedOutput { cell: usize },

    /// Cell index past the end of the notebook.
    #[error("no cell {cell}")]
    NoSuchCell { cell: usize },
}

/// Handle to a highlight mark, returned by [`Host::mark_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkId(pub u64);

/// The notebook surface the editor core drives.
///
/// Cursor, selection and editing apply to a cell's input. Marks may be
/// placed in either area.
pub trait Host {
    /// Number of cells.
    fn cell_count(&self) -> usize;

    /// Index of the focused cell.
    fn focused(&self) -> usize;

    /// Focus `cell`. Out-of-range indices are ignored.
    fn focus(&mut self, cell: usize);

    /// Full text of an area.
    ///
    /// # Errors
    ///
    /// Returns an [`AreaError`] for missing cells and missing or non-text
    /// outputs.
    fn text(&self, cell: usize, area: Area) -> Result<String, AreaError>;

    /// Cursor (selection head) in `cell`'s input.
    fn cursor(&self, cell: usize) -> Pos;

    /// Move the cursor, collapsing the selection unless extending.
    fn set_cursor(&mut self, cell: usize, pos: Pos);

    /// Current selection in `cell`'s input.
    fn selection(&self, cell: usize) -> Selection;

    /// Replace `cell`'s selection.
    fn set_selection(&mut self, cell: usize, selection: Selection);

    /// True while cursor motion extends the selection (mark is set).
    fn is_extending(&self, cell: usize) -> bool;

    /// Turn selection extension on or off.
    fn set_extending(&mut self, cell: usize, on: bool);

    /// Replace the input text between `from` and `to` (either order) with
    /// `text`, leaving the cursor after the inserted text.
    fn replace_range(&mut self, cell: usize, from: Pos, to: Pos, text: &str);

    /// Highlight `from..to` in an area with the style `class`.
    fn mark_text(&mut self, cell: usize, area: Area, from: Pos, to: Pos, class: &str) -> MarkId;

    /// Remove a mark. Unknown ids are ignored.
    fn clear_mark(&mut self, mark: MarkId);

    /// Bring `cell` into view.
    fn scroll_into_view(&mut self, cell: usize);
}

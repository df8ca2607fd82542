//! Search place — where an incremental search currently stands.
//!
//! A [`Place`] names a cell, an area inside it, where the next scan of
//! that area starts, and the selection of the last match. The search
//! keeps a stack of places to backtrack through as the term shrinks, so
//! places are plain values: pushing one clones it, never aliases it.

use crate::error::{Error, Result};
use crate::host::{Area, Host};
use crate::position::Selection;

/// Snapshot of a search position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    /// Cell index.
    pub cell: usize,
    /// Area within the cell.
    pub area: Area,
    /// True once the scan has entered this area from a neighbour, so it
    /// starts at the area's edge instead of `search_start`.
    pub first_search_in_area: bool,
    /// True only for the place the search was opened at.
    pub is_search_start: bool,
    /// Char offset the next scan of this area starts from.
    pub search_start: Option<usize>,
    /// Selection of the last match (collapsed when there is none).
    pub selection: Selection,
}

impl Place {
    /// The place a search opened from: the focused cell's input, scanning
    /// from the cursor.
    ///
    /// `cursor_offset` is the cursor's char offset in that input.
    #[must_use]
    pub fn at_cursor<H: Host + ?Sized>(host: &H, cursor_offset: usize) -> Self {
        let cell = host.focused();
        let cursor = host.cursor(cell);
        Self {
            cell,
            area: Area::Input,
            first_search_in_area: false,
            is_search_start: true,
            search_start: Some(cursor_offset),
            selection: Selection::caret(cursor),
        }
    }

    /// Build a place from possibly incomplete parts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedPlace`] naming the first missing field.
    pub fn from_parts(init: PlaceInit) -> Result<Self> {
        let missing = |field: &'static str| Error::MalformedPlace { field };
        Ok(Self {
            cell: init.cell.ok_or_else(|| missing("cell"))?,
            area: init.area.ok_or_else(|| missing("area"))?,
            first_search_in_area: init
                .first_search_in_area
                .ok_or_else(|| missing("first_search_in_area"))?,
            is_search_start: init.is_search_start.unwrap_or(false),
            search_start: init.search_start,
            selection: init.selection.unwrap_or(Selection::NULL),
        })
    }

    /// Collapse the selection to (0, 0).
    pub fn null_selection(&mut self) {
        self.selection = Selection::NULL;
    }
}

/// Partial initializer for [`Place::from_parts`].
///
/// `cell`, `area` and `first_search_in_area` are required; the rest
/// default to "not the search start", no start offset and a null
/// selection.
#[derive(Debug, Clone, Default)]
pub struct PlaceInit {
    pub cell: Option<usize>,
    pub area: Option<Area>,
    pub first_search_in_area: Option<bool>,
    pub is_search_start: Option<bool>,
    pub search_start: Option<usize>,
    pub selection: Option<Selection>,
}

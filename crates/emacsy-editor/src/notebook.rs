//! In-memory notebook — the reference [`Host`].
//!
//! Each cell keeps its input in a [`ropey::Rope`] plus an optional output.
//! Cursor state is per cell (anchor, head, extending flag) so switching
//! focus and coming back finds the cursor where it was, as in a real
//! notebook. Highlight marks and scroll requests are recorded rather than
//! drawn; the driver and the tests read them back.

use ropey::Rope;
use tracing::trace;

use crate::host::{Area, AreaError, Host, MarkId};
use crate::position::{char_to_pos, pos_to_char, Pos, Selection};

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// What running a cell produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellOutput {
    /// Plain text (stdout, a repr).
    Text(String),
    /// Rich output the search can't read (an image, a widget).
    Rich,
}

/// One notebook cell.
#[derive(Debug, Clone)]
pub struct Cell {
    input: Rope,
    output: Option<CellOutput>,
    anchor: Pos,
    head: Pos,
    extending: bool,
}

impl Cell {
    /// A cell with `input` and no output, cursor at the start.
    #[must_use]
    pub fn new(input: &str) -> Self {
        Self {
            input: Rope::from_str(input),
            output: None,
            anchor: Pos::ZERO,
            head: Pos::ZERO,
            extending: false,
        }
    }

    /// Builder-style output setter.
    #[must_use]
    pub fn with_output(mut self, output: CellOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// The input text.
    #[must_use]
    pub const fn input(&self) -> &Rope {
        &self.input
    }

    /// The output, if the cell has one.
    #[must_use]
    pub const fn output(&self) -> Option<&CellOutput> {
        self.output.as_ref()
    }

    fn clamp(&self, pos: Pos) -> Pos {
        char_to_pos(&self.input, pos_to_char(&self.input, pos))
    }
}

// ---------------------------------------------------------------------------
// Marks
// ---------------------------------------------------------------------------

/// A highlight placed through [`Host::mark_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mark {
    pub id: MarkId,
    pub cell: usize,
    pub area: Area,
    pub from: Pos,
    pub to: Pos,
    pub class: String,
}

// ---------------------------------------------------------------------------
// Notebook
// ---------------------------------------------------------------------------

/// A list of cells with one focused.
#[derive(Debug, Clone, Default)]
pub struct Notebook {
    cells: Vec<Cell>,
    focused: usize,
    marks: Vec<Mark>,
    next_mark: u64,
    scrolls: Vec<usize>,
}

impl Notebook {
    /// An empty notebook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a notebook from cell inputs, with no outputs.
    #[must_use]
    pub fn from_inputs<'a>(inputs: impl IntoIterator<Item = &'a str>) -> Self {
        inputs.into_iter().map(Cell::new).collect()
    }

    /// Append a cell, returning its index.
    pub fn push(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    /// A cell by index.
    #[must_use]
    pub fn cell(&self, cell: usize) -> Option<&Cell> {
        self.cells.get(cell)
    }

    /// Highlights currently in place.
    #[must_use]
    pub fn marks(&self) -> &[Mark] {
        &self.marks
    }

    /// Every cell that was scrolled into view, in order.
    #[must_use]
    pub fn scrolls(&self) -> &[usize] {
        &self.scrolls
    }

    /// `cell`'s input with the selection drawn in: `|` at the cursor, and
    /// `[` at the anchor when a selection is active.
    #[must_use]
    pub fn render(&self, cell: usize) -> Option<String> {
        let c = self.cells.get(cell)?;
        let head = pos_to_char(&c.input, c.head);
        let anchor = pos_to_char(&c.input, c.anchor);

        let len = c.input.len_chars();
        let mut out = String::with_capacity(c.input.len_bytes() + 2);
        for i in 0..=len {
            if i == anchor && anchor != head {
                out.push('[');
            }
            if i == head {
                out.push('|');
            }
            if i < len {
                out.push(c.input.char(i));
            }
        }
        Some(out)
    }
}

impl FromIterator<Cell> for Notebook {
    fn from_iter<I: IntoIterator<Item = Cell>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl Host for Notebook {
    fn cell_count(&self) -> usize {
        self.cells.len()
    }

    fn focused(&self) -> usize {
        self.focused
    }

    fn focus(&mut self, cell: usize) {
        if cell < self.cells.len() {
            self.focused = cell;
        }
    }

    fn text(&self, cell: usize, area: Area) -> Result<String, AreaError> {
        let c = self.cells.get(cell).ok_or(AreaError::NoSuchCell { cell })?;
        match area {
            Area::Input => Ok(c.input.to_string()),
            Area::Output => match &c.output {
                Some(CellOutput::Text(text)) => Ok(text.clone()),
                Some(CellOutput::Rich) => Err(AreaError::UnsupportedOutput { cell }),
                None => Err(AreaError::NoOutput { cell }),
            },
        }
    }

    fn cursor(&self, cell: usize) -> Pos {
        self.cells.get(cell).map_or(Pos::ZERO, |c| c.head)
    }

    fn set_cursor(&mut self, cell: usize, pos: Pos) {
        if let Some(c) = self.cells.get_mut(cell) {
            let pos = c.clamp(pos);
            c.head = pos;
            if !c.extending {
                c.anchor = pos;
            }
        }
    }

    fn selection(&self, cell: usize) -> Selection {
        self.cells
            .get(cell)
            .map_or(Selection::NULL, |c| Selection::new(c.anchor, c.head))
    }

    fn set_selection(&mut self, cell: usize, selection: Selection) {
        if let Some(c) = self.cells.get_mut(cell) {
            c.anchor = c.clamp(selection.anchor);
            c.head = c.clamp(selection.head);
        }
    }

    fn is_extending(&self, cell: usize) -> bool {
        self.cells.get(cell).is_some_and(|c| c.extending)
    }

    fn set_extending(&mut self, cell: usize, on: bool) {
        if let Some(c) = self.cells.get_mut(cell) {
            c.extending = on;
        }
    }

    fn replace_range(&mut self, cell: usize, from: Pos, to: Pos, text: &str) {
        let Some(c) = self.cells.get_mut(cell) else {
            return;
        };
        let a = pos_to_char(&c.input, from);
        let b = pos_to_char(&c.input, to);
        let (start, end) = (a.min(b), a.max(b));

        c.input.remove(start..end);
        c.input.insert(start, text);

        let after = char_to_pos(&c.input, start + text.chars().count());
        c.anchor = after;
        c.head = after;
        trace!(cell, start, end, inserted = text.len(), "replaced range");
    }

    fn mark_text(&mut self, cell: usize, area: Area, from: Pos, to: Pos, class: &str) -> MarkId {
        let id = MarkId(self.next_mark);
        self.next_mark += 1;
        self.marks.push(Mark {
            id,
            cell,
            area,
            from,
            to,
            class: class.to_string(),
        });
        id
    }

    fn clear_mark(&mut self, mark: MarkId) {
        self.marks.retain(|m| m.id != mark);
    }

    fn scroll_into_view(&mut self, cell: usize) {
        self.scrolls.push(cell);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nb() -> Notebook {
        let mut nb = Notebook::from_inputs(["hello\nworld", "x = 1"]);
        nb.push(Cell::new("plot()").with_output(CellOutput::Rich));
        nb.push(Cell::new("print(2)").with_output(CellOutput::Text("2\n".into())));
        nb
    }

    #[test]
    fn text_per_area() {
        let nb = nb();
        assert_eq!(nb.text(0, Area::Input).unwrap(), "hello\nworld");
        assert_eq!(nb.text(3, Area::Output).unwrap(), "2\n");
        assert_eq!(nb.text(1, Area::Output), Err(AreaError::NoOutput { cell: 1 }));
        assert_eq!(
            nb.text(2, Area::Output),
            Err(AreaError::UnsupportedOutput { cell: 2 })
        );
        assert_eq!(nb.text(9, Area::Input), Err(AreaError::NoSuchCell { cell: 9 }));
    }

    #[test]
    fn cursor_clamps_and_collapses() {
        let mut nb = nb();
        nb.set_cursor(0, Pos::new(0, 99));
        assert_eq!(nb.cursor(0), Pos::new(0, 5));
        assert!(nb.selection(0).is_empty());
    }

    #[test]
    fn extending_keeps_anchor() {
        let mut nb = nb();
        nb.set_cursor(0, Pos::new(0, 1));
        nb.set_extending(0, true);
        nb.set_cursor(0, Pos::new(1, 2));
        assert_eq!(nb.selection(0), Selection::new(Pos::new(0, 1), Pos::new(1, 2)));
        assert_eq!(nb.render(0).unwrap(), "h[ello\nwo|rld");
    }

    #[test]
    fn replace_range_moves_cursor_after_insert() {
        let mut nb = nb();
        nb.replace_range(0, Pos::new(1, 0), Pos::new(0, 5), " ");
        assert_eq!(nb.text(0, Area::Input).unwrap(), "hello world");
        assert_eq!(nb.cursor(0), Pos::new(0, 6));
        assert_eq!(nb.render(0).unwrap(), "hello |world");
    }

    #[test]
    fn focus_ignores_out_of_range() {
        let mut nb = nb();
        nb.focus(3);
        nb.focus(10);
        assert_eq!(nb.focused(), 3);
    }

    #[test]
    fn marks_are_recorded_and_cleared() {
        let mut nb = nb();
        let a = nb.mark_text(0, Area::Input, Pos::new(0, 0), Pos::new(0, 2), "isearch");
        let b = nb.mark_text(3, Area::Output, Pos::new(0, 0), Pos::new(0, 1), "isearch");
        assert_ne!(a, b);
        nb.clear_mark(a);
        assert_eq!(nb.marks().len(), 1);
        assert_eq!(nb.marks()[0].cell, 3);
        nb.clear_mark(a);
        assert_eq!(nb.marks().len(), 1);
    }

    #[test]
    fn render_cursor_at_end() {
        let mut nb = nb();
        nb.set_cursor(1, Pos::new(0, 5));
        assert_eq!(nb.render(1).unwrap(), "x = 1|");
    }
}

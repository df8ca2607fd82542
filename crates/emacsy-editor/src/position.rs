//! Text positions, selections and offset conversion.
//!
//! All coordinates are **0-indexed**. `ch` counts Unicode scalar values
//! (chars) from the start of the line, not bytes, matching how `ropey`
//! indexes text. Search works on flat char offsets into an area's text;
//! the helpers at the bottom convert between the two, and between char and
//! byte offsets for handing text to `regex`.

use std::fmt;

use ropey::Rope;

// ---------------------------------------------------------------------------
// Pos
// ---------------------------------------------------------------------------

/// A position in a cell area: (line, char column), both 0-indexed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pos {
    pub line: usize,
    pub ch: usize,
}

impl Pos {
    /// Line 0, column 0.
    pub const ZERO: Self = Self { line: 0, ch: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, ch: usize) -> Self {
        Self { line, ch }
    }
}

impl Ord for Pos {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line.cmp(&other.line).then(self.ch.cmp(&other.ch))
    }
}

impl PartialOrd for Pos {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.ch)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.ch + 1)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// An anchored selection. `head` is where the cursor sits; `anchor` is the
/// fixed end. Either may come first in the text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct Selection {
    pub anchor: Pos,
    pub head: Pos,
}

impl Selection {
    /// The collapsed selection at (0, 0).
    pub const NULL: Self = Self {
        anchor: Pos::ZERO,
        head: Pos::ZERO,
    };

    #[inline]
    #[must_use]
    pub const fn new(anchor: Pos, head: Pos) -> Self {
        Self { anchor, head }
    }

    /// A collapsed selection (a bare cursor) at `pos`.
    #[inline]
    #[must_use]
    pub const fn caret(pos: Pos) -> Self {
        Self {
            anchor: pos,
            head: pos,
        }
    }

    /// True when anchor and head coincide.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// The earlier end.
    #[must_use]
    pub fn start(&self) -> Pos {
        self.anchor.min(self.head)
    }

    /// The later end.
    #[must_use]
    pub fn end(&self) -> Pos {
        self.anchor.max(self.head)
    }
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

/// Char offset of `pos` in `rope`, clamped to the text.
///
/// A line past the end clamps to the end of the text; a column past the
/// end of its line clamps to the line end (before its newline).
#[must_use]
pub fn pos_to_char(rope: &Rope, pos: Pos) -> usize {
    let lines = rope.len_lines();
    if pos.line >= lines {
        return rope.len_chars();
    }
    let start = rope.line_to_char(pos.line);
    start + pos.ch.min(line_len(rope, pos.line))
}

/// Position of char offset `idx` in `rope`, clamped to the text.
#[must_use]
pub fn char_to_pos(rope: &Rope, idx: usize) -> Pos {
    let idx = idx.min(rope.len_chars());
    let line = rope.char_to_line(idx);
    Pos::new(line, idx - rope.line_to_char(line))
}

/// Number of chars on `line`, not counting its line break.
#[must_use]
pub fn line_len(rope: &Rope, line: usize) -> usize {
    if line >= rope.len_lines() {
        return 0;
    }
    let slice = rope.line(line);
    let len = slice.len_chars();
    let trailing = slice
        .chars_at(len)
        .reversed()
        .take(2)
        .take_while(|&c| c == '\n' || c == '\r')
        .count();
    len - trailing
}

/// Byte offset of the `idx`th char of `text`; `text.len()` past the end.
#[must_use]
pub fn char_to_byte(text: &str, idx: usize) -> usize {
    text.char_indices().nth(idx).map_or(text.len(), |(b, _)| b)
}

/// Char index of byte offset `byte` in `text`. `byte` must be on a char
/// boundary (regex match bounds always are).
#[must_use]
pub fn byte_to_char(text: &str, byte: usize) -> usize {
    text[..byte.min(text.len())].chars().count()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_is_line_major() {
        assert!(Pos::new(0, 9) < Pos::new(1, 0));
        assert!(Pos::new(2, 1) < Pos::new(2, 3));
    }

    #[test]
    fn selection_bounds() {
        let sel = Selection::new(Pos::new(1, 4), Pos::new(0, 2));
        assert_eq!(sel.start(), Pos::new(0, 2));
        assert_eq!(sel.end(), Pos::new(1, 4));
        assert!(!sel.is_empty());
        assert!(Selection::caret(Pos::new(3, 3)).is_empty());
    }

    #[test]
    fn pos_char_round_trip() {
        let rope = Rope::from_str("ab\ncdé\n\nf");
        assert_eq!(pos_to_char(&rope, Pos::new(1, 2)), 5);
        assert_eq!(char_to_pos(&rope, 5), Pos::new(1, 2));
        assert_eq!(char_to_pos(&rope, 8), Pos::new(3, 0));
    }

    #[test]
    fn pos_to_char_clamps() {
        let rope = Rope::from_str("ab\ncd");
        assert_eq!(pos_to_char(&rope, Pos::new(0, 10)), 2);
        assert_eq!(pos_to_char(&rope, Pos::new(9, 0)), 5);
        assert_eq!(char_to_pos(&rope, 99), Pos::new(1, 2));
    }

    #[test]
    fn line_len_excludes_break() {
        let rope = Rope::from_str("abc\r\nde\n");
        assert_eq!(line_len(&rope, 0), 3);
        assert_eq!(line_len(&rope, 1), 2);
        assert_eq!(line_len(&rope, 2), 0);
        assert_eq!(line_len(&rope, 7), 0);
    }

    #[test]
    fn line_len_of_unterminated_last_line() {
        let rope = Rope::from_str("x\nçé");
        assert_eq!(line_len(&rope, 1), 2);
        assert_eq!(line_len(&Rope::from_str(""), 0), 0);
    }

    #[test]
    fn byte_char_conversion() {
        let text = "héllo";
        assert_eq!(char_to_byte(text, 2), 3);
        assert_eq!(byte_to_char(text, 3), 2);
        assert_eq!(char_to_byte(text, 5), text.len());
        assert_eq!(char_to_byte(text, 9), text.len());
    }
}

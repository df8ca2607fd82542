//! Register — storage for killed, copied and saved text.
//!
//! Emacs keeps three kinds of clipboard-like state, all session scoped:
//!
//! - **Kill buffer**: `Ctrl-K`, `Ctrl-W` and copy write here, `Ctrl-Y`
//!   reads it back. Consecutive `Ctrl-K`s append instead of replacing, so
//!   killing three lines in a row and yanking restores all three.
//! - **Text registers**: `Ctrl-X x <r>` saves the selection under the
//!   character `<r>`, `Ctrl-X g <r>` inserts it.
//! - **Position registers** (bookmarks): `Ctrl-X / <r>` saves the cursor
//!   cell and position, `Ctrl-X j <r>` jumps back.
//!
//! Any character names a register, and text and position registers are
//! separate namespaces.

use std::collections::BTreeMap;

use crate::position::Pos;

// ── Kill buffer ──────────────────────────────────────────────────────────

/// The kill buffer plus the "kills are chaining" flag.
#[derive(Debug, Clone, Default)]
pub struct KillRing {
    text: String,
    chaining: bool,
}

impl KillRing {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            text: String::new(),
            chaining: false,
        }
    }

    /// Record a kill. While chaining, the text is appended to the previous
    /// kill; otherwise it replaces it. Either way chaining starts.
    pub fn kill(&mut self, text: &str) {
        if self.chaining {
            self.text.push_str(text);
        } else {
            self.text = text.to_string();
        }
        self.chaining = true;
    }

    /// Replace the buffer without starting a chain (copy, kill region).
    pub fn store(&mut self, text: String) {
        self.text = text;
        self.chaining = false;
    }

    /// End the current chain. The next kill replaces the buffer.
    pub fn break_chain(&mut self) {
        self.chaining = false;
    }

    /// True while consecutive kills accumulate.
    #[must_use]
    pub const fn is_chaining(&self) -> bool {
        self.chaining
    }

    /// The text a yank inserts.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

// ── Bookmarks ────────────────────────────────────────────────────────────

/// A saved cursor location.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    pub cell: usize,
    pub pos: Pos,
}

// ── Register file ────────────────────────────────────────────────────────

/// Named text and position registers.
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    text: BTreeMap<char, String>,
    positions: BTreeMap<char, Bookmark>,
}

impl RegisterFile {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Save `text` under `name`, replacing what was there.
    pub fn save(&mut self, name: char, text: String) {
        self.text.insert(name, text);
    }

    /// Text saved under `name`.
    #[must_use]
    pub fn get(&self, name: char) -> Option<&str> {
        self.text.get(&name).map(String::as_str)
    }

    /// Save a cursor location under `name`.
    pub fn save_position(&mut self, name: char, mark: Bookmark) {
        self.positions.insert(name, mark);
    }

    /// Location saved under `name`.
    #[must_use]
    pub fn position(&self, name: char) -> Option<Bookmark> {
        self.positions.get(&name).copied()
    }

    /// Text registers in name order.
    pub fn iter_text(&self) -> impl Iterator<Item = (char, &str)> {
        self.text.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// Position registers in name order.
    pub fn iter_positions(&self) -> impl Iterator<Item = (char, Bookmark)> + '_ {
        self.positions.iter().map(|(k, v)| (*k, *v))
    }
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_kills_accumulate() {
        let mut ring = KillRing::new();
        ring.kill("one");
        ring.kill("\n");
        ring.kill("two");
        assert_eq!(ring.content(), "one\ntwo");
        assert!(ring.is_chaining());
    }

    #[test]
    fn broken_chain_replaces() {
        let mut ring = KillRing::new();
        ring.kill("one");
        ring.break_chain();
        ring.kill("two");
        assert_eq!(ring.content(), "two");
    }

    #[test]
    fn store_replaces_and_stops_chain() {
        let mut ring = KillRing::new();
        ring.kill("one");
        ring.store("copied".into());
        assert!(!ring.is_chaining());
        ring.kill("two");
        assert_eq!(ring.content(), "two");
    }

    #[test]
    fn empty_ring() {
        let ring = KillRing::default();
        assert!(ring.is_empty());
        assert_eq!(ring.content(), "");
    }

    #[test]
    fn text_registers_overwrite() {
        let mut regs = RegisterFile::new();
        regs.save('a', "first".into());
        regs.save('a', "second".into());
        regs.save('1', "digit".into());
        assert_eq!(regs.get('a'), Some("second"));
        assert_eq!(regs.get('b'), None);
        assert_eq!(
            regs.iter_text().collect::<Vec<_>>(),
            vec![('1', "digit"), ('a', "second")]
        );
    }

    #[test]
    fn text_and_position_namespaces_are_separate() {
        let mut regs = RegisterFile::new();
        regs.save('a', "text".into());
        assert_eq!(regs.position('a'), None);

        let mark = Bookmark {
            cell: 2,
            pos: Pos::new(1, 4),
        };
        regs.save_position('a', mark);
        assert_eq!(regs.position('a'), Some(mark));
        assert_eq!(regs.get('a'), Some("text"));
        assert_eq!(regs.iter_positions().count(), 1);
    }
}

// SPDX-License-Identifier: MIT
//
// Keystroke descriptor.
//
// Keyboard events reach us already normalized by the host into a key name
// plus modifier flags (the browser's `{key, ctrlKey, altKey, shiftKey,
// metaKey}`). This module turns that into a `KeyStroke` with structural
// equality, and parses / prints the CodeMirror-style notation used in
// keymap tables: `Ctrl-X`, `Alt-Shift-F`, `Cmd-W`, `Enter`, `Space`, `a`.
//
// # Normalization
//
// Two strokes that mean the same key must compare equal, otherwise a
// binding written as `Ctrl-X` would never match the event the host
// delivers for ctrl+x (`key: "x"`). The rules:
//
// - Character keys without Ctrl/Alt/Meta drop the Shift flag; the
//   character itself already carries the case (`A` vs `a`, `!` vs `1`).
// - Character keys with Ctrl/Alt/Meta are lower-cased and keep Shift, so
//   `Ctrl-X` == ctrl+x and `Shift-Ctrl-X` == ctrl+shift+x.
// - Bare modifier keys (a lone Ctrl press) carry no modifier flags.

use std::fmt;

use bitflags::bitflags;

use crate::error::{Error, Result};

// ─── Key identity ───────────────────────────────────────────────────────────

/// Identity of a key.
///
/// Printable characters (space included) use [`Char`](KeyCode::Char).
/// Modifier keys pressed on their own get dedicated variants because the
/// search input treats a lone Ctrl/Alt press as "chord pending".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A Unicode character.
    Char(char),
    // ── Named keys ──────────────────────────────────────────────
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    // ── Navigation ──────────────────────────────────────────────
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    // ── Function keys ───────────────────────────────────────────
    /// F1 through F24.
    F(u8),
    // ── Bare modifier presses ───────────────────────────────────
    Control,
    Alt,
    Shift,
    Meta,
}

impl KeyCode {
    /// True for the bare modifier keys (Ctrl, Alt, Shift, Meta on their own).
    #[inline]
    #[must_use]
    pub const fn is_modifier(self) -> bool {
        matches!(self, Self::Control | Self::Alt | Self::Shift | Self::Meta)
    }
}

bitflags! {
    /// Modifier flags held during a keystroke.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0000_0001;
        const ALT   = 0b0000_0010;
        const CTRL  = 0b0000_0100;
        /// Cmd on macOS, the Windows key elsewhere.
        const META  = 0b0000_1000;
    }
}

impl Modifiers {
    /// Modifiers that turn a character key into a command chord.
    const CHORD: Self = Self::CTRL.union(Self::ALT).union(Self::META);
}

// ─── KeyStroke ──────────────────────────────────────────────────────────────

/// A normalized keystroke: key identity plus modifiers.
///
/// Always construct through [`KeyStroke::new`] (or the helpers built on
/// it) so normalization is applied; the fields are private for that
/// reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyStroke {
    code: KeyCode,
    modifiers: Modifiers,
}

impl KeyStroke {
    /// Create a normalized keystroke.
    #[must_use]
    pub fn new(code: KeyCode, modifiers: Modifiers) -> Self {
        match code {
            KeyCode::Char(ch) if modifiers.intersects(Modifiers::CHORD) => Self {
                code: KeyCode::Char(to_lower(ch)),
                modifiers,
            },
            KeyCode::Char(ch) => Self {
                code: KeyCode::Char(ch),
                modifiers: modifiers - Modifiers::SHIFT,
            },
            code if code.is_modifier() => Self {
                code,
                modifiers: Modifiers::empty(),
            },
            code => Self { code, modifiers },
        }
    }

    /// A plain character with no modifiers.
    #[inline]
    #[must_use]
    pub fn char(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::empty())
    }

    /// Ctrl + character.
    #[inline]
    #[must_use]
    pub fn ctrl(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::CTRL)
    }

    /// Alt + character.
    #[inline]
    #[must_use]
    pub fn alt(ch: char) -> Self {
        Self::new(KeyCode::Char(ch), Modifiers::ALT)
    }

    /// A named key with no modifiers.
    #[inline]
    #[must_use]
    pub fn key(code: KeyCode) -> Self {
        Self::new(code, Modifiers::empty())
    }

    /// Build a keystroke from a host keyboard event.
    ///
    /// `key` is the event's key value: a single character (`"x"`, `"X"`,
    /// `" "`) or a named key (`"Enter"`, `"ArrowUp"`, `"Control"`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for key values that are neither a single
    /// character nor a known key name.
    pub fn from_event(key: &str, ctrl: bool, alt: bool, shift: bool, meta: bool) -> Result<Self> {
        let code = parse_key_name(key).ok_or_else(|| Error::InvalidKey(key.to_string()))?;
        let mut modifiers = Modifiers::empty();
        modifiers.set(Modifiers::CTRL, ctrl);
        modifiers.set(Modifiers::ALT, alt);
        modifiers.set(Modifiers::SHIFT, shift);
        modifiers.set(Modifiers::META, meta);
        Ok(Self::new(code, modifiers))
    }

    /// Parse a keymap notation such as `Ctrl-X`, `Shift-Alt-f`, `Cmd-W`,
    /// `Enter`, `Space` or `a`.
    ///
    /// Modifier prefixes may appear in any order. `Cmd-` and `Meta-` both
    /// mean [`Modifiers::META`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for an empty string, a dangling modifier
    /// prefix (`Ctrl-`), or an unknown key name.
    pub fn parse(notation: &str) -> Result<Self> {
        let mut modifiers = Modifiers::empty();
        let mut rest = notation;

        // A key name is never empty, so a prefix only counts when something
        // follows it. That keeps `Ctrl--` (ctrl + minus) parseable.
        loop {
            let stripped = [
                ("Ctrl-", Modifiers::CTRL),
                ("Alt-", Modifiers::ALT),
                ("Shift-", Modifiers::SHIFT),
                ("Cmd-", Modifiers::META),
                ("Meta-", Modifiers::META),
            ]
            .into_iter()
            .find_map(|(prefix, flag)| {
                rest.strip_prefix(prefix)
                    .filter(|after| !after.is_empty())
                    .map(|after| (after, flag))
            });

            match stripped {
                Some((after, flag)) => {
                    modifiers |= flag;
                    rest = after;
                }
                None => break,
            }
        }

        let code = parse_key_name(rest).ok_or_else(|| Error::InvalidKey(notation.to_string()))?;
        Ok(Self::new(code, modifiers))
    }

    /// Which key was pressed.
    #[inline]
    #[must_use]
    pub const fn code(&self) -> KeyCode {
        self.code
    }

    /// Modifiers held with the key.
    #[inline]
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// True when only a modifier key was pressed.
    #[inline]
    #[must_use]
    pub const fn is_modifier_only(&self) -> bool {
        self.code.is_modifier()
    }

    /// True when Ctrl, Alt or Meta is held.
    #[inline]
    #[must_use]
    pub const fn is_chord(&self) -> bool {
        self.modifiers.intersects(Modifiers::CHORD)
    }

    /// The character this stroke would type, if it types one.
    ///
    /// Chords (`Ctrl-a`) don't type anything and return `None`.
    #[must_use]
    pub const fn typed_char(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(ch) if !self.is_chord() => Some(ch),
            _ => None,
        }
    }
}

impl fmt::Display for KeyStroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // CodeMirror's canonical modifier order.
        if self.modifiers.contains(Modifiers::SHIFT) {
            f.write_str("Shift-")?;
        }
        if self.modifiers.contains(Modifiers::META) {
            f.write_str("Cmd-")?;
        }
        if self.modifiers.contains(Modifiers::CTRL) {
            f.write_str("Ctrl-")?;
        }
        if self.modifiers.contains(Modifiers::ALT) {
            f.write_str("Alt-")?;
        }

        match self.code {
            KeyCode::Char(' ') => f.write_str("Space"),
            KeyCode::Char(ch) if self.is_chord() => write!(f, "{}", ch.to_uppercase()),
            KeyCode::Char(ch) => write!(f, "{ch}"),
            KeyCode::F(n) => write!(f, "F{n}"),
            code => f.write_str(key_name(code)),
        }
    }
}

// ─── Key names ──────────────────────────────────────────────────────────────

/// Map a key name (notation or host event value) to a [`KeyCode`].
///
/// Single characters map to [`KeyCode::Char`]. Names are matched exactly;
/// both the notation spelling (`Up`, `Esc`) and the DOM spelling
/// (`ArrowUp`, `Escape`) are accepted.
fn parse_key_name(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(ch), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(ch));
    }

    let code = match name {
        "Space" | "Spacebar" => KeyCode::Char(' '),
        "Enter" | "Return" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "Backspace" => KeyCode::Backspace,
        "Esc" | "Escape" => KeyCode::Escape,
        "Delete" | "Del" => KeyCode::Delete,
        "Insert" => KeyCode::Insert,
        "Up" | "ArrowUp" => KeyCode::Up,
        "Down" | "ArrowDown" => KeyCode::Down,
        "Left" | "ArrowLeft" => KeyCode::Left,
        "Right" | "ArrowRight" => KeyCode::Right,
        "Home" => KeyCode::Home,
        "End" => KeyCode::End,
        "PageUp" => KeyCode::PageUp,
        "PageDown" => KeyCode::PageDown,
        "Control" | "Ctrl" => KeyCode::Control,
        "Alt" => KeyCode::Alt,
        "Shift" => KeyCode::Shift,
        "Meta" | "Cmd" => KeyCode::Meta,
        _ => {
            let n: u8 = name.strip_prefix('F')?.parse().ok()?;
            if (1..=24).contains(&n) {
                KeyCode::F(n)
            } else {
                return None;
            }
        }
    };
    Some(code)
}

/// Canonical notation name for a named key.
const fn key_name(code: KeyCode) -> &'static str {
    match code {
        KeyCode::Enter => "Enter",
        KeyCode::Tab => "Tab",
        KeyCode::Backspace => "Backspace",
        KeyCode::Escape => "Esc",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Up => "Up",
        KeyCode::Down => "Down",
        KeyCode::Left => "Left",
        KeyCode::Right => "Right",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Control => "Ctrl",
        KeyCode::Alt => "Alt",
        KeyCode::Shift => "Shift",
        KeyCode::Meta => "Cmd",
        // Handled by the caller.
        KeyCode::Char(_) | KeyCode::F(_) => "",
    }
}

/// Lower-case a character when it has a single-char lowercase form.
fn to_lower(ch: char) -> char {
    let mut lower = ch.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => ch,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── Normalization ───────────────────────────────────────────────────

    #[test]
    fn ctrl_notation_matches_event() {
        let parsed = KeyStroke::parse("Ctrl-X").unwrap();
        let event = KeyStroke::from_event("x", true, false, false, false).unwrap();
        assert_eq!(parsed, event);
        assert_eq!(parsed, KeyStroke::ctrl('x'));
    }

    #[test]
    fn shift_folds_into_plain_char() {
        let event = KeyStroke::from_event("A", false, false, true, false).unwrap();
        assert_eq!(event, KeyStroke::char('A'));
        assert_ne!(event, KeyStroke::char('a'));
        assert!(!event.modifiers().contains(Modifiers::SHIFT));
    }

    #[test]
    fn shift_kept_on_chords() {
        let event = KeyStroke::from_event("X", true, false, true, false).unwrap();
        assert_eq!(event, KeyStroke::parse("Shift-Ctrl-X").unwrap());
        assert_ne!(event, KeyStroke::ctrl('x'));
    }

    #[test]
    fn bare_modifier_drops_flags() {
        let event = KeyStroke::from_event("Control", true, false, false, false).unwrap();
        assert!(event.is_modifier_only());
        assert_eq!(event.modifiers(), Modifiers::empty());
    }

    #[test]
    fn typed_char_only_for_unchorded() {
        assert_eq!(KeyStroke::char('q').typed_char(), Some('q'));
        assert_eq!(KeyStroke::ctrl('q').typed_char(), None);
        assert_eq!(KeyStroke::key(KeyCode::Enter).typed_char(), None);
    }

    // ── Parsing ─────────────────────────────────────────────────────────

    #[test]
    fn parse_named_keys() {
        assert_eq!(KeyStroke::parse("Enter").unwrap().code(), KeyCode::Enter);
        assert_eq!(KeyStroke::parse("Esc").unwrap().code(), KeyCode::Escape);
        assert_eq!(KeyStroke::parse("Space").unwrap(), KeyStroke::char(' '));
        assert_eq!(KeyStroke::parse("F12").unwrap().code(), KeyCode::F(12));
    }

    #[test]
    fn parse_modifier_order_is_free() {
        assert_eq!(
            KeyStroke::parse("Alt-Ctrl-s").unwrap(),
            KeyStroke::parse("Ctrl-Alt-S").unwrap()
        );
    }

    #[test]
    fn parse_cmd_and_meta_agree() {
        assert_eq!(
            KeyStroke::parse("Cmd-W").unwrap(),
            KeyStroke::parse("Meta-w").unwrap()
        );
    }

    #[test]
    fn alt_helper_matches_notation() {
        assert_eq!(KeyStroke::parse("Alt-F").unwrap(), KeyStroke::alt('f'));
        assert_eq!(KeyStroke::alt('F'), KeyStroke::alt('f'));
        assert_eq!(KeyStroke::alt('w').to_string(), "Alt-W");
    }

    #[test]
    fn parse_ctrl_minus() {
        let key = KeyStroke::parse("Ctrl--").unwrap();
        assert_eq!(key.code(), KeyCode::Char('-'));
        assert!(key.modifiers().contains(Modifiers::CTRL));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(KeyStroke::parse(""), Err(Error::InvalidKey(String::new())));
        assert!(KeyStroke::parse("Ctrl-").is_err());
        assert!(KeyStroke::parse("Hyper-x").is_err());
        assert!(KeyStroke::parse("F99").is_err());
        assert!(KeyStroke::from_event("Unidentified", false, false, false, false).is_err());
    }

    // ── Display ─────────────────────────────────────────────────────────

    #[test]
    fn display_uses_notation() {
        assert_eq!(KeyStroke::ctrl('x').to_string(), "Ctrl-X");
        assert_eq!(KeyStroke::parse("Alt-Shift-f").unwrap().to_string(), "Shift-Alt-F");
        assert_eq!(KeyStroke::char(' ').to_string(), "Space");
        assert_eq!(KeyStroke::char('g').to_string(), "g");
        assert_eq!(KeyStroke::key(KeyCode::Escape).to_string(), "Esc");
    }

    #[test]
    fn display_parses_back() {
        for notation in ["Ctrl-X", "Cmd-W", "Shift-Tab", "Ctrl-Alt-S", "F5", "Space", "Z"] {
            let key = KeyStroke::parse(notation).unwrap();
            assert_eq!(KeyStroke::parse(&key.to_string()).unwrap(), key, "{notation}");
        }
    }
}

//! Search input — the minibuffer that drives an incremental search.
//!
//! While a search is open every keystroke comes here first. A small
//! allow-list decides what each key means; everything else is swallowed
//! so stray chords can't edit the cell behind the search.
//!
//! # Exits
//!
//! | Key     | Exit      | Cursor ends up                                  |
//! |---------|-----------|-------------------------------------------------|
//! | `Ctrl-G`| abort     | where it was before the search                  |
//! | Enter   | commit    | after the match (before it when searching back) |
//! | Escape  | exit      | match left selected                             |
//!
//! Every exit clears the highlight and remembers the term, so `Ctrl-S`
//! on an empty term later replays it.

use emacsy_keymap::{KeyCode, KeyStroke, Modifiers};
use tracing::{debug, trace};

use crate::host::{Area, Host};
use crate::isearch::{ISearcher, SearchStatus};
use crate::position::Selection;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a keystroke means to the search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    /// Extend the term.
    Char(char),
    /// Shorten the term.
    Backspace,
    /// Next match forward (`Ctrl-S`).
    RepeatForward,
    /// Next match backward (`Ctrl-R`).
    RepeatBackward,
    /// Cancel and go back (`Ctrl-G`).
    Abort,
    /// Accept and move to the match (Enter).
    Commit,
    /// Leave with the match selected (Escape).
    Exit,
    /// A bare Ctrl or Alt press; it applies to the next key.
    ModifierPending,
    /// Ignored.
    Suppressed,
}

/// Classify `key` against the search allow-list.
#[must_use]
pub fn classify(key: &KeyStroke) -> InputClass {
    let chord = key.modifiers() & (Modifiers::CTRL | Modifiers::ALT | Modifiers::META);
    match (key.code(), chord) {
        (KeyCode::Control | KeyCode::Alt, _) => InputClass::ModifierPending,
        (KeyCode::Char('s'), m) if m == Modifiers::CTRL => InputClass::RepeatForward,
        (KeyCode::Char('r'), m) if m == Modifiers::CTRL => InputClass::RepeatBackward,
        (KeyCode::Char('g'), m) if m == Modifiers::CTRL => InputClass::Abort,
        (KeyCode::Char(ch), m) if m.is_empty() && is_term_char(ch) => InputClass::Char(ch),
        (KeyCode::Backspace, m) if m.is_empty() => InputClass::Backspace,
        (KeyCode::Enter, m) if m.is_empty() => InputClass::Commit,
        (KeyCode::Escape, _) => InputClass::Exit,
        _ => InputClass::Suppressed,
    }
}

fn is_term_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch.is_ascii_punctuation() || ch == ' '
}

// ---------------------------------------------------------------------------
// Minibuffer
// ---------------------------------------------------------------------------

/// How the minibuffer is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Appearance {
    Normal,
    /// The term has no (further) match.
    Failing,
}

/// The single-line search prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniBuffer {
    prompt: &'static str,
    text: String,
    appearance: Appearance,
}

impl MiniBuffer {
    fn new(is_regex: bool, reverse: bool) -> Self {
        Self {
            prompt: prompt(is_regex, reverse),
            text: String::new(),
            appearance: Appearance::Normal,
        }
    }

    #[must_use]
    pub const fn prompt(&self) -> &'static str {
        self.prompt
    }

    /// The term as typed.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn appearance(&self) -> Appearance {
        self.appearance
    }
}

const fn prompt(is_regex: bool, reverse: bool) -> &'static str {
    match (is_regex, reverse) {
        (false, false) => "I-search: ",
        (false, true) => "I-search backward: ",
        (true, false) => "Regexp I-search: ",
        (true, true) => "Regexp I-search backward: ",
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Aborted,
    Committed,
    Exited,
}

/// Result of feeding one key to the search input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The search is still open.
    Continue,
    /// The search closed.
    Closed(CloseReason),
}

/// An open search: minibuffer, searcher and the cursor to go back to.
#[derive(Debug)]
pub struct SearchInputController {
    searcher: Option<ISearcher>,
    minibuffer: MiniBuffer,
    saved_cell: usize,
    saved_selection: Selection,
    modifier_pending: Option<Modifiers>,
}

impl SearchInputController {
    /// Open a search at the host's cursor, configured from the session
    /// options.
    pub fn open<H: Host + ?Sized>(host: &H, session: &Session, is_regex: bool, reverse: bool) -> Self {
        let cell = host.focused();
        let mut searcher = ISearcher::new(host, "", is_regex, reverse);
        searcher.set_wrap(session.options.wrapscan);
        if !session.options.casefold {
            searcher.set_case_sensitivity(true);
        }
        debug!(cell, is_regex, reverse, "search input opened");
        Self {
            searcher: Some(searcher),
            minibuffer: MiniBuffer::new(is_regex, reverse),
            saved_cell: cell,
            saved_selection: host.selection(cell),
            modifier_pending: None,
        }
    }

    /// True until the search has been closed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.searcher.is_some()
    }

    #[must_use]
    pub const fn minibuffer(&self) -> &MiniBuffer {
        &self.minibuffer
    }

    /// The underlying searcher while open.
    #[must_use]
    pub const fn searcher(&self) -> Option<&ISearcher> {
        self.searcher.as_ref()
    }

    /// Feed one keystroke.
    pub fn handle_key<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        session: &mut Session,
        key: &KeyStroke,
    ) -> SearchOutcome {
        if !self.is_open() {
            return SearchOutcome::Closed(CloseReason::Exited);
        }

        // A lone Ctrl/Alt press before this key counts as held.
        let key = match self.modifier_pending.take() {
            Some(held) if !key.is_modifier_only() => {
                KeyStroke::new(key.code(), key.modifiers() | held)
            }
            _ => *key,
        };
        let class = classify(&key);
        trace!(%key, ?class, "search input key");

        match class {
            InputClass::Char(ch) => {
                if let Some(s) = self.searcher.as_mut() {
                    s.add_char(host, ch);
                }
            }
            InputClass::Backspace => {
                if let Some(s) = self.searcher.as_mut() {
                    s.chop_char(host);
                }
            }
            InputClass::RepeatForward => self.repeat(host, session, false),
            InputClass::RepeatBackward => self.repeat(host, session, true),
            InputClass::Abort => return self.close(host, session, CloseReason::Aborted),
            InputClass::Commit => return self.close(host, session, CloseReason::Committed),
            InputClass::Exit => return self.close(host, session, CloseReason::Exited),
            InputClass::ModifierPending => {
                self.modifier_pending = Some(match key.code() {
                    KeyCode::Alt => Modifiers::ALT,
                    _ => Modifiers::CTRL,
                });
            }
            InputClass::Suppressed => {}
        }

        self.sync_minibuffer();
        SearchOutcome::Continue
    }

    /// Close the search. Closing an already closed search does nothing.
    pub fn close<H: Host + ?Sized>(
        &mut self,
        host: &mut H,
        session: &mut Session,
        reason: CloseReason,
    ) -> SearchOutcome {
        let Some(mut searcher) = self.searcher.take() else {
            return SearchOutcome::Closed(reason);
        };

        match reason {
            CloseReason::Aborted => self.restore_cursor(host),
            CloseReason::Committed => {
                // Regex terms typed since the last scan haven't been searched yet.
                if searcher.is_regex() && searcher.status() == SearchStatus::Pending {
                    searcher.next(host, false);
                }
                if searcher.status() == SearchStatus::Found {
                    let place = searcher.current_place().clone();
                    host.focus(place.cell);
                    if place.area == Area::Input {
                        let target = if searcher.is_reverse() {
                            place.selection.start()
                        } else {
                            place.selection.end()
                        };
                        host.set_cursor(place.cell, target);
                    }
                } else {
                    self.restore_cursor(host);
                }
            }
            CloseReason::Exited => {
                if searcher.status() == SearchStatus::Found {
                    let place = searcher.current_place().clone();
                    if place.area == Area::Input {
                        host.focus(place.cell);
                        host.set_selection(place.cell, place.selection);
                    }
                }
            }
        }

        searcher.clear_highlights(host);
        session.remember_search(searcher.term());
        self.minibuffer.text.clear();
        self.minibuffer.appearance = Appearance::Normal;
        debug!(?reason, term = searcher.term(), "search input closed");
        SearchOutcome::Closed(reason)
    }

    fn repeat<H: Host + ?Sized>(&mut self, host: &mut H, session: &Session, reverse: bool) {
        let Some(s) = self.searcher.as_mut() else {
            return;
        };
        if s.is_reverse() != reverse {
            s.set_reverse(reverse);
            self.minibuffer.prompt = prompt(s.is_regex(), reverse);
        }
        match (&session.last_search, s.term().is_empty()) {
            (Some(last), true) => {
                s.play_search(host, last, false);
            }
            _ => {
                s.search_again(host);
            }
        }
    }

    fn restore_cursor<H: Host + ?Sized>(&self, host: &mut H) {
        host.focus(self.saved_cell);
        host.set_selection(self.saved_cell, self.saved_selection);
    }

    fn sync_minibuffer(&mut self) {
        if let Some(s) = &self.searcher {
            self.minibuffer.text.clear();
            self.minibuffer.text.push_str(s.term());
            self.minibuffer.appearance = if s.status() == SearchStatus::Exhausted {
                Appearance::Failing
            } else {
                Appearance::Normal
            };
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notebook::Notebook;
    use crate::position::Pos;
    use pretty_assertions::assert_eq;

    fn setup(text: &str, cursor: usize) -> (Notebook, Session) {
        let mut nb = Notebook::from_inputs([text]);
        nb.set_cursor(0, Pos::new(0, cursor));
        (nb, Session::default())
    }

    fn type_str(c: &mut SearchInputController, nb: &mut Notebook, s: &mut Session, text: &str) {
        for ch in text.chars() {
            assert_eq!(c.handle_key(nb, s, &KeyStroke::char(ch)), SearchOutcome::Continue);
        }
    }

    fn key(notation: &str) -> KeyStroke {
        KeyStroke::parse(notation).unwrap()
    }

    // ── classify ────────────────────────────────────────────────────────

    #[test]
    fn classify_allow_list() {
        assert_eq!(classify(&KeyStroke::char('a')), InputClass::Char('a'));
        assert_eq!(classify(&KeyStroke::char('7')), InputClass::Char('7'));
        assert_eq!(classify(&KeyStroke::char('.')), InputClass::Char('.'));
        assert_eq!(classify(&KeyStroke::char(' ')), InputClass::Char(' '));
        assert_eq!(classify(&key("Backspace")), InputClass::Backspace);
        assert_eq!(classify(&key("Ctrl-S")), InputClass::RepeatForward);
        assert_eq!(classify(&key("Ctrl-R")), InputClass::RepeatBackward);
        assert_eq!(classify(&key("Ctrl-G")), InputClass::Abort);
        assert_eq!(classify(&key("Enter")), InputClass::Commit);
        assert_eq!(classify(&key("Esc")), InputClass::Exit);
        assert_eq!(classify(&key("Ctrl")), InputClass::ModifierPending);
        assert_eq!(classify(&key("Alt")), InputClass::ModifierPending);
    }

    #[test]
    fn classify_suppresses_the_rest() {
        for notation in ["Ctrl-K", "Alt-x", "Tab", "Up", "Delete", "F1", "Shift", "Cmd-S"] {
            assert_eq!(classify(&key(notation)), InputClass::Suppressed, "{notation}");
        }
    }

    // ── Editing the term ────────────────────────────────────────────────

    #[test]
    fn typing_updates_minibuffer_and_appearance() {
        let (mut nb, mut session) = setup("the cat", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        assert_eq!(c.minibuffer().prompt(), "I-search: ");

        type_str(&mut c, &mut nb, &mut session, "ca");
        assert_eq!(c.minibuffer().text(), "ca");
        assert_eq!(c.minibuffer().appearance(), Appearance::Normal);

        type_str(&mut c, &mut nb, &mut session, "x");
        assert_eq!(c.minibuffer().appearance(), Appearance::Failing);

        c.handle_key(&mut nb, &mut session, &key("Backspace"));
        assert_eq!(c.minibuffer().text(), "ca");
        assert_eq!(c.minibuffer().appearance(), Appearance::Normal);
    }

    #[test]
    fn suppressed_keys_do_not_touch_the_cell() {
        let (mut nb, mut session) = setup("abc", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        c.handle_key(&mut nb, &mut session, &key("Ctrl-K"));
        c.handle_key(&mut nb, &mut session, &key("Tab"));
        assert_eq!(nb.text(0, Area::Input).unwrap(), "abc");
        assert_eq!(c.minibuffer().text(), "");
    }

    #[test]
    fn ctrl_press_then_s_repeats() {
        let (mut nb, mut session) = setup("at at", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "at");
        c.handle_key(&mut nb, &mut session, &key("Ctrl"));
        c.handle_key(&mut nb, &mut session, &KeyStroke::char('s'));
        assert_eq!(c.minibuffer().text(), "at");
        let place = c.searcher().unwrap().current_place().clone();
        assert_eq!(place.selection.start(), Pos::new(0, 3));
    }

    #[test]
    fn ctrl_r_switches_direction_and_prompt() {
        let (mut nb, mut session) = setup("at at at", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "at");
        c.handle_key(&mut nb, &mut session, &key("Ctrl-S"));
        c.handle_key(&mut nb, &mut session, &key("Ctrl-S"));
        c.handle_key(&mut nb, &mut session, &key("Ctrl-R"));
        assert_eq!(c.minibuffer().prompt(), "I-search backward: ");
        let place = c.searcher().unwrap().current_place().clone();
        assert_eq!(place.selection.start(), Pos::new(0, 3));
    }

    // ── Exits ───────────────────────────────────────────────────────────

    #[test]
    fn abort_restores_cursor() {
        let (mut nb, mut session) = setup("the cat", 1);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "cat");
        let out = c.handle_key(&mut nb, &mut session, &key("Ctrl-G"));
        assert_eq!(out, SearchOutcome::Closed(CloseReason::Aborted));
        assert_eq!(nb.cursor(0), Pos::new(0, 1));
        assert!(nb.marks().is_empty());
        assert!(!c.is_open());
        assert_eq!(session.last_search.as_deref(), Some("cat"));
    }

    #[test]
    fn abort_twice_is_noop() {
        let (mut nb, mut session) = setup("the cat", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "cat");
        c.close(&mut nb, &mut session, CloseReason::Aborted);

        nb.set_cursor(0, Pos::new(0, 5));
        c.close(&mut nb, &mut session, CloseReason::Aborted);
        assert_eq!(nb.cursor(0), Pos::new(0, 5));
    }

    #[test]
    fn commit_moves_to_match_end() {
        let (mut nb, mut session) = setup("the cat sat", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "cat");
        let out = c.handle_key(&mut nb, &mut session, &key("Enter"));
        assert_eq!(out, SearchOutcome::Closed(CloseReason::Committed));
        assert_eq!(nb.cursor(0), Pos::new(0, 7));
        assert!(nb.selection(0).is_empty());
    }

    #[test]
    fn commit_reverse_moves_to_match_start() {
        let (mut nb, mut session) = setup("the cat sat", 11);
        let mut c = SearchInputController::open(&nb, &session, false, true);
        type_str(&mut c, &mut nb, &mut session, "cat");
        c.handle_key(&mut nb, &mut session, &key("Enter"));
        assert_eq!(nb.cursor(0), Pos::new(0, 4));
    }

    #[test]
    fn commit_without_match_restores() {
        let (mut nb, mut session) = setup("the cat", 2);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "dog");
        c.handle_key(&mut nb, &mut session, &key("Enter"));
        assert_eq!(nb.cursor(0), Pos::new(0, 2));
    }

    #[test]
    fn commit_regex_runs_final_search() {
        let (mut nb, mut session) = setup("x1 y22", 0);
        let mut c = SearchInputController::open(&nb, &session, true, false);
        assert_eq!(c.minibuffer().prompt(), "Regexp I-search: ");
        type_str(&mut c, &mut nb, &mut session, "y[0-9]+");
        c.handle_key(&mut nb, &mut session, &key("Enter"));
        assert_eq!(nb.cursor(0), Pos::new(0, 6));
    }

    #[test]
    fn commit_after_failed_regex_repeat_restores_cursor() {
        for is_regex in [false, true] {
            let (mut nb, mut session) = setup("x1 y22", 0);
            let mut c = SearchInputController::open(&nb, &session, is_regex, false);
            type_str(&mut c, &mut nb, &mut session, "y2");
            if is_regex {
                // First repeat runs the deferred scan.
                c.handle_key(&mut nb, &mut session, &key("Ctrl-S"));
            }
            c.handle_key(&mut nb, &mut session, &key("Ctrl-S"));
            assert_eq!(c.searcher().unwrap().status(), SearchStatus::Exhausted);

            c.handle_key(&mut nb, &mut session, &key("Enter"));
            assert_eq!(nb.cursor(0), Pos::ZERO, "is_regex = {is_regex}");
        }
    }

    #[test]
    fn escape_keeps_match_selected() {
        let (mut nb, mut session) = setup("the cat", 0);
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "cat");
        let out = c.handle_key(&mut nb, &mut session, &key("Esc"));
        assert_eq!(out, SearchOutcome::Closed(CloseReason::Exited));
        assert_eq!(
            nb.selection(0),
            Selection::new(Pos::new(0, 4), Pos::new(0, 7))
        );
        assert!(nb.marks().is_empty());
    }

    // ── Resuming ────────────────────────────────────────────────────────

    #[test]
    fn repeat_on_empty_term_replays_last_search() {
        let (mut nb, mut session) = setup("one two one", 0);
        session.remember_search("one");
        let mut c = SearchInputController::open(&nb, &session, false, false);
        c.handle_key(&mut nb, &mut session, &key("Ctrl-S"));
        assert_eq!(c.minibuffer().text(), "one");
        assert_eq!(c.searcher().unwrap().status(), SearchStatus::Found);
    }

    #[test]
    fn casefold_off_is_case_sensitive() {
        let (mut nb, mut session) = setup("Cat", 0);
        session.options.casefold = false;
        let mut c = SearchInputController::open(&nb, &session, false, false);
        type_str(&mut c, &mut nb, &mut session, "cat");
        assert_eq!(c.minibuffer().appearance(), Appearance::Failing);
    }
}

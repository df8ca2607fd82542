//! Incremental search across cells.
//!
//! [`ISearcher`] is the state machine behind `Ctrl-S` / `Ctrl-R`. It walks
//! the notebook cell by cell, and inside each cell through its input and
//! output areas, looking for the current term. Every change to the term
//! or every repeat pushes one [`Frame`] recording where the search stood,
//! so deleting characters walks back through exactly the matches the user
//! saw while typing.
//!
//! # Frame stack
//!
//! `frames[0]` is the place the search opened at and is never popped. Each
//! later frame is tagged with the term length (in chars) it was produced
//! for. Chopping a character pops every frame tagged with a longer term;
//! if a frame for the new length survives it is shown again, otherwise the
//! shorter term is searched for afresh.
//!
//! # Scan order
//!
//! Forward visits cells in increasing order and, inside a cell, the input
//! before the output. Reverse visits cells in decreasing order, output
//! before input. Only the area the search currently sits in resumes from
//! the stored offset; every other area is scanned from its near edge.
//! Missing or non-text outputs are skipped.
//!
//! # Matching
//!
//! Literal terms are escaped and compiled with `regex`, so both modes share
//! one matcher. Terms are case-insensitive until an upper-case letter is
//! typed, after which the search stays case-sensitive.

use regex::{Regex, RegexBuilder};
use ropey::Rope;
use tracing::{debug, trace};

use crate::host::{Area, Host, MarkId};
use crate::place::Place;
use crate::position::{byte_to_char, char_to_byte, char_to_pos, pos_to_char, Selection};

/// Style class for the current-match highlight.
pub const MATCH_CLASS: &str = "emacsy-isearch";

const FORWARD_AREAS: [Area; 2] = [Area::Input, Area::Output];
const REVERSE_AREAS: [Area; 2] = [Area::Output, Area::Input];

// ---------------------------------------------------------------------------
// Frames and status
// ---------------------------------------------------------------------------

/// Outcome recorded in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// Term changed but no scan has run yet (regex mode).
    Pending,
    /// The scan found a match at the frame's place.
    Found,
    /// The scan ran off the end of the notebook.
    Failed,
}

/// One entry of the backtracking stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub place: Place,
    pub term_len: usize,
    pub status: FrameStatus,
}

/// Coarse state for the minibuffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    /// Empty term.
    Idle,
    /// A term is set but hasn't been searched for.
    Pending,
    /// The current term matched.
    Found,
    /// The current term has no further match.
    Exhausted,
}

/// Result of [`ISearcher::play_search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    /// Leading part of the replayed term that matched.
    pub matched: String,
    /// Where the last successful match is.
    pub place: Option<Place>,
    /// True when the whole term matched.
    pub complete: bool,
}

// ---------------------------------------------------------------------------
// ISearcher
// ---------------------------------------------------------------------------

/// Incremental / regex search state.
#[derive(Debug)]
pub struct ISearcher {
    term: String,
    regex: Option<Regex>,
    is_regex: bool,
    reverse: bool,
    case_sensitive: bool,
    wrap: bool,
    frames: Vec<Frame>,
    highlights: Vec<MarkId>,
}

impl ISearcher {
    /// Open a search at the host's focused cell and cursor.
    ///
    /// `initial_term` seeds the term without searching for it; the first
    /// [`search_again`](Self::search_again) runs the scan.
    pub fn new<H: Host + ?Sized>(host: &H, initial_term: &str, is_regex: bool, reverse: bool) -> Self {
        let cell = host.focused();
        let offset = host
            .text(cell, Area::Input)
            .map(|text| pos_to_char(&Rope::from_str(&text), host.cursor(cell)))
            .unwrap_or(0);
        let initial = Place::at_cursor(host, offset);

        let mut searcher = Self {
            term: initial_term.to_string(),
            regex: None,
            is_regex,
            reverse,
            case_sensitive: initial_term.chars().any(char::is_uppercase),
            wrap: true,
            frames: vec![Frame {
                place: initial,
                term_len: 0,
                status: FrameStatus::Pending,
            }],
            highlights: Vec::new(),
        };
        searcher.refresh_pattern();
        debug!(cell, offset, is_regex, reverse, "isearch opened");
        searcher
    }

    // ── Accessors ───────────────────────────────────────────────────────

    /// The current term.
    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub const fn is_regex(&self) -> bool {
        self.is_regex
    }

    #[must_use]
    pub const fn is_reverse(&self) -> bool {
        self.reverse
    }

    #[must_use]
    pub const fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    /// Where the search stands now (the top frame's place).
    #[must_use]
    pub fn current_place(&self) -> &Place {
        &self.top().place
    }

    /// Where the search was opened.
    #[must_use]
    pub fn initial_place(&self) -> &Place {
        &self.frames[0].place
    }

    /// Depth of the backtracking stack, initial frame included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Coarse status for display.
    #[must_use]
    pub fn status(&self) -> SearchStatus {
        if self.term.is_empty() {
            return SearchStatus::Idle;
        }
        match self.top().status {
            FrameStatus::Pending => SearchStatus::Pending,
            FrameStatus::Found => SearchStatus::Found,
            FrameStatus::Failed => SearchStatus::Exhausted,
        }
    }

    // ── Settings ────────────────────────────────────────────────────────

    /// Switch direction for subsequent scans.
    pub fn set_reverse(&mut self, reverse: bool) {
        self.reverse = reverse;
    }

    /// Force case sensitivity on or off. Typing an upper-case letter later
    /// still turns it on.
    pub fn set_case_sensitivity(&mut self, on: bool) {
        if self.case_sensitive != on {
            self.case_sensitive = on;
            self.refresh_pattern();
        }
    }

    /// Allow a repeat after a failed scan to restart from the far end.
    pub fn set_wrap(&mut self, on: bool) {
        self.wrap = on;
    }

    // ── Term editing ────────────────────────────────────────────────────

    /// Append `ch` to the term.
    ///
    /// Literal mode scans at once, starting from the current match so the
    /// match grows in place. Regex mode only records the change; the scan
    /// waits for [`search_again`](Self::search_again), since a partial
    /// pattern is often invalid.
    pub fn add_char<H: Host + ?Sized>(&mut self, host: &mut H, ch: char) -> Option<Place> {
        self.term.push(ch);
        if ch.is_uppercase() {
            self.case_sensitive = true;
        }
        self.refresh_pattern();

        if self.is_regex {
            let place = self.top().place.clone();
            self.push(place, FrameStatus::Pending);
            return None;
        }
        self.next(host, false)
    }

    /// Remove the last character of the term and step back to what the
    /// shorter term showed.
    pub fn chop_char<H: Host + ?Sized>(&mut self, host: &mut H) -> Option<Place> {
        self.term.pop()?;
        self.refresh_pattern();
        let len = self.term_len();

        while self.frames.len() > 1 && self.top().term_len > len {
            self.frames.pop();
        }

        if len == 0 {
            self.clear_highlights(host);
            trace!("isearch term emptied");
            return None;
        }

        if self.top().term_len == len {
            let frame = self.top().clone();
            self.clear_highlights(host);
            if frame.status != FrameStatus::Found {
                return None;
            }
            if !frame.place.selection.is_empty() {
                self.highlight(host, &frame.place);
            }
            return Some(frame.place);
        }

        self.next(host, false)
    }

    // ── Scanning ────────────────────────────────────────────────────────

    /// Scan for the term from the current place.
    ///
    /// With `repeat`, a match sitting exactly at the resume offset is the
    /// one already shown and is stepped over. Pushes one frame either way.
    pub fn next<H: Host + ?Sized>(&mut self, host: &mut H, repeat: bool) -> Option<Place> {
        let from = self.top().place.clone();
        self.scan(host, &from, repeat)
    }

    /// `Ctrl-S` / `Ctrl-R` inside an open search.
    ///
    /// Runs the deferred first scan for a pending term; after a failure
    /// with wrapping on, restarts from the first cell (reverse: the last);
    /// otherwise looks for the next match.
    pub fn search_again<H: Host + ?Sized>(&mut self, host: &mut H) -> Option<Place> {
        if self.term.is_empty() {
            return None;
        }
        match self.top().status {
            FrameStatus::Pending => self.next(host, false),
            FrameStatus::Failed if self.wrap && host.cell_count() > 0 => {
                let cell = if self.reverse { host.cell_count() - 1 } else { 0 };
                let mut from = self.top().place.clone();
                from.cell = cell;
                from.area = if self.reverse { REVERSE_AREAS[0] } else { FORWARD_AREAS[0] };
                from.first_search_in_area = true;
                from.is_search_start = false;
                from.search_start = None;
                from.null_selection();
                debug!(cell, "isearch wrapping");
                self.scan(host, &from, false)
            }
            _ => self.next(host, true),
        }
    }

    /// Replay `term` as if typed, stopping after the first character that
    /// fails. With `from_empty` the current term is discarded first.
    ///
    /// Regex mode sets the whole term and scans once.
    pub fn play_search<H: Host + ?Sized>(&mut self, host: &mut H, term: &str, from_empty: bool) -> Replay {
        if from_empty {
            self.reset(host);
        }

        if self.is_regex {
            self.term.push_str(term);
            if term.chars().any(char::is_uppercase) {
                self.case_sensitive = true;
            }
            self.refresh_pattern();
            let place = self.next(host, false);
            let complete = place.is_some();
            return Replay {
                matched: if complete { self.term.clone() } else { String::new() },
                place,
                complete,
            };
        }

        let mut matched = String::new();
        let mut last = None;
        for ch in term.chars() {
            match self.add_char(host, ch) {
                Some(place) => {
                    matched.push(ch);
                    last = Some(place);
                }
                None => {
                    return Replay {
                        matched,
                        place: last,
                        complete: false,
                    };
                }
            }
        }
        Replay {
            matched,
            place: last,
            complete: true,
        }
    }

    /// Remove the match highlight. Safe to call repeatedly.
    pub fn clear_highlights<H: Host + ?Sized>(&mut self, host: &mut H) {
        for mark in self.highlights.drain(..) {
            host.clear_mark(mark);
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn top(&self) -> &Frame {
        // frames[0] is never popped.
        &self.frames[self.frames.len() - 1]
    }

    fn term_len(&self) -> usize {
        self.term.chars().count()
    }

    fn push(&mut self, place: Place, status: FrameStatus) {
        let term_len = self.term_len();
        self.frames.push(Frame {
            place,
            term_len,
            status,
        });
    }

    /// Drop the term and every frame above the initial one.
    fn reset<H: Host + ?Sized>(&mut self, host: &mut H) {
        self.term.clear();
        self.refresh_pattern();
        self.frames.truncate(1);
        self.clear_highlights(host);
    }

    fn refresh_pattern(&mut self) {
        if self.term.is_empty() {
            self.regex = None;
            return;
        }
        let pattern = if self.is_regex {
            self.term.clone()
        } else {
            regex::escape(&self.term)
        };
        self.regex = match RegexBuilder::new(&pattern)
            .case_insensitive(!self.case_sensitive)
            .build()
        {
            Ok(re) => Some(re),
            Err(e) => {
                debug!(pattern = %pattern, error = %e, "invalid search pattern");
                None
            }
        };
    }

    fn scan<H: Host + ?Sized>(&mut self, host: &mut H, from: &Place, repeat: bool) -> Option<Place> {
        if self.term.is_empty() {
            return None;
        }
        let Some(re) = self.regex.clone() else {
            self.push(from.clone(), FrameStatus::Failed);
            return None;
        };

        let order = if self.reverse { REVERSE_AREAS } else { FORWARD_AREAS };
        let first_area = order.iter().position(|a| *a == from.area).unwrap_or(0);
        let cells = host.cell_count();
        let mut cell = from.cell;
        let mut first_cell = true;

        while cell < cells {
            let areas = if first_cell { &order[first_area..] } else { &order[..] };
            for (i, &area) in areas.iter().enumerate() {
                let resume_at = if first_cell && i == 0 && !from.first_search_in_area {
                    from.search_start
                } else {
                    None
                };

                let text = match host.text(cell, area) {
                    Ok(text) => text,
                    Err(e) => {
                        trace!(cell, %area, error = %e, "skipping area");
                        continue;
                    }
                };
                trace!(cell, %area, start = ?resume_at, "scanning area");

                let found = if self.reverse {
                    find_reverse(&re, &text, resume_at, repeat)
                } else {
                    find_forward(&re, &text, resume_at, repeat)
                };

                if let Some((start, end)) = found {
                    let rope = Rope::from_str(&text);
                    let place = Place {
                        cell,
                        area,
                        first_search_in_area: false,
                        is_search_start: false,
                        search_start: Some(start),
                        selection: Selection::new(char_to_pos(&rope, start), char_to_pos(&rope, end)),
                    };
                    debug!(cell, %area, start, end, term = %self.term, "isearch match");
                    self.clear_highlights(host);
                    self.highlight(host, &place);
                    host.scroll_into_view(cell);
                    self.push(place.clone(), FrameStatus::Found);
                    return Some(place);
                }
            }

            first_cell = false;
            if self.reverse {
                let Some(prev) = cell.checked_sub(1) else { break };
                cell = prev;
            } else {
                cell += 1;
            }
        }

        debug!(term = %self.term, reverse = self.reverse, "isearch failed");
        self.push(from.clone(), FrameStatus::Failed);
        None
    }

    fn highlight<H: Host + ?Sized>(&mut self, host: &mut H, place: &Place) {
        let sel = place.selection;
        let mark = host.mark_text(place.cell, place.area, sel.start(), sel.end(), MATCH_CLASS);
        self.highlights.push(mark);
    }
}

// ---------------------------------------------------------------------------
// Area scans
// ---------------------------------------------------------------------------

/// First match starting at or after `start` (default: the beginning), as
/// char offsets.
fn find_forward(re: &Regex, text: &str, start: Option<usize>, repeat: bool) -> Option<(usize, usize)> {
    let len = text.chars().count();
    let mut from = start.unwrap_or(0);

    if repeat && start.is_some() {
        if let Some(m) = re.find_at(text, char_to_byte(text, from)) {
            if byte_to_char(text, m.start()) == from {
                from = byte_to_char(text, m.end()).max(from + 1);
            }
        }
    }
    if from > len {
        return None;
    }

    let m = re.find_at(text, char_to_byte(text, from))?;
    Some((byte_to_char(text, m.start()), byte_to_char(text, m.end())))
}

/// Last match starting at or before `start` (default: the final char), as
/// char offsets.
///
/// Restarts the matcher at every char boundary up to the limit, so a text
/// with many candidate starts costs quadratic time.
fn find_reverse(re: &Regex, text: &str, start: Option<usize>, repeat: bool) -> Option<(usize, usize)> {
    let len = text.chars().count();
    let mut limit = start.map_or(len.saturating_sub(1), |s| s.min(len));

    if repeat && start.is_some() {
        let at = char_to_byte(text, limit);
        if re.find_at(text, at).is_some_and(|m| m.start() == at) {
            limit = limit.checked_sub(1)?;
        }
    }

    let limit_byte = char_to_byte(text, limit);
    let mut best = None;
    let mut from = 0;
    while let Some(m) = re.find_at(text, from) {
        if m.start() > limit_byte {
            break;
        }
        best = Some((m.start(), m.end()));
        // Next candidate start is the char after this match's start.
        match text[m.start()..].chars().next() {
            Some(ch) => from = m.start() + ch.len_utf8(),
            None => break,
        }
    }

    best.map(|(s, e)| (byte_to_char(text, s), byte_to_char(text, e)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::AreaError;
    use crate::notebook::{Cell, CellOutput, Notebook};
    use crate::position::Pos;
    use pretty_assertions::assert_eq;

    fn one_cell(text: &str, cursor: usize) -> Notebook {
        let mut nb = Notebook::from_inputs([text]);
        nb.set_cursor(0, Pos::new(0, cursor));
        nb
    }

    fn span(place: &Place) -> (usize, usize, usize) {
        (place.cell, place.selection.start().ch, place.selection.end().ch)
    }

    // ── Backtracking ────────────────────────────────────────────────────

    #[test]
    fn typing_and_chopping_walks_back() {
        let mut nb = one_cell("the cat sat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);

        let c = s.add_char(&mut nb, 'c').unwrap();
        assert_eq!(span(&c), (0, 4, 5));
        let ca = s.add_char(&mut nb, 'a').unwrap();
        assert_eq!(span(&ca), (0, 4, 6));

        let back = s.chop_char(&mut nb).unwrap();
        assert_eq!(back, c);

        assert_eq!(s.chop_char(&mut nb), None);
        assert_eq!(s.current_place(), s.initial_place());
        assert_eq!(s.depth(), 1);
        assert!(nb.marks().is_empty());
        assert_eq!(s.status(), SearchStatus::Idle);
    }

    #[test]
    fn chop_after_repeats_discards_all_longer_frames() {
        let mut nb = one_cell("at at at", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.add_char(&mut nb, 'a');
        let at = s.add_char(&mut nb, 't').unwrap();
        s.search_again(&mut nb).unwrap();
        s.search_again(&mut nb).unwrap();

        let a = s.chop_char(&mut nb).unwrap();
        assert_eq!(span(&a), (0, 0, 1));
        assert_eq!(at.search_start, Some(0));
        assert_eq!(s.depth(), 2);
    }

    #[test]
    fn chop_on_empty_term_is_noop() {
        let mut nb = one_cell("abc", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        assert_eq!(s.chop_char(&mut nb), None);
        assert_eq!(s.depth(), 1);
    }

    #[test]
    fn highlight_follows_match() {
        let mut nb = one_cell("the cat sat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.add_char(&mut nb, 'c');
        s.add_char(&mut nb, 'a');
        assert_eq!(nb.marks().len(), 1);
        assert_eq!(nb.marks()[0].from, Pos::new(0, 4));
        assert_eq!(nb.marks()[0].to, Pos::new(0, 6));
        assert_eq!(nb.marks()[0].class, MATCH_CLASS);
    }

    // ── Direction ───────────────────────────────────────────────────────

    #[test]
    fn forward_repeats_advance() {
        let mut nb = one_cell("cat sat mat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.add_char(&mut nb, 'a');
        let first = s.add_char(&mut nb, 't').unwrap();
        let second = s.search_again(&mut nb).unwrap();
        let third = s.search_again(&mut nb).unwrap();
        assert_eq!(
            [first, second, third].map(|p| p.selection.start().ch),
            [1, 5, 9]
        );
        assert_eq!(s.search_again(&mut nb), None);
        assert_eq!(s.status(), SearchStatus::Exhausted);
    }

    #[test]
    fn reverse_repeats_retreat() {
        let mut nb = one_cell("cat sat mat", 11);
        let mut s = ISearcher::new(&nb, "", false, true);
        s.add_char(&mut nb, 'a');
        let first = s.add_char(&mut nb, 't').unwrap();
        let second = s.search_again(&mut nb).unwrap();
        let third = s.search_again(&mut nb).unwrap();
        assert_eq!(
            [first, second, third].map(|p| p.selection.start().ch),
            [9, 5, 1]
        );
        assert_eq!(s.search_again(&mut nb), None);
    }

    #[test]
    fn switching_direction_steps_off_current_match() {
        let mut nb = one_cell("cat sat mat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.play_search(&mut nb, "at", false);
        s.search_again(&mut nb);
        s.search_again(&mut nb);
        s.set_reverse(true);
        let back = s.search_again(&mut nb).unwrap();
        assert_eq!(back.selection.start().ch, 5);
    }

    #[test]
    fn wrap_after_failure_restarts_at_first_cell() {
        let mut nb = one_cell("cat sat mat", 4);
        let mut s = ISearcher::new(&nb, "", false, false);
        let first = s.play_search(&mut nb, "at", false).place.unwrap();
        assert_eq!(span(&first), (0, 5, 7));
        s.search_again(&mut nb).unwrap();
        assert_eq!(s.search_again(&mut nb), None);
        assert_eq!(s.status(), SearchStatus::Exhausted);

        let wrapped = s.search_again(&mut nb).unwrap();
        assert_eq!(span(&wrapped), (0, 1, 3));
    }

    #[test]
    fn no_wrap_stays_failed() {
        let mut nb = one_cell("cat sat mat", 4);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.set_wrap(false);
        s.play_search(&mut nb, "cat", false);
        assert_eq!(s.search_again(&mut nb), None);
        assert_eq!(s.status(), SearchStatus::Exhausted);
    }

    // ── Case sensitivity ────────────────────────────────────────────────

    #[test]
    fn lowercase_term_ignores_case() {
        let mut nb = one_cell("Cat only", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        let r = s.play_search(&mut nb, "cat", false);
        assert!(r.complete);
        assert!(!s.is_case_sensitive());
    }

    #[test]
    fn uppercase_sticks_after_chop() {
        let mut nb = one_cell("Cat only", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        assert!(s.play_search(&mut nb, "Cat", false).complete);
        assert!(s.is_case_sensitive());

        for _ in 0..3 {
            s.chop_char(&mut nb);
        }
        assert_eq!(s.term(), "");
        assert_eq!(s.add_char(&mut nb, 'c'), None);
        assert_eq!(s.add_char(&mut nb, 'a'), None);
        assert_eq!(s.add_char(&mut nb, 't'), None);
    }

    #[test]
    fn seeded_uppercase_term_is_case_sensitive() {
        let nb = one_cell("x", 0);
        let s = ISearcher::new(&nb, "Foo", false, false);
        assert!(s.is_case_sensitive());
        assert_eq!(s.status(), SearchStatus::Pending);
    }

    // ── Cells and areas ─────────────────────────────────────────────────

    #[test]
    fn forward_continues_into_next_cell() {
        let mut nb = Notebook::from_inputs(["nothing here", "the target"]);
        let mut s = ISearcher::new(&nb, "", false, false);
        let r = s.play_search(&mut nb, "target", false);
        assert!(r.complete);
        let place = r.place.unwrap();
        assert_eq!(span(&place), (1, 4, 10));
        assert_eq!(place.area, Area::Input);
        assert_eq!(nb.scrolls().last(), Some(&1));
    }

    #[test]
    fn reverse_continues_into_previous_cell() {
        let mut nb = Notebook::from_inputs(["no way", "yes"]);
        nb.focus(1);
        nb.set_cursor(1, Pos::new(0, 3));
        let mut s = ISearcher::new(&nb, "", false, true);
        let place = s.play_search(&mut nb, "no", false).place.unwrap();
        assert_eq!(span(&place), (0, 0, 2));
    }

    #[test]
    fn output_area_is_searched_after_input() {
        let mut nb = Notebook::new();
        nb.push(Cell::new("print(x)").with_output(CellOutput::Text("42\n".into())));
        nb.push(Cell::new("y = 42"));
        let mut s = ISearcher::new(&nb, "", false, false);

        let first = s.play_search(&mut nb, "42", false).place.unwrap();
        assert_eq!((first.cell, first.area), (0, Area::Output));
        let second = s.search_again(&mut nb).unwrap();
        assert_eq!((second.cell, second.area), (1, Area::Input));
        assert_eq!(span(&second), (1, 4, 6));
    }

    #[test]
    fn reverse_visits_output_before_input() {
        let mut nb = Notebook::new();
        nb.push(Cell::new("42").with_output(CellOutput::Text("42".into())));
        nb.push(Cell::new(""));
        nb.focus(1);
        let mut s = ISearcher::new(&nb, "", false, true);
        let first = s.play_search(&mut nb, "42", false).place.unwrap();
        assert_eq!((first.cell, first.area), (0, Area::Output));
        let second = s.search_again(&mut nb).unwrap();
        assert_eq!((second.cell, second.area), (0, Area::Input));
    }

    #[test]
    fn rich_and_missing_outputs_are_skipped() {
        let mut nb = Notebook::new();
        nb.push(Cell::new("plot()").with_output(CellOutput::Rich));
        nb.push(Cell::new("a"));
        nb.push(Cell::new("plot again"));
        assert_eq!(
            nb.text(0, Area::Output),
            Err(AreaError::UnsupportedOutput { cell: 0 })
        );
        let mut s = ISearcher::new(&nb, "", false, false);
        s.play_search(&mut nb, "plot", false);
        let next = s.search_again(&mut nb).unwrap();
        assert_eq!(span(&next), (2, 0, 4));
    }

    #[test]
    fn multiline_match_positions() {
        let mut nb = one_cell("one\ntwo\nthree", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        let place = s.play_search(&mut nb, "two\nth", false).place.unwrap();
        assert_eq!(
            place.selection,
            Selection::new(Pos::new(1, 0), Pos::new(2, 2))
        );
    }

    // ── Literal vs regex ────────────────────────────────────────────────

    #[test]
    fn literal_escapes_metacharacters() {
        let mut nb = one_cell("abc a.c", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        let place = s.play_search(&mut nb, "a.c", false).place.unwrap();
        assert_eq!(span(&place), (0, 4, 7));
    }

    #[test]
    fn regex_matches_any_char() {
        let mut nb = one_cell("abc a.c", 0);
        let mut s = ISearcher::new(&nb, "", true, false);
        let r = s.play_search(&mut nb, "a.c", false);
        assert!(r.complete);
        assert_eq!(span(&r.place.unwrap()), (0, 0, 3));
    }

    #[test]
    fn regex_add_char_defers_scan() {
        let mut nb = one_cell("abc", 0);
        let mut s = ISearcher::new(&nb, "", true, false);
        assert_eq!(s.add_char(&mut nb, 'b'), None);
        assert_eq!(s.status(), SearchStatus::Pending);
        let place = s.search_again(&mut nb).unwrap();
        assert_eq!(span(&place), (0, 1, 2));
    }

    #[test]
    fn invalid_regex_is_no_match() {
        let mut nb = one_cell("a(b", 0);
        let mut s = ISearcher::new(&nb, "", true, false);
        let r = s.play_search(&mut nb, "a(", false);
        assert!(!r.complete);
        assert_eq!(s.status(), SearchStatus::Exhausted);
    }

    // ── Replay ──────────────────────────────────────────────────────────

    #[test]
    fn play_search_reports_matched_prefix() {
        let mut nb = one_cell("the cat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        let r = s.play_search(&mut nb, "cow", false);
        assert_eq!(r.matched, "c");
        assert!(!r.complete);
        assert_eq!(span(&r.place.unwrap()), (0, 4, 5));
        assert_eq!(s.term(), "co");
    }

    #[test]
    fn play_search_from_empty_replaces_term() {
        let mut nb = one_cell("the cat sat", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.play_search(&mut nb, "sa", false);
        let r = s.play_search(&mut nb, "cat", true);
        assert!(r.complete);
        assert_eq!(s.term(), "cat");
        assert_eq!(span(&r.place.unwrap()), (0, 4, 7));
    }

    #[test]
    fn clear_highlights_is_idempotent() {
        let mut nb = one_cell("abc", 0);
        let mut s = ISearcher::new(&nb, "", false, false);
        s.add_char(&mut nb, 'b');
        assert_eq!(nb.marks().len(), 1);
        s.clear_highlights(&mut nb);
        s.clear_highlights(&mut nb);
        assert!(nb.marks().is_empty());
    }

    // ── Scanners ────────────────────────────────────────────────────────

    #[test]
    fn find_reverse_handles_multibyte() {
        let re = Regex::new("é").unwrap();
        assert_eq!(find_reverse(&re, "éaé", None, false), Some((2, 3)));
        assert_eq!(find_reverse(&re, "éaé", Some(2), true), Some((0, 1)));
        assert_eq!(find_reverse(&re, "éaé", Some(0), true), None);
    }

    #[test]
    fn find_forward_steps_over_empty_match() {
        let re = Regex::new("x*").unwrap();
        assert_eq!(find_forward(&re, "ab", Some(0), true), Some((1, 1)));
    }
}

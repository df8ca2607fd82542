//! The Emacs command set and the layers that bind it.
//!
//! Every command has the same shape, `fn(&mut Emacsy<H>) -> Result<()>`,
//! and is registered under the name the keymap layers use. Commands work
//! on the focused cell's input: they read its text into a rope, compute
//! char offsets, and hand the change back to the host.
//!
//! | Key            | Command                  |
//! |----------------|--------------------------|
//! | `Ctrl-X`       | `ctrlXCmd` (prefix)      |
//! | `Ctrl-K`       | `killCmd`                |
//! | `Ctrl-W`       | `killRegionCmd`          |
//! | `Alt-W` `Cmd-W`| `copyCmd`                |
//! | `Ctrl-Y`       | `yankCmd`                |
//! | `Ctrl-Space`   | `setMarkCmd`             |
//! | `Ctrl-G`       | `keyboardQuit`           |
//! | `Ctrl-S` `Ctrl-R` | `isearchForward` `isearchBackward` |
//! | `Ctrl-Alt-S` `Ctrl-Alt-R` | `isearchForwardRegexp` `isearchBackwardRegexp` |
//! | `Ctrl-A` `Ctrl-E` | `goLineStart` `goLineEnd` |
//! | `Ctrl-P` `Ctrl-N` | `goLineUp` `goLineDown`   |
//! | `Ctrl-B` `Ctrl-F` | `goCharLeft` `goCharRight` |
//! | `Alt-B` `Alt-F`   | `goWordLeft` `goWordRight` |
//! | `Ctrl-D`       | `delCharAfter`           |
//! | `Ctrl-T`       | `transposeChars`         |
//!
//! After `Ctrl-X`: `x` save region to register, `g` insert register,
//! `/` save point to register, `j` jump to register.

use emacsy_keymap::Layer;
use ropey::Rope;

use crate::emacs::{Command, Emacsy, Pending};
use crate::error::Result;
use crate::host::{Area, Host};
use crate::position::{char_to_pos, line_len, pos_to_char, Pos, Selection};

// ---------------------------------------------------------------------------
// Layers
// ---------------------------------------------------------------------------

/// Bindings shared by both base layers.
const BASE_COMMON: &[(&str, &str)] = &[
    ("Left", "goCharLeft"),
    ("Right", "goCharRight"),
    ("Up", "goLineUp"),
    ("Down", "goLineDown"),
    ("Home", "goLineStart"),
    ("End", "goLineEnd"),
    ("Backspace", "delCharBefore"),
    ("Delete", "delCharAfter"),
    ("Enter", "newline"),
];

/// The host editor's default bindings on Linux and Windows.
pub(crate) fn pc_default() -> emacsy_keymap::Result<Layer> {
    Layer::from_notation(BASE_COMMON.iter().copied().chain([
        ("Ctrl-A", "selectAll"),
        ("Ctrl-Left", "goWordLeft"),
        ("Ctrl-Right", "goWordRight"),
    ]))
}

/// The host editor's default bindings on macOS.
pub(crate) fn mac_default() -> emacsy_keymap::Result<Layer> {
    Layer::from_notation(BASE_COMMON.iter().copied().chain([
        ("Cmd-A", "selectAll"),
        ("Alt-Left", "goWordLeft"),
        ("Alt-Right", "goWordRight"),
        ("Cmd-Left", "goLineStart"),
        ("Cmd-Right", "goLineEnd"),
    ]))
}

/// The Emacs bindings, installed over a base layer.
pub(crate) fn emacs_layer() -> emacsy_keymap::Result<Layer> {
    Layer::from_notation([
        ("Ctrl-X", "ctrlXCmd"),
        ("Ctrl-K", "killCmd"),
        ("Ctrl-W", "killRegionCmd"),
        ("Alt-W", "copyCmd"),
        ("Cmd-W", "copyCmd"),
        ("Ctrl-Y", "yankCmd"),
        ("Ctrl-Space", "setMarkCmd"),
        ("Ctrl-G", "keyboardQuit"),
        ("Ctrl-S", "isearchForward"),
        ("Ctrl-R", "isearchBackward"),
        ("Ctrl-Alt-S", "isearchForwardRegexp"),
        ("Ctrl-Alt-R", "isearchBackwardRegexp"),
        ("Ctrl-A", "goLineStart"),
        ("Ctrl-E", "goLineEnd"),
        ("Ctrl-P", "goLineUp"),
        ("Ctrl-N", "goLineDown"),
        ("Ctrl-B", "goCharLeft"),
        ("Ctrl-F", "goCharRight"),
        ("Ctrl-D", "delCharAfter"),
        ("Ctrl-T", "transposeChars"),
        ("Alt-B", "goWordLeft"),
        ("Alt-F", "goWordRight"),
    ])
}

/// Second keys after `Ctrl-X`.
pub(crate) fn ctrl_x_layer() -> emacsy_keymap::Result<Layer> {
    Layer::from_notation([
        ("x", "saveToRegCmd"),
        ("g", "insertFromRegCmd"),
        ("/", "pointToRegCmd"),
        ("j", "jumpToRegCmd"),
    ])
}

/// Every built-in command with its registered name.
pub(crate) fn command_table<H: Host>() -> Vec<(&'static str, Command<H>)> {
    vec![
        ("ctrlXCmd", ctrl_x_cmd::<H>),
        ("killCmd", kill_cmd::<H>),
        ("killRegionCmd", kill_region_cmd::<H>),
        ("copyCmd", copy_cmd::<H>),
        ("yankCmd", yank_cmd::<H>),
        ("setMarkCmd", set_mark_cmd::<H>),
        ("keyboardQuit", keyboard_quit::<H>),
        ("isearchForward", isearch_forward::<H>),
        ("isearchBackward", isearch_backward::<H>),
        ("isearchForwardRegexp", isearch_forward_regexp::<H>),
        ("isearchBackwardRegexp", isearch_backward_regexp::<H>),
        ("saveToRegCmd", save_to_reg_cmd::<H>),
        ("insertFromRegCmd", insert_from_reg_cmd::<H>),
        ("pointToRegCmd", point_to_reg_cmd::<H>),
        ("jumpToRegCmd", jump_to_reg_cmd::<H>),
        ("goLineStart", go_line_start::<H>),
        ("goLineEnd", go_line_end::<H>),
        ("goLineUp", go_line_up::<H>),
        ("goLineDown", go_line_down::<H>),
        ("goCharLeft", go_char_left::<H>),
        ("goCharRight", go_char_right::<H>),
        ("goWordLeft", go_word_left::<H>),
        ("goWordRight", go_word_right::<H>),
        ("delCharAfter", del_char_after::<H>),
        ("delCharBefore", del_char_before::<H>),
        ("transposeChars", transpose_chars::<H>),
        ("newline", newline::<H>),
        ("selectAll", select_all::<H>),
    ]
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The focused cell and its input text.
fn focused_input<H: Host>(e: &Emacsy<H>) -> Result<(usize, Rope)> {
    let cell = e.host.focused();
    let text = e.host.text(cell, Area::Input)?;
    Ok((cell, Rope::from_str(&text)))
}

/// Text covered by `sel`.
fn selected_text(rope: &Rope, sel: Selection) -> String {
    let from = pos_to_char(rope, sel.start());
    let to = pos_to_char(rope, sel.end());
    rope.slice(from..to).to_string()
}

/// Turn the mark off and collapse the selection onto the cursor.
fn deactivate_mark<H: Host>(e: &mut Emacsy<H>, cell: usize) {
    e.host.set_extending(cell, false);
    let head = e.host.cursor(cell);
    e.host.set_selection(cell, Selection::caret(head));
}

/// Move the cursor to wherever `motion` says.
fn move_cursor<H: Host>(e: &mut Emacsy<H>, motion: impl FnOnce(&Rope, Pos) -> Pos) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let target = motion(&rope, e.host.cursor(cell));
    e.host.set_cursor(cell, target);
    Ok(())
}

fn is_word(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

// ---------------------------------------------------------------------------
// Kill and yank
// ---------------------------------------------------------------------------

/// `Ctrl-K` — kill to the end of the line, or the line break when the
/// cursor is already there.
fn kill_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let pos = e.host.cursor(cell);
    let len = line_len(&rope, pos.line);
    let last_line = pos.line + 1 >= rope.len_lines();

    let to = if e.session.options.killwholeline && pos.ch == 0 && !last_line {
        Pos::new(pos.line + 1, 0)
    } else if pos.ch < len {
        Pos::new(pos.line, len)
    } else if !last_line {
        Pos::new(pos.line + 1, 0)
    } else {
        return Ok(());
    };

    let killed = rope.slice(pos_to_char(&rope, pos)..pos_to_char(&rope, to));
    e.session.kill.kill(&killed.to_string());
    e.host.set_extending(cell, false);
    e.host.replace_range(cell, pos, to, "");
    Ok(())
}

/// `Ctrl-W` — kill the selection.
fn kill_region_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let sel = e.host.selection(cell);
    e.host.set_extending(cell, false);
    if sel.is_empty() {
        return Ok(());
    }
    e.session.kill.store(selected_text(&rope, sel));
    e.host.replace_range(cell, sel.start(), sel.end(), "");
    Ok(())
}

/// `Alt-W` — copy the selection to the kill buffer.
fn copy_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let sel = e.host.selection(cell);
    if !sel.is_empty() {
        e.session.kill.store(selected_text(&rope, sel));
    }
    deactivate_mark(e, cell);
    Ok(())
}

/// `Ctrl-Y` — insert the kill buffer at the cursor.
fn yank_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    if e.session.kill.is_empty() {
        return Ok(());
    }
    let text = e.session.kill.content().to_string();
    let cell = e.host.focused();
    e.host.set_extending(cell, false);
    e.insert_text(&text);
    Ok(())
}

// ---------------------------------------------------------------------------
// Mark, quit, search
// ---------------------------------------------------------------------------

fn set_mark_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let cell = e.host.focused();
    let head = e.host.cursor(cell);
    e.host.set_selection(cell, Selection::caret(head));
    e.host.set_extending(cell, true);
    Ok(())
}

/// `Ctrl-G` — drop the mark.
fn keyboard_quit<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.cancel_capture();
    let cell = e.host.focused();
    deactivate_mark(e, cell);
    Ok(())
}

fn isearch_forward<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.open_search(false, false)
}

fn isearch_backward<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.open_search(false, true)
}

fn isearch_forward_regexp<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.open_search(true, false)
}

fn isearch_backward_regexp<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.open_search(true, true)
}

// ---------------------------------------------------------------------------
// Ctrl-X and registers
// ---------------------------------------------------------------------------

fn ctrl_x_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.await_key(Pending::CtrlX, true)
}

/// `Ctrl-X x` — remember the selection; the register name comes next.
fn save_to_reg_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let text = selected_text(&rope, e.host.selection(cell));
    deactivate_mark(e, cell);
    e.await_key(Pending::SaveToRegister { text }, false)
}

fn insert_from_reg_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.await_key(Pending::InsertFromRegister, false)
}

fn point_to_reg_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.await_key(Pending::PointToRegister, false)
}

fn jump_to_reg_cmd<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.await_key(Pending::JumpToRegister, false)
}

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

fn go_line_start<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |_, pos| Pos::new(pos.line, 0))
}

fn go_line_end<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| Pos::new(pos.line, line_len(rope, pos.line)))
}

fn go_line_up<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| match pos.line.checked_sub(1) {
        Some(line) => Pos::new(line, pos.ch.min(line_len(rope, line))),
        None => pos,
    })
}

fn go_line_down<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| {
        let line = pos.line + 1;
        if line < rope.len_lines() {
            Pos::new(line, pos.ch.min(line_len(rope, line)))
        } else {
            pos
        }
    })
}

fn go_char_left<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| {
        char_to_pos(rope, pos_to_char(rope, pos).saturating_sub(1))
    })
}

fn go_char_right<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| char_to_pos(rope, pos_to_char(rope, pos) + 1))
}

/// `Alt-F` — to the end of the next word.
fn go_word_right<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| {
        let len = rope.len_chars();
        let mut i = pos_to_char(rope, pos);
        while i < len && !is_word(rope.char(i)) {
            i += 1;
        }
        while i < len && is_word(rope.char(i)) {
            i += 1;
        }
        char_to_pos(rope, i)
    })
}

/// `Alt-B` — to the start of the previous word.
fn go_word_left<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    move_cursor(e, |rope, pos| {
        let mut i = pos_to_char(rope, pos);
        while i > 0 && !is_word(rope.char(i - 1)) {
            i -= 1;
        }
        while i > 0 && is_word(rope.char(i - 1)) {
            i -= 1;
        }
        char_to_pos(rope, i)
    })
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

fn del_char_after<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let pos = e.host.cursor(cell);
    let at = pos_to_char(&rope, pos);
    if at < rope.len_chars() {
        e.host.replace_range(cell, pos, char_to_pos(&rope, at + 1), "");
    }
    Ok(())
}

fn del_char_before<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let pos = e.host.cursor(cell);
    if let Some(prev) = pos_to_char(&rope, pos).checked_sub(1) {
        e.host.replace_range(cell, char_to_pos(&rope, prev), pos, "");
    }
    Ok(())
}

/// `Ctrl-T` — swap the characters around the cursor and step forward. At
/// the end of a line the last two characters are swapped.
fn transpose_chars<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let pos = e.host.cursor(cell);
    let len = line_len(&rope, pos.line);
    if pos.ch == 0 || len < 2 {
        return Ok(());
    }
    let right = pos.ch.min(len - 1);
    let base = rope.line_to_char(pos.line);
    let swapped: String = [rope.char(base + right), rope.char(base + right - 1)]
        .iter()
        .collect();
    e.host.replace_range(
        cell,
        Pos::new(pos.line, right - 1),
        Pos::new(pos.line, right + 1),
        &swapped,
    );
    Ok(())
}

fn newline<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    e.insert_text("\n");
    Ok(())
}

fn select_all<H: Host>(e: &mut Emacsy<H>) -> Result<()> {
    let (cell, rope) = focused_input(e)?;
    let end = char_to_pos(&rope, rope.len_chars());
    e.host.set_selection(cell, Selection::new(Pos::ZERO, end));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

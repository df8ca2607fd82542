// SPDX-License-Identifier: MIT
//
// emacsy-plus — Emacs keybindings and incremental search for notebook cells.
//
// This binary drives the editor core from a script instead of a terminal:
//
//   emacsy-plus [--set OPTION]... CELL_FILE... < keys
//
//   CELL_FILE   → one cell's input; CELL_FILE.out, if present, its output
//   --set       → `set` directives applied in order (`nocf`, `bk=macDefault`)
//   stdin       → whitespace-separated key notations (`Ctrl-S c a t Enter`)
//
// Keys flow through `Emacsy::handle_key`. A printable key no layer binds
// self-inserts, the way the host editor would handle it. When the script
// ends each cell is printed with `|` at the cursor and `[` at the mark,
// followed by the kill buffer, registers, and any search still open.
//
// Logging goes to stderr, filtered by EMACSY_LOG (default `warn`).

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use emacsy_editor::{Cell, CellOutput, Dispatch, Emacsy, Host, Notebook, Options};
use emacsy_keymap::KeyStroke;
use tracing::debug;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: emacsy-plus [--set OPTION]... CELL_FILE...";

// ─── Arguments ──────────────────────────────────────────────────────────────

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct Args {
    /// `--set` arguments, in order.
    sets: Vec<String>,
    /// Cell files, in notebook order.
    files: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        if arg == "--set" {
            let value = args.next().ok_or("--set needs an argument")?;
            parsed.sets.push(value);
        } else if let Some(value) = arg.strip_prefix("--set=") {
            parsed.sets.push(value.to_string());
        } else if arg == "-h" || arg == "--help" {
            return Err(USAGE.to_string());
        } else if arg.starts_with("--") {
            return Err(format!("unknown flag {arg}\n{USAGE}"));
        } else {
            parsed.files.push(arg);
        }
    }
    if parsed.files.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(parsed)
}

// ─── Setup ──────────────────────────────────────────────────────────────────

fn setup_tracing() {
    let filter = EnvFilter::try_from_env("EMACSY_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load one cell: the file is the input, `FILE.out` the output.
fn load_cell(path: &str) -> Result<Cell, String> {
    let input = fs::read_to_string(path).map_err(|e| format!("{path}: {e}"))?;
    let mut cell = Cell::new(&input);

    let out_path = format!("{path}.out");
    if Path::new(&out_path).is_file() {
        let output = fs::read_to_string(&out_path).map_err(|e| format!("{out_path}: {e}"))?;
        cell = cell.with_output(CellOutput::Text(output));
    }
    Ok(cell)
}

/// Apply `--set` arguments. Query results are returned for printing.
fn apply_sets(options: &mut Options, sets: &[String]) -> Result<Vec<String>, String> {
    let mut shown = Vec::new();
    for arg in sets {
        shown.extend(options.set(arg).map_err(|e| format!("--set {arg}: {e}"))?);
    }
    Ok(shown)
}

// ─── Script ─────────────────────────────────────────────────────────────────

/// Feed every key notation in `script` to the editor.
fn run_script(editor: &mut Emacsy<Notebook>, script: &str) -> Result<(), String> {
    for notation in script.split_whitespace() {
        let key = KeyStroke::parse(notation).map_err(|e| format!("key '{notation}': {e}"))?;
        if let Dispatch::Unbound(key) = editor.handle_key(&key) {
            if let Some(ch) = key.typed_char() {
                editor.insert_text(ch.encode_utf8(&mut [0; 4]));
            } else {
                debug!(%key, "ignored unbound key");
            }
        }
    }
    Ok(())
}

/// Cells, kill buffer, registers and open search, as printed at exit.
fn report(editor: &Emacsy<Notebook>) -> String {
    let host = editor.host();
    let mut out = String::new();

    for i in 0..host.cell_count() {
        let focus = if i == host.focused() { " *" } else { "" };
        let _ = writeln!(out, "── cell {i}{focus}");
        if let Some(text) = host.render(i) {
            let _ = writeln!(out, "{text}");
        }
    }

    let session = editor.session();
    if !session.kill.is_empty() {
        let _ = writeln!(out, "── kill\n{}", session.kill.content());
    }
    for (name, text) in session.registers.iter_text() {
        let _ = writeln!(out, "── register {name}\n{text}");
    }
    for (name, mark) in session.registers.iter_positions() {
        let _ = writeln!(out, "── point {name}: cell {} {}", mark.cell, mark.pos);
    }
    if let Some(search) = editor.search() {
        let mb = search.minibuffer();
        let _ = writeln!(out, "── {}{}", mb.prompt(), mb.text());
    }
    out
}

fn run() -> Result<String, String> {
    let args = parse_args(env::args().skip(1))?;

    let mut options = Options::default();
    let shown = apply_sets(&mut options, &args.sets)?;

    let notebook = args.files.iter().map(|f| load_cell(f)).collect::<Result<Notebook, _>>()?;
    let mut editor = Emacsy::new(notebook, options).map_err(|e| e.to_string())?;

    let mut script = String::new();
    io::stdin()
        .read_to_string(&mut script)
        .map_err(|e| format!("stdin: {e}"))?;
    run_script(&mut editor, &script)?;

    let mut out = String::new();
    for line in shown {
        out.push_str(&line);
        out.push('\n');
    }
    out.push_str(&report(&editor));
    Ok(out)
}

fn main() {
    setup_tracing();
    match run() {
        Ok(out) => print!("{out}"),
        Err(e) => {
            eprintln!("emacsy-plus: {e}");
            process::exit(1);
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

//! Session options — the `set` system.
//!
//! Options are changed with Vim-style `set` directives, from the driver's
//! `--set` flags or from an embedding's settings page.
//!
//! # Supported syntax
//!
//! | Syntax          | Effect                |
//! |-----------------|-----------------------|
//! | `option`        | Enable boolean        |
//! | `nooption`      | Disable boolean       |
//! | `option!`       | Toggle boolean        |
//! | `option?`       | Query current value   |
//! | `option=value`  | Assign a value        |
//!
//! # Option names
//!
//! | Full name       | Abbrev | Type   | Default      |
//! |-----------------|--------|--------|--------------|
//! | `casefold`      | `cf`   | bool   | true         |
//! | `wrapscan`      | `ws`   | bool   | true         |
//! | `killwholeline` | `kwl`  | bool   | false        |
//! | `basekeymap`    | `bk`   | string | per platform |

use crate::error::{Error, Result};

/// Base keymap on macOS.
pub const MAC_KEYMAP: &str = "macDefault";
/// Base keymap everywhere else.
pub const PC_KEYMAP: &str = "pcDefault";

/// A parsed `set` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetDirective {
    /// `option` — enable a boolean option.
    On(String),
    /// `nooption` — disable a boolean option.
    Off(String),
    /// `option!` — toggle a boolean option.
    Toggle(String),
    /// `option?` — query the current value.
    Query(String),
    /// `option=value` — assign a value.
    Assign(String, String),
}

/// Which option a name refers to, abbreviations resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionName {
    CaseFold,
    WrapScan,
    KillWholeLine,
    BaseKeymap,
}

impl OptionName {
    fn parse(name: &str) -> Option<Self> {
        Some(match name {
            "casefold" | "cf" => Self::CaseFold,
            "wrapscan" | "ws" => Self::WrapScan,
            "killwholeline" | "kwl" => Self::KillWholeLine,
            "basekeymap" | "bk" => Self::BaseKeymap,
            _ => return None,
        })
    }

    const fn full(self) -> &'static str {
        match self {
            Self::CaseFold => "casefold",
            Self::WrapScan => "wrapscan",
            Self::KillWholeLine => "killwholeline",
            Self::BaseKeymap => "basekeymap",
        }
    }

    const fn is_bool(self) -> bool {
        !matches!(self, Self::BaseKeymap)
    }
}

/// Returns `true` if `name` is a known boolean option (full name or abbreviation).
#[must_use]
pub fn is_bool_option(name: &str) -> bool {
    OptionName::parse(name).is_some_and(OptionName::is_bool)
}

/// Parse whitespace-separated `set` arguments.
#[must_use]
pub fn parse_set(args: &str) -> Vec<SetDirective> {
    args.split_whitespace().map(parse_set_arg).collect()
}

/// Parse a single `set` argument.
#[must_use]
pub fn parse_set_arg(arg: &str) -> SetDirective {
    if let Some((name, value)) = arg.split_once('=') {
        return SetDirective::Assign(name.to_string(), value.to_string());
    }
    if let Some(name) = arg.strip_suffix('?') {
        return SetDirective::Query(name.to_string());
    }
    if let Some(name) = arg.strip_suffix('!') {
        return SetDirective::Toggle(name.to_string());
    }
    // Only strip "no" when the rest is a boolean option.
    if let Some(name) = arg.strip_prefix("no") {
        if is_bool_option(name) {
            return SetDirective::Off(name.to_string());
        }
    }
    SetDirective::On(arg.to_string())
}

/// Format a boolean option for display: `"name"` or `"noname"`.
#[must_use]
pub fn format_bool(name: &str, value: bool) -> String {
    if value {
        name.to_string()
    } else {
        format!("no{name}")
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Current option values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Infer case sensitivity from the term; off means always sensitive.
    pub casefold: bool,
    /// Repeating a failed search restarts from the far end.
    pub wrapscan: bool,
    /// `Ctrl-K` at column 0 kills the whole line, newline included.
    pub killwholeline: bool,
    /// Layer the Emacs bindings are installed over.
    pub basekeymap: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            casefold: true,
            wrapscan: true,
            killwholeline: false,
            basekeymap: default_keymap().to_string(),
        }
    }
}

impl Options {
    /// Apply one directive. Queries return the formatted value; other
    /// directives return `None`.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownOption`] for names that aren't options.
    /// - [`Error::InvalidOptionValue`] for a bad assignment, or a boolean
    ///   directive on the string option.
    pub fn apply(&mut self, directive: &SetDirective) -> Result<Option<String>> {
        let name = match directive {
            SetDirective::On(n)
            | SetDirective::Off(n)
            | SetDirective::Toggle(n)
            | SetDirective::Query(n)
            | SetDirective::Assign(n, _) => n,
        };
        let opt = OptionName::parse(name).ok_or_else(|| Error::UnknownOption(name.clone()))?;

        match directive {
            SetDirective::Query(_) => return Ok(Some(self.format(opt))),
            SetDirective::Assign(_, value) => self.assign(opt, value)?,
            SetDirective::On(_) | SetDirective::Off(_) | SetDirective::Toggle(_) => {
                let Some(flag) = self.flag_mut(opt) else {
                    return Err(Error::InvalidOptionValue {
                        name: opt.full().to_string(),
                        value: String::new(),
                    });
                };
                *flag = match directive {
                    SetDirective::On(_) => true,
                    SetDirective::Off(_) => false,
                    _ => !*flag,
                };
            }
        }
        Ok(None)
    }

    /// Parse and apply a `set` argument string.
    ///
    /// # Errors
    ///
    /// Stops at the first directive that fails; see [`apply`](Self::apply).
    pub fn set(&mut self, args: &str) -> Result<Vec<String>> {
        let mut shown = Vec::new();
        for directive in parse_set(args) {
            if let Some(value) = self.apply(&directive)? {
                shown.push(value);
            }
        }
        Ok(shown)
    }

    fn flag_mut(&mut self, opt: OptionName) -> Option<&mut bool> {
        match opt {
            OptionName::CaseFold => Some(&mut self.casefold),
            OptionName::WrapScan => Some(&mut self.wrapscan),
            OptionName::KillWholeLine => Some(&mut self.killwholeline),
            OptionName::BaseKeymap => None,
        }
    }

    fn assign(&mut self, opt: OptionName, value: &str) -> Result<()> {
        let invalid = || Error::InvalidOptionValue {
            name: opt.full().to_string(),
            value: value.to_string(),
        };
        if opt == OptionName::BaseKeymap {
            if value.is_empty() {
                return Err(invalid());
            }
            self.basekeymap = value.to_string();
            return Ok(());
        }
        let on = match value {
            "true" | "on" | "1" => true,
            "false" | "off" | "0" => false,
            _ => return Err(invalid()),
        };
        if let Some(flag) = self.flag_mut(opt) {
            *flag = on;
        }
        Ok(())
    }

    fn format(&self, opt: OptionName) -> String {
        match opt {
            OptionName::CaseFold => format_bool(opt.full(), self.casefold),
            OptionName::WrapScan => format_bool(opt.full(), self.wrapscan),
            OptionName::KillWholeLine => format_bool(opt.full(), self.killwholeline),
            OptionName::BaseKeymap => format!("{}={}", opt.full(), self.basekeymap),
        }
    }
}

/// The base keymap for the platform this was built for.
#[must_use]
pub const fn default_keymap() -> &'static str {
    if cfg!(target_os = "macos") {
        MAC_KEYMAP
    } else {
        PC_KEYMAP
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

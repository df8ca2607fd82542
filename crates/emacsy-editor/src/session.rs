//! Session state shared by every command.
//!
//! One `Session` lives as long as the editor facade. Commands and the
//! search controller receive it by reference; nothing here is global.

use crate::options::Options;
use crate::register::{KillRing, RegisterFile};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub options: Options,
    pub kill: KillRing,
    pub registers: RegisterFile,
    /// Term of the last closed search, replayed by `Ctrl-S Ctrl-S`.
    pub last_search: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(options: Options) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// Remember a finished search term. Empty terms don't overwrite.
    pub fn remember_search(&mut self, term: &str) {
        if !term.is_empty() {
            self.last_search = Some(term.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_term_keeps_previous() {
        let mut session = Session::default();
        session.remember_search("foo");
        session.remember_search("");
        assert_eq!(session.last_search.as_deref(), Some("foo"));
    }
}

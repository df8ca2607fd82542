// SPDX-License-Identifier: MIT
//
// Command registry.
//
// Keymap layers bind keystrokes to command *names*; the registry maps
// names to functions. Resolution happens at dispatch time, so a layer may
// mention a command that was never registered. Dispatching such a binding
// is a no-op, which the caller learns about through `get` returning `None`.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};

/// Identifier of a registered command, e.g. `"killCmd"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandName(String);

impl CommandName {
    /// Create a command name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CommandName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for CommandName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl Borrow<str> for CommandName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signature every command has: it receives the dispatch context.
pub type CommandFn<T, E> = fn(&mut T) -> std::result::Result<(), E>;

/// Name → function table.
///
/// `T` is the context commands run against (the editor facade), `E` the
/// error type they report.
pub struct CommandRegistry<T, E> {
    commands: HashMap<CommandName, CommandFn<T, E>>,
}

impl<T, E> CommandRegistry<T, E> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Register `func` under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommandExists`] when `name` is already registered
    /// and `overwrite` is `false`. With `overwrite` the old function is
    /// replaced.
    pub fn register(
        &mut self,
        name: impl Into<CommandName>,
        func: CommandFn<T, E>,
        overwrite: bool,
    ) -> Result<()> {
        let name = name.into();
        if !overwrite && self.commands.contains_key(&name) {
            return Err(Error::CommandExists(name.0));
        }
        debug!(command = %name, overwrite, "registered command");
        self.commands.insert(name, func);
        Ok(())
    }

    /// Look a command up by name. `None` means "unregistered".
    #[must_use]
    pub fn get(&self, name: &str) -> Option<CommandFn<T, E>> {
        self.commands.get(name).copied()
    }

    /// True if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    /// Number of registered commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl<T, E> Default for CommandRegistry<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Errors raised by keymap wiring.
//
// Every variant here is a programming-time defect (a layer that was never
// installed, a restore without its suspend, a garbled key notation).
// Steady-state misses such as an unbound keystroke are not errors; they
// come back as `None` from the lookup functions.

use thiserror::Error;

use crate::keystroke::KeyStroke;

/// Keymap, capture and command-registry failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A layer name was empty.
    #[error("keymap layer name must not be empty")]
    EmptyLayerName,

    /// A layer referenced by name was never installed.
    #[error("no keymap layer named '{0}'")]
    UnknownLayer(String),

    /// An operation needed an active layer before any was activated.
    #[error("no keymap layer is active")]
    NoActiveLayer,

    /// `suspend` was called for a key no layer binds.
    #[error("cannot suspend unbound key {0}")]
    UnboundKey(KeyStroke),

    /// `suspend` was called twice for the same key without a `restore`.
    #[error("key {0} is already suspended")]
    AlreadySuspended(KeyStroke),

    /// `restore` was called without a matching `suspend`.
    #[error("restore of {0} without prior suspend")]
    NotSuspended(KeyStroke),

    /// A capture was requested while another one is still waiting.
    #[error("a follow-up key capture is already pending")]
    CapturePending,

    /// A command name is taken and overwriting was not requested.
    #[error("command '{0}' already exists and overwrite was not requested")]
    CommandExists(String),

    /// A key notation string could not be parsed.
    #[error("invalid key notation '{0}'")]
    InvalidKey(String),
}

/// Result alias for keymap operations.
pub type Result<T> = std::result::Result<T, Error>;

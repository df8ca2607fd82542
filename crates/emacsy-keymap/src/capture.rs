// SPDX-License-Identifier: MIT
//
// One-shot follow-up key capture.
//
// Prefix commands (`Ctrl-X`, "save to register" waiting for the register
// name) need the *next* keystroke before they can finish. The capture
// holds a continuation value, chosen by the caller, until that keystroke
// arrives. While it waits, the prefix key's own binding is suspended so
// pressing the prefix again can't re-enter its handler; the binding is
// restored as soon as the capture resolves or is cancelled.
//
// Bare modifier presses never resolve a capture: the user pressing Ctrl on
// the way to `Ctrl-X j` must not consume the wait.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::keymap::KeyBindingTable;
use crate::keystroke::KeyStroke;

/// What a [`KeyCapture`] is doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureState<C> {
    /// Not waiting for anything.
    Idle,
    /// Waiting for the next non-modifier keystroke.
    AwaitingFollowUp {
        /// The suspended prefix key, if one was suspended.
        prefix: Option<KeyStroke>,
        /// Handed back to the caller together with the follow-up key.
        continuation: C,
    },
}

/// Single-slot follow-up key capture.
#[derive(Debug)]
pub struct KeyCapture<C> {
    state: CaptureState<C>,
}

impl<C> KeyCapture<C> {
    /// Create an idle capture.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Start waiting for a follow-up key.
    ///
    /// When `prefix` is given, its binding is suspended in `table` for the
    /// duration of the wait.
    ///
    /// # Errors
    ///
    /// - [`Error::CapturePending`] if a capture is already waiting.
    /// - Any error from [`KeyBindingTable::suspend`]; the capture stays idle.
    pub fn begin(
        &mut self,
        table: &mut KeyBindingTable,
        prefix: Option<KeyStroke>,
        continuation: C,
    ) -> Result<()> {
        if self.is_pending() {
            return Err(Error::CapturePending);
        }
        if let Some(key) = &prefix {
            table.suspend(key)?;
        }
        debug!(prefix = ?prefix.map(|k| k.to_string()), "awaiting follow-up key");
        self.state = CaptureState::AwaitingFollowUp {
            prefix,
            continuation,
        };
        Ok(())
    }

    /// Offer `key` to the capture.
    ///
    /// Returns the continuation when `key` completes the wait. Returns
    /// `None` when idle or when `key` is a bare modifier; in the latter case
    /// the capture keeps waiting.
    pub fn resolve(&mut self, table: &mut KeyBindingTable, key: &KeyStroke) -> Option<C> {
        if key.is_modifier_only() || !self.is_pending() {
            return None;
        }
        let continuation = self.finish(table)?;
        debug!(%key, "follow-up key captured");
        Some(continuation)
    }

    /// Abandon a pending capture, restoring the prefix binding.
    ///
    /// Returns `true` if something was cancelled. Calling it while idle is
    /// a no-op.
    pub fn cancel(&mut self, table: &mut KeyBindingTable) -> bool {
        let cancelled = self.finish(table).is_some();
        if cancelled {
            debug!("follow-up key capture cancelled");
        }
        cancelled
    }

    /// True while waiting for a follow-up key.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self.state, CaptureState::AwaitingFollowUp { .. })
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CaptureState<C> {
        &self.state
    }

    fn finish(&mut self, table: &mut KeyBindingTable) -> Option<C> {
        match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Idle => None,
            CaptureState::AwaitingFollowUp {
                prefix,
                continuation,
            } => {
                if let Some(key) = prefix {
                    if let Err(e) = table.restore(&key) {
                        warn!(%key, error = %e, "prefix binding could not be restored");
                    }
                }
                Some(continuation)
            }
        }
    }
}

impl<C> Default for KeyCapture<C> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

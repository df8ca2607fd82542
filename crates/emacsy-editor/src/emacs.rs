//! The editor facade — routes keystrokes to search, capture or commands.
//!
//! [`Emacsy`] owns everything a keystroke can touch: the host, the
//! session (options, kill buffer, registers), the keymap, the command
//! registry, the follow-up key capture and the open search, if any.
//!
//! # Routing
//!
//! 1. An open search gets every key.
//! 2. A pending capture gets the next non-modifier key. Escape and
//!    `Ctrl-G` cancel it instead.
//! 3. Otherwise the keymap names a command and the registry runs it.
//!
//! # Multi-key commands
//!
//! `Ctrl-X` and the register commands need one more key. They record what
//! they're waiting for as a [`Pending`] value in the capture; the key that
//! resolves the capture is then interpreted according to it.

use emacsy_keymap::{CommandName, CommandRegistry, KeyBindingTable, KeyCapture, KeyCode, KeyStroke, Layer};
use tracing::{debug, trace, warn};

use crate::commands;
use crate::error::{Error, Result};
use crate::host::Host;
use crate::options::{Options, MAC_KEYMAP, PC_KEYMAP};
use crate::position::Pos;
use crate::register::Bookmark;
use crate::search_input::{SearchInputController, SearchOutcome};
use crate::session::Session;

/// Name the Emacs layer is installed under.
pub const EMACS_LAYER: &str = "emacsy_plus";

/// Command whose repeats accumulate in the kill buffer.
const KILL_COMMAND: &str = "killCmd";

// ─── Pending continuation ───────────────────────────────────────────────────

/// What a pending capture will do with the next key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    /// `Ctrl-X` — look the key up in the secondary map.
    CtrlX,
    /// `Ctrl-X x` — save `text` under the register named by the key.
    SaveToRegister { text: String },
    /// `Ctrl-X g` — insert the register named by the key.
    InsertFromRegister,
    /// `Ctrl-X /` — save the cursor under the register named by the key.
    PointToRegister,
    /// `Ctrl-X j` — jump to the position saved under the key.
    JumpToRegister,
}

// ─── Dispatch result ────────────────────────────────────────────────────────

/// What [`Emacsy::handle_key`] did with a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// A command ran (it may have logged a failure).
    Handled(CommandName),
    /// No layer binds the key.
    Unbound(KeyStroke),
    /// The key is bound to a name with no registered command.
    Unregistered(CommandName),
    /// The open search consumed the key.
    Search(SearchOutcome),
    /// The key completed a pending capture.
    Captured,
    /// The key cancelled a pending capture.
    Cancelled,
}

// ─── Emacsy ─────────────────────────────────────────────────────────────────

/// Command signature for this facade.
pub type Command<H> = fn(&mut Emacsy<H>) -> Result<()>;

/// The Emacs layer on top of a host.
pub struct Emacsy<H: Host> {
    pub(crate) host: H,
    pub(crate) session: Session,
    keymap: KeyBindingTable,
    commands: CommandRegistry<Self, Error>,
    ctrl_x: Layer,
    capture: KeyCapture<Pending>,
    pub(crate) search: Option<SearchInputController>,
    /// Key being dispatched, for prefix commands that suspend it.
    current_key: Option<KeyStroke>,
}

impl<H: Host> Emacsy<H> {
    /// Wire up the base layers, the Emacs layer and the command set.
    ///
    /// # Errors
    ///
    /// Fails when `options.basekeymap` names a layer that doesn't exist.
    pub fn new(host: H, options: Options) -> Result<Self> {
        let mut keymap = KeyBindingTable::new();
        keymap.install(commands::pc_default()?, PC_KEYMAP, None)?;
        keymap.install(commands::mac_default()?, MAC_KEYMAP, None)?;
        let active = keymap.install(commands::emacs_layer()?, EMACS_LAYER, Some(options.basekeymap.as_str()))?;
        keymap.activate(&active)?;

        let mut registry = CommandRegistry::new();
        for (name, func) in commands::command_table::<H>() {
            registry.register(name, func, false)?;
        }

        debug!(layer = %active, commands = registry.len(), "emacsy ready");
        Ok(Self {
            host,
            session: Session::new(options),
            keymap,
            commands: registry,
            ctrl_x: commands::ctrl_x_layer()?,
            capture: KeyCapture::new(),
            search: None,
            current_key: None,
        })
    }

    // ── Accessors ───────────────────────────────────────────────────────

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    #[must_use]
    pub const fn keymap(&self) -> &KeyBindingTable {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut KeyBindingTable {
        &mut self.keymap
    }

    /// The open search, if any.
    #[must_use]
    pub const fn search(&self) -> Option<&SearchInputController> {
        self.search.as_ref()
    }

    /// True while a follow-up key is awaited.
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.capture.is_pending()
    }

    /// Register an extra command.
    ///
    /// # Errors
    ///
    /// Fails if `name` exists and `overwrite` is false.
    pub fn register_command(&mut self, name: &str, func: Command<H>, overwrite: bool) -> Result<()> {
        Ok(self.commands.register(name, func, overwrite)?)
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    /// Route one keystroke.
    pub fn handle_key(&mut self, key: &KeyStroke) -> Dispatch {
        if let Some(search) = self.search.as_mut() {
            let outcome = search.handle_key(&mut self.host, &mut self.session, key);
            if !search.is_open() {
                self.search = None;
            }
            return Dispatch::Search(outcome);
        }

        if self.capture.is_pending() && !key.is_modifier_only() {
            return self.handle_capture(key);
        }

        let Some(name) = self.keymap.lookup(key).cloned() else {
            trace!(%key, "unbound key");
            self.session.kill.break_chain();
            return Dispatch::Unbound(*key);
        };
        if name.as_str() != KILL_COMMAND {
            self.session.kill.break_chain();
        }
        self.run(&name, Some(*key))
    }

    /// Run a command by name, as if its key had been pressed.
    pub fn execute(&mut self, name: &str) -> Dispatch {
        self.run(&CommandName::from(name), None)
    }

    /// Insert text at the cursor of the focused cell (self-insert).
    pub fn insert_text(&mut self, text: &str) {
        let cell = self.host.focused();
        let cursor = self.host.cursor(cell);
        self.host.replace_range(cell, cursor, cursor, text);
    }

    fn run(&mut self, name: &CommandName, key: Option<KeyStroke>) -> Dispatch {
        let Some(func) = self.commands.get(name.as_str()) else {
            trace!(command = %name, "bound command is not registered");
            return Dispatch::Unregistered(name.clone());
        };
        trace!(command = %name, "running command");
        self.current_key = key;
        if let Err(e) = func(self) {
            warn!(command = %name, error = %e, "command failed");
        }
        self.current_key = None;
        Dispatch::Handled(name.clone())
    }

    // ── Capture ─────────────────────────────────────────────────────────

    /// Wait for a follow-up key, suspending the key that triggered the
    /// current command when `suspend_prefix` is set.
    pub(crate) fn await_key(&mut self, pending: Pending, suspend_prefix: bool) -> Result<()> {
        let prefix = if suspend_prefix { self.current_key } else { None };
        self.capture.begin(&mut self.keymap, prefix, pending)?;
        Ok(())
    }

    /// Abandon a pending capture and put back every suspended binding.
    /// Returns `true` if a capture was pending.
    pub fn cancel_capture(&mut self) -> bool {
        let cancelled = self.capture.cancel(&mut self.keymap);
        let stray = self.keymap.restore_all();
        if stray > 0 {
            debug!(restored = stray, "restored suspended bindings on cancel");
        }
        cancelled
    }

    fn handle_capture(&mut self, key: &KeyStroke) -> Dispatch {
        let cancels = key.code() == KeyCode::Escape || *key == KeyStroke::ctrl('g');
        if cancels {
            self.cancel_capture();
            return Dispatch::Cancelled;
        }
        let Some(pending) = self.capture.resolve(&mut self.keymap, key) else {
            return Dispatch::Cancelled;
        };
        if let Err(e) = self.continue_pending(pending, key) {
            warn!(%key, error = %e, "follow-up key failed");
        }
        Dispatch::Captured
    }

    fn continue_pending(&mut self, pending: Pending, key: &KeyStroke) -> Result<()> {
        if let Pending::CtrlX = pending {
            let Some(name) = self.ctrl_x.get(key).cloned() else {
                trace!(%key, "no Ctrl-X binding");
                return Ok(());
            };
            if let Dispatch::Unregistered(name) = self.run(&name, Some(*key)) {
                trace!(command = %name, "Ctrl-X command is not registered");
            }
            return Ok(());
        }

        // Register commands name the register with a typed character.
        let Some(reg) = key.typed_char() else {
            trace!(%key, "register name must be a character");
            return Ok(());
        };
        let cell = self.host.focused();

        match pending {
            Pending::SaveToRegister { text } => {
                debug!(register = %reg, len = text.len(), "saved text to register");
                self.session.registers.save(reg, text);
            }
            Pending::InsertFromRegister => {
                if let Some(text) = self.session.registers.get(reg).map(str::to_string) {
                    self.insert_text(&text);
                }
            }
            Pending::PointToRegister => {
                let pos = self.host.cursor(cell);
                self.session.registers.save_position(reg, Bookmark { cell, pos });
            }
            Pending::JumpToRegister => {
                if let Some(Bookmark { cell, pos }) = self.session.registers.position(reg) {
                    self.jump(cell, pos);
                }
            }
            Pending::CtrlX => {}
        }
        Ok(())
    }

    fn jump(&mut self, cell: usize, pos: Pos) {
        if cell >= self.host.cell_count() {
            return;
        }
        self.host.focus(cell);
        self.host.set_cursor(cell, pos);
        self.host.scroll_into_view(cell);
    }

    // ── Search ──────────────────────────────────────────────────────────

    /// Open an incremental search.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SearchActive`] when a search is already open.
    pub fn open_search(&mut self, is_regex: bool, reverse: bool) -> Result<()> {
        if self.search.is_some() {
            return Err(Error::SearchActive);
        }
        self.search = Some(SearchInputController::open(&self.host, &self.session, is_regex, reverse));
        Ok(())
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

// SPDX-License-Identifier: MIT
//
// Layered keymaps.
//
// A `KeyBindingTable` holds named layers. Each layer maps keystrokes to
// command names and lists fallthrough layers that are consulted, in order,
// when the layer itself has no binding for a key. One layer is active at a
// time; activating another pushes the previous one so it can be
// reinstated later.
//
// # Overlaying a base layer
//
// `install(map, "emacsy_plus", Some("pcDefault"))` does not touch the base
// layer. It copies it, deletes from the copy every key that `map` binds,
// and puts `emacsy_plus` first in the copy's fallthrough list. The copy is
// stored as `pcDefault_emacsy_plus` and that composite name is what gets
// activated. Keys the overlay doesn't mention keep their base binding;
// keys it does mention resolve through the fallthrough to the overlay.
//
// # Suspension
//
// A prefix command like `Ctrl-X` removes its own binding while it waits
// for the follow-up key, so the follow-up can't re-enter the prefix
// handler. `suspend` remembers which layer the binding came from and
// `restore` puts it back there. Suspending a key twice without restoring
// in between is rejected: a second suspend would otherwise lose the first
// saved binding or strip an unrelated binding from a fallthrough layer.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::command::CommandName;
use crate::error::{Error, Result};
use crate::keystroke::KeyStroke;

// ─── Layer ──────────────────────────────────────────────────────────────────

/// One named keystroke → command mapping plus its fallthrough chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    bindings: HashMap<KeyStroke, CommandName>,
    fallthrough: Vec<String>,
}

impl Layer {
    /// Create an empty layer with no fallthrough.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a layer from `(notation, command)` pairs, e.g.
    /// `[("Ctrl-K", "killCmd")]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidKey`] for the first notation that fails to
    /// parse.
    pub fn from_notation<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        pairs
            .into_iter()
            .map(|(key, cmd)| Ok((KeyStroke::parse(key)?, CommandName::from(cmd))))
            .collect()
    }

    /// Builder-style fallthrough setter.
    #[must_use]
    pub fn with_fallthrough<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallthrough = names.into_iter().map(Into::into).collect();
        self
    }

    /// Bind `key`, returning the command it replaced.
    pub fn bind(&mut self, key: KeyStroke, command: impl Into<CommandName>) -> Option<CommandName> {
        self.bindings.insert(key, command.into())
    }

    /// Remove the binding for `key`, returning it.
    pub fn unbind(&mut self, key: &KeyStroke) -> Option<CommandName> {
        self.bindings.remove(key)
    }

    /// The command bound to `key` in this layer alone.
    #[must_use]
    pub fn get(&self, key: &KeyStroke) -> Option<&CommandName> {
        self.bindings.get(key)
    }

    /// True if this layer itself binds `key`.
    #[must_use]
    pub fn contains(&self, key: &KeyStroke) -> bool {
        self.bindings.contains_key(key)
    }

    /// Names of the fallthrough layers, in lookup order.
    #[must_use]
    pub fn fallthrough(&self) -> &[String] {
        &self.fallthrough
    }

    /// Number of bindings in this layer (fallthrough not counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// True when the layer binds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Iterate the layer's own bindings.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyStroke, &CommandName)> {
        self.bindings.iter()
    }
}

impl FromIterator<(KeyStroke, CommandName)> for Layer {
    fn from_iter<I: IntoIterator<Item = (KeyStroke, CommandName)>>(iter: I) -> Self {
        Self {
            bindings: iter.into_iter().collect(),
            fallthrough: Vec::new(),
        }
    }
}

// ─── Suspension record ──────────────────────────────────────────────────────

/// A binding temporarily removed by [`KeyBindingTable::suspend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuspendedBinding {
    /// Layer the binding was taken from.
    pub layer: String,
    /// The suspended keystroke.
    pub key: KeyStroke,
    /// The command it was bound to.
    pub command: CommandName,
}

// ─── KeyBindingTable ────────────────────────────────────────────────────────

/// Registry of named layers with one active layer.
#[derive(Debug, Default)]
pub struct KeyBindingTable {
    layers: HashMap<String, Layer>,
    /// Name of the effective layer. `None` until the first `activate`.
    active: Option<String>,
    /// Previously active layers, most recent last.
    saved: Vec<Option<String>>,
    suspended: HashMap<KeyStroke, SuspendedBinding>,
}

impl KeyBindingTable {
    /// Create an empty table with no layers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `map` as layer `name`, optionally overlaid on `base`.
    ///
    /// Without a base the layer is stored as-is (replacing any layer of
    /// the same name) and `name` is returned. With a base, see the module
    /// docs; the returned name is `"{base}_{name}"`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyLayerName`] if `name` is empty.
    /// - [`Error::UnknownLayer`] if `base` names a layer that doesn't exist.
    pub fn install(&mut self, map: Layer, name: &str, base: Option<&str>) -> Result<String> {
        if name.is_empty() {
            return Err(Error::EmptyLayerName);
        }

        let Some(base_name) = base else {
            debug!(layer = name, bindings = map.len(), "installed keymap layer");
            self.layers.insert(name.to_string(), map);
            return Ok(name.to_string());
        };

        let mut overlay = self
            .layers
            .get(base_name)
            .cloned()
            .ok_or_else(|| Error::UnknownLayer(base_name.to_string()))?;

        overlay.bindings.retain(|key, _| !map.contains(key));
        if !overlay.fallthrough.iter().any(|f| f == name) {
            overlay.fallthrough.insert(0, name.to_string());
        }

        let composite = format!("{base_name}_{name}");
        debug!(
            layer = name,
            base = base_name,
            composite = %composite,
            bindings = map.len(),
            "installed keymap layer over base"
        );
        self.layers.insert(name.to_string(), map);
        self.layers.insert(composite.clone(), overlay);
        Ok(composite)
    }

    /// Make `name` the effective layer, saving the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLayer`] if no such layer was installed.
    pub fn activate(&mut self, name: &str) -> Result<()> {
        if !self.layers.contains_key(name) {
            return Err(Error::UnknownLayer(name.to_string()));
        }
        let previous = self.active.replace(name.to_string());
        debug!(layer = name, previous = ?previous, "activated keymap layer");
        self.saved.push(previous);
        Ok(())
    }

    /// Reinstate the layer that was active before the last [`activate`].
    ///
    /// Returns the reinstated layer name. With nothing saved the active
    /// layer is left alone and `None` is returned.
    ///
    /// [`activate`]: Self::activate
    pub fn deactivate(&mut self) -> Option<String> {
        let previous = self.saved.pop()?;
        debug!(layer = ?previous, "deactivated keymap layer");
        self.active.clone_from(&previous);
        previous
    }

    /// Name of the effective layer.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// A layer by name.
    #[must_use]
    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// Resolve `key` through the active layer and its fallthrough chain.
    #[must_use]
    pub fn lookup(&self, key: &KeyStroke) -> Option<&CommandName> {
        let layer = self.relevant_layer(key)?;
        let command = self.layers.get(layer)?.get(key);
        trace!(%key, layer, command = ?command, "keymap lookup");
        command
    }

    /// Bind `key` in whichever layer currently defines it, or in the active
    /// layer if none does. Returns the replaced command.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveLayer`] before any layer is activated.
    pub fn bind(&mut self, key: KeyStroke, command: impl Into<CommandName>) -> Result<Option<CommandName>> {
        let target = match self.relevant_layer(&key) {
            Some(layer) => layer.to_string(),
            None => self.active.clone().ok_or(Error::NoActiveLayer)?,
        };
        let layer = self
            .layers
            .get_mut(&target)
            .ok_or_else(|| Error::UnknownLayer(target.clone()))?;
        Ok(layer.bind(key, command))
    }

    /// Delete the binding for `key` from the layer that defines it.
    /// Unbound keys are a no-op.
    pub fn unbind(&mut self, key: &KeyStroke) -> Option<CommandName> {
        let target = self.relevant_layer(key)?.to_string();
        self.layers.get_mut(&target)?.unbind(key)
    }

    /// Temporarily remove the binding for `key`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadySuspended`] if `key` is suspended and not yet restored.
    /// - [`Error::UnboundKey`] if no reachable layer binds `key`.
    pub fn suspend(&mut self, key: &KeyStroke) -> Result<()> {
        if self.suspended.contains_key(key) {
            return Err(Error::AlreadySuspended(*key));
        }
        let layer = self
            .relevant_layer(key)
            .ok_or(Error::UnboundKey(*key))?
            .to_string();
        let command = self
            .layers
            .get_mut(&layer)
            .and_then(|l| l.unbind(key))
            .ok_or(Error::UnboundKey(*key))?;

        debug!(%key, layer = %layer, command = %command, "suspended binding");
        self.suspended.insert(
            *key,
            SuspendedBinding {
                layer,
                key: *key,
                command,
            },
        );
        Ok(())
    }

    /// Put back a binding removed by [`suspend`](Self::suspend).
    ///
    /// # Errors
    ///
    /// - [`Error::NotSuspended`] if `key` has no pending suspension.
    /// - [`Error::UnknownLayer`] if its layer has since disappeared.
    pub fn restore(&mut self, key: &KeyStroke) -> Result<()> {
        let saved = self.suspended.remove(key).ok_or(Error::NotSuspended(*key))?;
        let layer = self
            .layers
            .get_mut(&saved.layer)
            .ok_or_else(|| Error::UnknownLayer(saved.layer.clone()))?;
        debug!(%key, layer = %saved.layer, command = %saved.command, "restored binding");
        layer.bind(saved.key, saved.command);
        Ok(())
    }

    /// Restore every suspended binding. Returns how many were restored.
    pub fn restore_all(&mut self) -> usize {
        let keys: Vec<KeyStroke> = self.suspended.keys().copied().collect();
        keys.iter().filter(|key| self.restore(key).is_ok()).count()
    }

    /// True while `key` is suspended.
    #[must_use]
    pub fn is_suspended(&self, key: &KeyStroke) -> bool {
        self.suspended.contains_key(key)
    }

    /// Name of the layer that defines `key`, searching the active layer and
    /// then its fallthrough chain depth-first.
    fn relevant_layer(&self, key: &KeyStroke) -> Option<&str> {
        let active = self.active.as_deref()?;
        let mut visited = Vec::new();
        self.find_defining(active, key, &mut visited)
    }

    fn find_defining<'a>(
        &'a self,
        name: &'a str,
        key: &KeyStroke,
        visited: &mut Vec<&'a str>,
    ) -> Option<&'a str> {
        // Fallthrough lists can form cycles; each layer is checked once.
        if visited.contains(&name) {
            return None;
        }
        visited.push(name);

        let layer = self.layers.get(name)?;
        if layer.contains(key) {
            return Some(name);
        }
        layer
            .fallthrough
            .iter()
            .find_map(|next| self.find_defining(next, key, visited))
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

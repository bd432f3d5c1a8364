//! Simulated environment for tests and non-browser embedding.
//!
//! DESIGN
//! ======
//! `MemoryPlatform` is a cheap handle over shared state: clones see the same
//! storage, attributes and listeners. Keep one clone to drive the simulated
//! system theme while a controller owns another, or hand a clone to a second
//! controller to model a page reload against the same storage.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::platform::{ListenerSet, Platform, ThemeListener};
use crate::preference::ResolvedTheme;

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

#[derive(Default)]
struct MemoryState {
    unavailable: bool,
    refuse_subscriptions: Cell<bool>,
    storage: RefCell<HashMap<String, String>>,
    attributes: RefCell<HashMap<String, String>>,
    system: Cell<ResolvedTheme>,
    listeners: ListenerSet,
    storage_writes: Cell<usize>,
    attribute_writes: Cell<usize>,
}

/// In-memory [`Platform`] with a controllable color-scheme signal.
#[derive(Clone, Default)]
pub struct MemoryPlatform {
    state: Rc<MemoryState>,
}

impl fmt::Debug for MemoryPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryPlatform")
            .field("available", &!self.state.unavailable)
            .field("system", &self.state.system.get())
            .field("storage", &self.state.storage.borrow())
            .field("attributes", &self.state.attributes.borrow())
            .field("listeners", &self.state.listeners.len())
            .finish()
    }
}

impl MemoryPlatform {
    /// An available environment with empty storage and a light system theme.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// An environment that reports itself unavailable.
    ///
    /// Its storage and attribute maps still exist so tests can assert they
    /// were never written.
    #[must_use]
    pub fn unavailable() -> Self {
        Self {
            state: Rc::new(MemoryState {
                unavailable: true,
                ..MemoryState::default()
            }),
        }
    }

    /// Set the initial system theme without notifying listeners.
    #[must_use]
    pub fn with_system_theme(self, theme: ResolvedTheme) -> Self {
        self.state.system.set(theme);
        self
    }

    /// Seed storage with a raw value, bypassing the write counter.
    #[must_use]
    pub fn with_stored(self, key: &str, value: &str) -> Self {
        self.state
            .storage
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self
    }

    /// Make later change subscriptions fail, as when `matchMedia` is
    /// missing or listener registration throws.
    pub fn set_refuse_subscriptions(&self, refuse: bool) {
        self.state.refuse_subscriptions.set(refuse);
    }

    /// Change the simulated system theme.
    ///
    /// Listeners are notified only when the value actually changes, matching
    /// how a media query fires `change`.
    pub fn set_system_theme(&self, theme: ResolvedTheme) {
        if self.state.system.replace(theme) == theme {
            return;
        }
        self.state.listeners.notify();
    }

    /// Raw stored value for `key`.
    #[must_use]
    pub fn stored(&self, key: &str) -> Option<String> {
        self.state.storage.borrow().get(key).cloned()
    }

    /// Current value of root attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.state.attributes.borrow().get(name).cloned()
    }

    /// Number of storage writes performed through [`Platform`].
    #[must_use]
    pub fn storage_writes(&self) -> usize {
        self.state.storage_writes.get()
    }

    /// Number of attribute writes performed through [`Platform`].
    #[must_use]
    pub fn attribute_writes(&self) -> usize {
        self.state.attribute_writes.get()
    }

    /// Number of registered change listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.state.listeners.len()
    }
}

impl Platform for MemoryPlatform {
    fn is_available(&self) -> bool {
        !self.state.unavailable
    }

    fn read_preference(&self, key: &str) -> Option<String> {
        self.stored(key)
    }

    fn write_preference(&self, key: &str, value: &str) {
        self.state
            .storage
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        self.state.storage_writes.set(self.state.storage_writes.get() + 1);
    }

    fn system_theme(&self) -> ResolvedTheme {
        self.state.system.get()
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        self.state
            .attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
        self.state
            .attribute_writes
            .set(self.state.attribute_writes.get() + 1);
    }

    fn subscribe_theme_changes(&self, listener: ThemeListener) -> bool {
        if self.state.refuse_subscriptions.get() {
            return false;
        }
        self.state.listeners.push(listener);
        true
    }
}

//! Capability interface between the theme controller and its environment.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller never touches storage, the document or the color-scheme
//! signal directly. Everything goes through a [`Platform`], so the same
//! controller runs in the browser, on the desktop, during server rendering
//! ([`Headless`]) and in tests ([`crate::memory::MemoryPlatform`]).
//!
//! TRADE-OFFS
//! ==========
//! Methods are infallible. Implementations log environment failures and
//! carry on; the theme layer is never worth surfacing an error to a page.

use std::cell::RefCell;

use crate::preference::ResolvedTheme;

#[cfg(test)]
#[path = "platform_test.rs"]
mod platform_test;

/// Callback invoked when the environment's color scheme changes.
pub type ThemeListener = Box<dyn FnMut()>;

/// Storage, document and color-scheme access for a theme controller.
///
/// All methods take `&self`; implementations are single-threaded and use
/// interior mutability where they hold state.
pub trait Platform {
    /// Whether a browser-like environment is present at all.
    ///
    /// When this returns `false` the controller calls nothing else.
    fn is_available(&self) -> bool;

    /// Read the raw persisted value for `key`.
    fn read_preference(&self, key: &str) -> Option<String>;

    /// Persist `value` under `key`.
    fn write_preference(&self, key: &str, value: &str);

    /// The environment's current color scheme.
    fn system_theme(&self) -> ResolvedTheme;

    /// Set attribute `name` on the document root element.
    fn set_root_attribute(&self, name: &str, value: &str);

    /// Register `listener` for color-scheme change notifications.
    ///
    /// Returns whether the registration was accepted. Accepted registrations
    /// last for the lifetime of the platform; a refused listener is dropped.
    fn subscribe_theme_changes(&self, listener: ThemeListener) -> bool;
}

/// Registered change listeners for platforms that dispatch notifications
/// themselves rather than through a host event loop.
#[derive(Default)]
pub(crate) struct ListenerSet {
    listeners: RefCell<Vec<ThemeListener>>,
}

impl ListenerSet {
    pub(crate) fn push(&self, listener: ThemeListener) {
        self.listeners.borrow_mut().push(listener);
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Call every listener once.
    ///
    /// The list is taken out for the duration of the dispatch, so a listener
    /// may subscribe again without tripping the `RefCell`. Such additions are
    /// kept but not called until the next dispatch.
    pub(crate) fn notify(&self) {
        let mut running = std::mem::take(&mut *self.listeners.borrow_mut());
        for listener in &mut running {
            listener();
        }
        let mut slot = self.listeners.borrow_mut();
        running.append(&mut *slot);
        *slot = running;
    }
}

/// Platform for contexts with no environment, e.g. server-side rendering.
#[derive(Clone, Copy, Debug, Default)]
pub struct Headless;

impl Platform for Headless {
    fn is_available(&self) -> bool {
        false
    }

    fn read_preference(&self, _key: &str) -> Option<String> {
        None
    }

    fn write_preference(&self, _key: &str, _value: &str) {}

    fn system_theme(&self) -> ResolvedTheme {
        ResolvedTheme::Light
    }

    fn set_root_attribute(&self, _name: &str, _value: &str) {}

    fn subscribe_theme_changes(&self, _listener: ThemeListener) -> bool {
        false
    }
}

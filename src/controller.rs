//! Theme preference state and its application to the document.
//!
//! DESIGN
//! ======
//! `ThemeController` owns the user's [`Preference`] and derives the
//! [`ResolvedTheme`] on demand from the preference and the platform's current
//! color scheme. Every mutation, and every color-scheme notification while
//! the preference is `system`, ends in one explicit reapply step that writes
//! the document attribute.
//!
//! The controller is a cheap clonable handle, meant to be created once per
//! page and passed through the UI layer's context. All handles share state.
//!
//! TRADE-OFFS
//! ==========
//! Nothing here returns an error. An unavailable platform short-circuits
//! every side effect, and an unreadable stored value loads as `system`.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::config::ThemeConfig;
use crate::platform::Platform;
use crate::preference::{Preference, ResolvedTheme};

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

struct Shared<P> {
    platform: P,
    config: ThemeConfig,
    preference: Cell<Preference>,
    subscribed: Cell<bool>,
}

impl<P: Platform> Shared<P> {
    fn system_theme(&self) -> ResolvedTheme {
        if self.platform.is_available() {
            self.platform.system_theme()
        } else {
            ResolvedTheme::Light
        }
    }

    fn resolved(&self) -> ResolvedTheme {
        self.preference.get().resolve(self.system_theme())
    }

    fn apply(&self) {
        if !self.platform.is_available() {
            return;
        }
        let theme = self.resolved();
        tracing::debug!(
            preference = %self.preference.get(),
            theme = %theme,
            attribute = %self.config.attribute,
            "applying theme"
        );
        self.platform
            .set_root_attribute(&self.config.attribute, theme.as_str());
    }
}

/// Owner of the theme preference for one page session.
pub struct ThemeController<P: Platform + 'static> {
    shared: Rc<Shared<P>>,
}

impl<P: Platform + 'static> Clone for ThemeController<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<P: Platform + 'static> fmt::Debug for ThemeController<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThemeController")
            .field("preference", &self.shared.preference.get())
            .field("resolved", &self.shared.resolved())
            .field("subscribed", &self.shared.subscribed.get())
            .finish_non_exhaustive()
    }
}

impl<P: Platform + 'static> ThemeController<P> {
    /// Load with the default hashprep config.
    #[must_use]
    pub fn new(platform: P) -> Self {
        Self::load(platform, ThemeConfig::default())
    }

    /// Load the persisted preference from `platform`.
    ///
    /// Falls back to [`Preference::System`] when the platform is unavailable,
    /// nothing is stored, or the stored value is not a known preference.
    /// Does not touch the document; call [`Self::init`] for that.
    #[must_use]
    pub fn load(platform: P, config: ThemeConfig) -> Self {
        let preference = stored_preference(&platform, &config.storage_key);
        tracing::debug!(%preference, key = %config.storage_key, "loaded theme preference");
        Self {
            shared: Rc::new(Shared {
                platform,
                config,
                preference: Cell::new(preference),
                subscribed: Cell::new(false),
            }),
        }
    }

    /// The user's stated preference.
    #[must_use]
    pub fn preference(&self) -> Preference {
        self.shared.preference.get()
    }

    /// The theme currently in effect.
    #[must_use]
    pub fn resolved(&self) -> ResolvedTheme {
        self.shared.resolved()
    }

    /// The platform this controller drives.
    #[must_use]
    pub fn platform(&self) -> &P {
        &self.shared.platform
    }

    #[must_use]
    pub fn config(&self) -> &ThemeConfig {
        &self.shared.config
    }

    /// Record a new preference, persist it and reapply the theme.
    ///
    /// Calling again with the same value rewrites the same stored value and
    /// attribute.
    pub fn set_preference(&self, preference: Preference) {
        self.shared.preference.set(preference);
        let platform = &self.shared.platform;
        if !platform.is_available() {
            return;
        }
        platform.write_preference(&self.shared.config.storage_key, preference.as_str());
        self.shared.apply();
    }

    /// Switch to the opposite of the resolved theme and return it.
    ///
    /// Always leaves an explicit `light` or `dark` preference behind.
    #[must_use = "toggle returns the theme now in effect"]
    pub fn toggle(&self) -> ResolvedTheme {
        let next = self.resolved().opposite();
        self.set_preference(next.into());
        next
    }

    /// Apply the current theme and follow color-scheme changes.
    ///
    /// Run once at startup, before first paint. Later calls reapply, and
    /// subscribe only if no earlier registration was accepted. The
    /// subscription holds only a weak reference, so it goes quiet once every
    /// controller handle is dropped.
    pub fn init(&self) {
        if !self.shared.platform.is_available() {
            tracing::debug!("no theme environment; skipping init");
            return;
        }
        self.shared.apply();
        if self.shared.subscribed.get() {
            return;
        }

        let weak: Weak<Shared<P>> = Rc::downgrade(&self.shared);
        let accepted = self
            .shared
            .platform
            .subscribe_theme_changes(Box::new(move || {
                let Some(shared) = weak.upgrade() else {
                    return;
                };
                if shared.preference.get() == Preference::System {
                    shared.apply();
                }
            }));
        if !accepted {
            tracing::debug!("theme change subscription refused; will retry on next init");
        }
        self.shared.subscribed.set(accepted);
    }
}

fn stored_preference<P: Platform>(platform: &P, key: &str) -> Preference {
    if !platform.is_available() {
        return Preference::System;
    }
    let Some(raw) = platform.read_preference(key) else {
        return Preference::System;
    };
    match raw.parse() {
        Ok(preference) => preference,
        Err(e) => {
            tracing::warn!(error = %e, %key, "ignoring stored theme preference");
            Preference::System
        }
    }
}

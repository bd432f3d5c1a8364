//! Browser platform: `localStorage`, `<html>` attributes and `matchMedia`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Only compiled with the `hydrate` feature. Server-rendered builds use
//! [`crate::platform::Headless`] instead, so SSR paths stay deterministic.

use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{MediaQueryList, Storage, Window};

use crate::config::ThemeConfig;
use crate::controller::ThemeController;
use crate::platform::{Platform, ThemeListener};
use crate::preference::ResolvedTheme;

/// [`Platform`] backed by the current browser window.
#[derive(Clone, Debug)]
pub struct BrowserPlatform {
    media_query: String,
}

impl BrowserPlatform {
    #[must_use]
    pub fn new(media_query: impl Into<String>) -> Self {
        Self {
            media_query: media_query.into(),
        }
    }

    /// Load a controller for this window using `config`.
    #[must_use]
    pub fn controller(config: ThemeConfig) -> ThemeController<Self> {
        let platform = Self::new(config.media_query.clone());
        ThemeController::load(platform, config)
    }

    fn window() -> Option<Window> {
        web_sys::window()
    }

    fn storage() -> Option<Storage> {
        let window = Self::window()?;
        match window.local_storage() {
            Ok(storage) => storage,
            Err(err) => {
                tracing::warn!(?err, "localStorage unavailable");
                None
            }
        }
    }

    fn media(&self) -> Option<MediaQueryList> {
        let window = Self::window()?;
        match window.match_media(&self.media_query) {
            Ok(mq) => mq,
            Err(err) => {
                tracing::warn!(?err, query = %self.media_query, "matchMedia failed");
                None
            }
        }
    }
}

impl Default for BrowserPlatform {
    fn default() -> Self {
        Self::new(ThemeConfig::default().media_query)
    }
}

impl Platform for BrowserPlatform {
    fn is_available(&self) -> bool {
        Self::window().is_some_and(|w| w.document().is_some())
    }

    fn read_preference(&self, key: &str) -> Option<String> {
        match Self::storage()?.get_item(key) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(?err, %key, "localStorage read failed");
                None
            }
        }
    }

    fn write_preference(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            return;
        };
        if let Err(err) = storage.set_item(key, value) {
            tracing::warn!(?err, %key, "localStorage write failed");
        }
    }

    fn system_theme(&self) -> ResolvedTheme {
        ResolvedTheme::from_prefers_dark(self.media().is_some_and(|mq| mq.matches()))
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        let Some(root) = Self::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element())
        else {
            return;
        };
        if let Err(err) = root.set_attribute(name, value) {
            tracing::warn!(?err, %name, "setAttribute failed");
        }
    }

    fn subscribe_theme_changes(&self, listener: ThemeListener) -> bool {
        let Some(mq) = self.media() else {
            return false;
        };
        let cb = Closure::wrap(listener);
        match mq.add_event_listener_with_callback("change", cb.as_ref().unchecked_ref()) {
            Ok(()) => {
                // The listener lives as long as the page.
                cb.forget();
                true
            }
            Err(err) => {
                tracing::warn!(?err, "media query listener registration failed");
                false
            }
        }
    }
}

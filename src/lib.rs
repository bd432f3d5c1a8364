//! # hashprep-theme
//!
//! Light/dark/system theme preference for the hashprep front end.
//!
//! A [`ThemeController`] owns the user's [`Preference`], derives the
//! [`ResolvedTheme`] from it and the environment's color scheme, persists the
//! preference and writes the resolved theme to the document root's
//! `data-theme` attribute. The environment is reached only through a
//! [`Platform`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`preference`] | `Preference` and `ResolvedTheme` values |
//! | [`controller`] | `ThemeController` state and operations |
//! | [`platform`] | `Platform` capability trait and the `Headless` no-op |
//! | [`memory`] | `MemoryPlatform`, a simulated environment |
//! | [`config`] | Storage key, attribute and media query names |
//! | `browser` | `BrowserPlatform` over web-sys (feature `hydrate`) |
//! | `native` | `NativePlatform` over a JSON file and `dark-light` (feature `native`) |
//!
//! ```
//! use hashprep_theme::{MemoryPlatform, Preference, ResolvedTheme, ThemeController};
//!
//! let env = MemoryPlatform::new().with_system_theme(ResolvedTheme::Dark);
//! let theme = ThemeController::new(env.clone());
//! theme.init();
//! assert_eq!(env.attribute("data-theme").as_deref(), Some("dark"));
//!
//! theme.set_preference(Preference::Light);
//! assert_eq!(env.stored("hashprep-theme").as_deref(), Some("light"));
//! ```

pub mod config;
pub mod controller;
pub mod memory;
pub mod platform;
pub mod preference;

#[cfg(feature = "hydrate")]
pub mod browser;
#[cfg(feature = "native")]
pub mod native;

pub use config::ThemeConfig;
pub use controller::ThemeController;
pub use memory::MemoryPlatform;
pub use platform::{Headless, Platform, ThemeListener};
pub use preference::{ParsePreferenceError, ParseThemeError, Preference, ResolvedTheme};

#[cfg(feature = "hydrate")]
pub use browser::BrowserPlatform;
#[cfg(feature = "native")]
pub use native::{FileStore, NativePlatform, StoreError};

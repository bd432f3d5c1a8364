//! Desktop platform: JSON file storage and OS color-scheme detection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Desktop tools have no document and no push notification for the OS
//! theme. `NativePlatform` keeps root attributes in memory for the caller to
//! read back, and turns periodic [`NativePlatform::poll`] calls into change
//! notifications.
//!
//! The system theme is cached between polls, so a resolved theme read in
//! between never races ahead of the notification for the same change.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::platform::{ListenerSet, Platform, ThemeListener};
use crate::preference::ResolvedTheme;

#[cfg(test)]
#[path = "native_test.rs"]
mod native_test;

/// Error from reading or writing a [`FileStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
    #[error("invalid store file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A JSON object of string keys to string values in a single file.
///
/// A missing or blank file reads as an empty store.
#[derive(Clone, Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Read`] for I/O failures other than a missing
    /// file, and [`StoreError::Parse`] when the file is not a JSON object of
    /// strings.
    pub fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    /// Read one entry.
    ///
    /// # Errors
    ///
    /// See [`FileStore::load`].
    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    /// Write one entry, keeping the others. Creates parent directories.
    ///
    /// The file is replaced atomically, so a concurrent reader sees either
    /// the old entries or the new ones.
    ///
    /// # Errors
    ///
    /// Propagates load errors, so an unparsable file is never overwritten.
    /// Returns [`StoreError::Write`] when the file or its directory cannot be
    /// written.
    pub fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());

        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(write_err)?;
                parent
            }
            None => Path::new("."),
        };
        let raw = serde_json::to_string_pretty(&entries).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        // Stage in the same directory so the rename never crosses filesystems.
        let mut staged = NamedTempFile::new_in(dir).map_err(write_err)?;
        staged.write_all(raw.as_bytes()).map_err(write_err)?;
        staged.as_file().sync_all().map_err(write_err)?;
        staged.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

/// Source of the OS color scheme.
pub type ThemeDetector = fn() -> ResolvedTheme;

/// Ask the OS for its color scheme through `dark-light`.
///
/// An unspecified or undetectable scheme counts as light.
#[must_use]
pub fn detect_os_theme() -> ResolvedTheme {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => ResolvedTheme::Dark,
        Ok(dark_light::Mode::Light | dark_light::Mode::Unspecified) => ResolvedTheme::Light,
        Err(e) => {
            tracing::warn!(error = ?e, "OS theme detection failed; assuming light");
            ResolvedTheme::Light
        }
    }
}

/// [`Platform`] for desktop processes.
pub struct NativePlatform {
    store: FileStore,
    detector: ThemeDetector,
    system: Cell<ResolvedTheme>,
    attributes: RefCell<BTreeMap<String, String>>,
    listeners: ListenerSet,
}

impl fmt::Debug for NativePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativePlatform")
            .field("store", &self.store.path)
            .field("system", &self.system.get())
            .field("attributes", &self.attributes.borrow())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl NativePlatform {
    /// Platform over the store file at `path`, detecting the OS theme.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::with_detector(path, detect_os_theme)
    }

    /// Platform with a custom theme detector.
    pub fn with_detector(path: impl Into<PathBuf>, detector: ThemeDetector) -> Self {
        Self {
            store: FileStore::new(path),
            detector,
            system: Cell::new(detector()),
            attributes: RefCell::new(BTreeMap::new()),
            listeners: ListenerSet::default(),
        }
    }

    #[must_use]
    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Current value of root attribute `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }

    /// Re-detect the OS theme and notify listeners if it changed.
    ///
    /// Returns whether it changed.
    pub fn poll(&self) -> bool {
        let theme = (self.detector)();
        if self.system.replace(theme) == theme {
            return false;
        }
        tracing::debug!(%theme, "OS theme changed");
        self.listeners.notify();
        true
    }
}

impl Platform for NativePlatform {
    fn is_available(&self) -> bool {
        true
    }

    fn read_preference(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(error = %e, %key, "theme store read failed");
                None
            }
        }
    }

    fn write_preference(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(error = %e, %key, "theme store write failed");
        }
    }

    fn system_theme(&self) -> ResolvedTheme {
        self.system.get()
    }

    fn set_root_attribute(&self, name: &str, value: &str) {
        self.attributes
            .borrow_mut()
            .insert(name.to_owned(), value.to_owned());
    }

    fn subscribe_theme_changes(&self, listener: ThemeListener) -> bool {
        self.listeners.push(listener);
        true
    }
}

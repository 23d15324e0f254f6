//! Persistent key-value settings.
//!
//! The host editor remembers a handful of values between OCR requests:
//! the configured engine path, default language and preprocessing flags,
//! and the last-used language/output mode. The store is a flat
//! string-to-string map behind the [`SettingsStore`] trait so hosts can
//! plug in their own persistence. Writes are last-writer-wins; a store
//! that cannot be read degrades to built-in defaults and never fails an
//! OCR request on its own.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Well-known settings keys.
pub mod keys {
    pub const ENGINE_PATH: &str = "engine_path";
    pub const DEFAULT_LANGUAGE: &str = "default_language";
    pub const DEFAULT_GRAYSCALE: &str = "default_grayscale";
    pub const DEFAULT_BINARIZE: &str = "default_binarize";
    pub const LAST_LANGUAGE: &str = "last_language";
    pub const LAST_OUTPUT_MODE: &str = "last_output_mode";
}

pub trait SettingsStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Stores a value. Returns false when the value could not be
    /// persisted; the in-memory view is updated either way.
    fn set(&mut self, key: &str, value: &str) -> bool;

    fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }
}

/// Volatile store for tests and hosts without persistence.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }
}

/// JSON-file-backed store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: HashMap<String, String>,
}

impl JsonFileStore {
    /// Opens the store at `path`. A missing, unreadable, or corrupt file
    /// starts the store empty with a warning; it is not an error.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = Self::load(&path);
        Self { path, values }
    }

    /// Re-reads the file, discarding the in-memory view.
    pub fn refresh(&mut self) {
        self.values = Self::load(&self.path);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> HashMap<String, String> {
        match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(e) => {
                    warn!(
                        "settings file {} is not valid JSON ({e}); starting with defaults",
                        path.display()
                    );
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!(
                    "settings file {} could not be read ({e}); starting with defaults",
                    path.display()
                );
                HashMap::new()
            }
        }
    }

    fn persist(&self) -> bool {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!("could not create settings directory {}: {e}", parent.display());
                return false;
            }
        }
        let raw = match serde_json::to_string_pretty(&self.values) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("could not serialize settings: {e}");
                return false;
            }
        };
        match fs::write(&self.path, raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("could not write settings file {}: {e}", self.path.display());
                false
            }
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        let persisted = self.persist();
        if persisted {
            debug!(key, "setting stored");
        }
        persisted
    }
}

/// Typed accessors over a [`SettingsStore`].
pub struct Settings<S: SettingsStore> {
    store: S,
}

impl<S: SettingsStore> Settings<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn engine_path(&self) -> String {
        self.store.get_or(keys::ENGINE_PATH, "")
    }

    pub fn set_engine_path(&mut self, path: &str) -> bool {
        self.store.set(keys::ENGINE_PATH, path)
    }

    pub fn default_language(&self) -> String {
        self.store
            .get_or(keys::DEFAULT_LANGUAGE, crate::config::DEFAULT_LANGUAGE)
    }

    pub fn default_grayscale(&self) -> bool {
        self.store.get_or(keys::DEFAULT_GRAYSCALE, "false") == "true"
    }

    pub fn default_binarize(&self) -> bool {
        self.store.get_or(keys::DEFAULT_BINARIZE, "false") == "true"
    }

    pub fn last_language(&self) -> Option<String> {
        self.store.get(keys::LAST_LANGUAGE)
    }

    pub fn set_last_language(&mut self, language: &str) -> bool {
        self.store.set(keys::LAST_LANGUAGE, language)
    }

    pub fn last_output_mode(&self) -> Option<String> {
        self.store.get(keys::LAST_OUTPUT_MODE)
    }

    pub fn set_last_output_mode(&mut self, mode: &str) -> bool {
        self.store.set(keys::LAST_OUTPUT_MODE, mode)
    }
}

//! Registry persistence backends
//!
//! Provides the [`RegistryStore`] trait plus a JSON file-based
//! implementation and an in-memory implementation for tests. A store holds
//! one durable document per model name; readers after a crash must see the
//! last fully committed save and never a partial write.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::RegistryState;

/// Errors from registry persistence.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Trait for registry storage backends.
///
/// `save` must be all-or-nothing: a crash mid-save leaves the previously
/// committed document readable.
pub trait RegistryStore: Send + Sync {
    /// Load the state for a model name, or `None` if never saved.
    fn load(&self, model_name: &str) -> Result<Option<RegistryState>>;

    /// Durably replace the state for a model name.
    fn save(&self, model_name: &str, state: &RegistryState) -> Result<()>;

    /// List every model name with a saved document, sorted.
    fn list_models(&self) -> Result<Vec<String>>;
}

impl<T: RegistryStore + ?Sized> RegistryStore for std::sync::Arc<T> {
    fn load(&self, model_name: &str) -> Result<Option<RegistryState>> {
        (**self).load(model_name)
    }

    fn save(&self, model_name: &str, state: &RegistryState) -> Result<()> {
        (**self).save(model_name, state)
    }

    fn list_models(&self) -> Result<Vec<String>> {
        (**self).list_models()
    }
}

/// JSON file-based registry store.
///
/// Stores each model's state as `{model_name}.json` in a directory. Saves
/// write to a temporary file in the same directory and then rename it over
/// the target, so a crash never exposes a partially written document.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Create a new store rooted at the given directory.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    fn model_path(&self, model_name: &str) -> PathBuf {
        self.dir.join(format!("{model_name}.json"))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir)?;
        }
        Ok(())
    }
}

impl RegistryStore for JsonFileStore {
    fn load(&self, model_name: &str) -> Result<Option<RegistryState>> {
        let path = self.model_path(model_name);
        if !path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(path)?;
        let state: RegistryState = serde_json::from_str(&json)?;
        Ok(Some(state))
    }

    fn save(&self, model_name: &str, state: &RegistryState) -> Result<()> {
        self.ensure_dir()?;
        let json = serde_json::to_string_pretty(state)?;
        let path = self.model_path(model_name);
        let tmp = self.dir.join(format!("{model_name}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }

    fn list_models(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut models = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    models.push(stem.to_string());
                }
            }
        }
        models.sort();
        Ok(models)
    }
}

/// In-memory registry store for testing.
///
/// Documents are kept as serialized JSON so tests exercise the same
/// serialization path as the file store. No persistence across processes.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    documents: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RegistryStore for InMemoryStore {
    fn load(&self, model_name: &str) -> Result<Option<RegistryState>> {
        let documents = self.documents.lock().expect("store lock poisoned");
        match documents.get(model_name) {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, model_name: &str, state: &RegistryState) -> Result<()> {
        let json = serde_json::to_string(state)?;
        self.documents
            .lock()
            .expect("store lock poisoned")
            .insert(model_name.to_string(), json);
        Ok(())
    }

    fn list_models(&self) -> Result<Vec<String>> {
        let documents = self.documents.lock().expect("store lock poisoned");
        let mut models: Vec<String> = documents.keys().cloned().collect();
        models.sort();
        Ok(models)
    }
}

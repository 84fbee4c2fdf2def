//! Tab storage - key/value persistence scoped to one tab
//!
//! Nothing here is shared between tabs: each `MemoryTabStorage` is its own map
//! and each `FileTabStorage` owns exactly one file named after its tab id.

use crate::{ClientError, ClientResult};
use grievance_core::storage_error;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Key/value storage scoped to a single tab
pub trait TabStorage: Send + Sync {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> ClientResult<()>;

    fn remove_item(&self, key: &str) -> ClientResult<()>;

    /// Remove every key
    fn clear(&self) -> ClientResult<()>;

    /// Write several keys at once
    fn set_items(&self, items: &[(&str, &str)]) -> ClientResult<()> {
        for (key, value) in items {
            self.set_item(key, value)?;
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> ClientError {
    ClientError::storage("tab storage lock poisoned")
}

/// In-process storage; lives and dies with the owning tab
#[derive(Debug, Default)]
pub struct MemoryTabStorage {
    items: RwLock<BTreeMap<String, String>>,
}

impl MemoryTabStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.items.read().map(|items| items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TabStorage for MemoryTabStorage {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>> {
        let items = self.items.read().map_err(poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> ClientResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> ClientResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.remove(key);
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut items = self.items.write().map_err(poisoned)?;
        items.clear();
        Ok(())
    }
}

/// File-backed storage for one tab id.
///
/// Used where every action is a separate process (the CLI). The default
/// directory sits under the OS temp dir, so sessions do not survive a reboot.
#[derive(Debug)]
pub struct FileTabStorage {
    tab_id: String,
    file: PathBuf,
    // Serializes read-modify-write cycles within this process
    lock: RwLock<()>,
}

impl FileTabStorage {
    /// Open storage for `tab_id` under `dir`, creating the directory if needed
    pub fn new<P: AsRef<Path>>(dir: P, tab_id: &str) -> ClientResult<Self> {
        if tab_id.is_empty()
            || !tab_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ClientError::validation(
                "tab",
                format!(
                    "Tab id '{}' may only contain letters, digits, '-' and '_'",
                    tab_id
                ),
            ));
        }

        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|e| {
            storage_error!(
                format!("Failed to create session directory {}", dir.display()),
                "tab_storage",
                e
            )
        })?;

        let file = dir.join(format!("{}.json", tab_id));
        debug!("Tab storage for '{}' at: {}", tab_id, file.display());

        Ok(Self {
            tab_id: tab_id.to_string(),
            file,
            lock: RwLock::new(()),
        })
    }

    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn path(&self) -> &Path {
        &self.file
    }

    fn load(&self) -> ClientResult<BTreeMap<String, String>> {
        if !self.file.exists() {
            return Ok(BTreeMap::new());
        }
        let json_data = std::fs::read_to_string(&self.file)
            .map_err(|e| storage_error!("Failed to read tab file", "tab_storage", e))?;
        let items = serde_json::from_str(&json_data)
            .map_err(|e| storage_error!("Tab file is not valid JSON", "tab_storage", e))?;
        Ok(items)
    }

    fn save(&self, items: &BTreeMap<String, String>) -> ClientResult<()> {
        if items.is_empty() {
            return self.remove_file();
        }
        let json_data = serde_json::to_string_pretty(items)
            .map_err(|e| storage_error!("Failed to encode tab data", "tab_storage", e))?;
        std::fs::write(&self.file, json_data)
            .map_err(|e| storage_error!("Failed to write tab file", "tab_storage", e))?;
        debug!("Saved tab '{}' to {}", self.tab_id, self.file.display());
        Ok(())
    }

    fn remove_file(&self) -> ClientResult<()> {
        if self.file.exists() {
            std::fs::remove_file(&self.file)
                .map_err(|e| storage_error!("Failed to delete tab file", "tab_storage", e))?;
            debug!("Deleted tab file: {}", self.file.display());
        }
        Ok(())
    }

    fn update<F>(&self, f: F) -> ClientResult<()>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let _guard = self.lock.write().map_err(poisoned)?;
        let mut items = self.load()?;
        f(&mut items);
        self.save(&items)
    }
}

impl TabStorage for FileTabStorage {
    fn get_item(&self, key: &str) -> ClientResult<Option<String>> {
        let _guard = self.lock.read().map_err(poisoned)?;
        Ok(self.load()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> ClientResult<()> {
        self.update(|items| {
            items.insert(key.to_string(), value.to_string());
        })
    }

    fn remove_item(&self, key: &str) -> ClientResult<()> {
        self.update(|items| {
            items.remove(key);
        })
    }

    fn clear(&self) -> ClientResult<()> {
        let _guard = self.lock.write().map_err(poisoned)?;
        self.remove_file()
    }

    fn set_items(&self, new_items: &[(&str, &str)]) -> ClientResult<()> {
        self.update(|items| {
            for (key, value) in new_items {
                items.insert(key.to_string(), value.to_string());
            }
        })
    }
}

//! Persistent collision overrides.
//!
//! The set of tile positions whose default collision was switched off lives
//! under a single key of a durable key-value store as a sorted JSON array of
//! `"x,y"` strings. Stored data that cannot be read back is discarded with a
//! warning; the set then starts empty.

use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::tilemap::TileKey;

pub const OVERRIDES_KEY: &str = "glade.collision_overrides";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&mut self, key: &str, value: Value) -> Result<(), String>;
}

/// In-memory store. Nothing survives the process.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: std::collections::HashMap<String, Value>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), String> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by one JSON object file, rewritten atomically on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileStore {
    /// Open the store at `path`. A missing file is an empty store; an
    /// unreadable or non-object file is logged and treated as empty.
    pub fn open(path: &Path) -> Self {
        let values = match fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(values)) => values,
                Ok(_) => {
                    log::warn!(
                        "Store {} is not a JSON object; starting empty",
                        path.display()
                    );
                    Map::new()
                }
                Err(e) => {
                    log::warn!("Store {} is corrupt ({e}); starting empty", path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("Failed to read store {}: {e}; starting empty", path.display());
                Map::new()
            }
        };
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), String> {
        self.values.insert(key.to_string(), value);
        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|e| format!("Failed to serialize store: {e}"))?;
        write_text_atomic(&self.path, &text)
            .map_err(|e| format!("Failed to write store {}: {e}", self.path.display()))
    }
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text)?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("store.json");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

/// Tile positions whose collision is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollisionOverrides {
    keys: BTreeSet<TileKey>,
}

impl CollisionOverrides {
    /// Read the set from `store`. Corrupt data yields an empty set.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        let Some(value) = store.get(OVERRIDES_KEY) else {
            return Self::default();
        };
        match Self::from_json(&value) {
            Ok(overrides) => {
                if !overrides.is_empty() {
                    log::info!("Loaded {} collision overrides", overrides.len());
                }
                overrides
            }
            Err(e) => {
                log::warn!("Discarding stored collision overrides: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), String> {
        store.set(OVERRIDES_KEY, self.to_json())
    }

    pub fn from_json(value: &Value) -> Result<Self, String> {
        let items = value
            .as_array()
            .ok_or_else(|| "expected a JSON array".to_string())?;
        let mut keys = BTreeSet::new();
        for item in items {
            let text = item
                .as_str()
                .ok_or_else(|| format!("non-string entry {item}"))?;
            keys.insert(text.parse::<TileKey>()?);
        }
        Ok(Self { keys })
    }

    pub fn to_json(&self) -> Value {
        Value::Array(
            self.keys
                .iter()
                .map(|key| Value::String(key.to_string()))
                .collect(),
        )
    }

    pub fn contains(&self, key: TileKey) -> bool {
        self.keys.contains(&key)
    }

    pub fn insert(&mut self, key: TileKey) -> bool {
        self.keys.insert(key)
    }

    pub fn remove(&mut self, key: TileKey) -> bool {
        self.keys.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

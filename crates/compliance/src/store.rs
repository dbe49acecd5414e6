//! Pluggable persistence for registry records
//!
//! Registries only see the [`Store`] trait, so the backing store can be
//! swapped without touching registry logic. Two implementations ship here:
//! - [`MemoryStore`]: process-local, insertion ordered
//! - [`JsonFileStore`]: the same map snapshotted to a JSON file on every write

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from a record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed record storage
///
/// `list` returns records in insertion order. Putting an existing id
/// replaces the value in place without moving it.
pub trait Store<V>: Send {
    /// Fetch a record by id
    fn get(&self, id: &str) -> StoreResult<Option<V>>;

    /// Insert or replace a record
    fn put(&mut self, id: &str, value: V) -> StoreResult<()>;

    /// All records with their ids, in insertion order
    fn list(&self) -> StoreResult<Vec<(String, V)>>;

    /// Number of stored records
    fn len(&self) -> StoreResult<usize> {
        Ok(self.list()?.len())
    }

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// In-memory store (insertion ordered)
#[derive(Debug, Clone)]
pub struct MemoryStore<V> {
    order: Vec<String>,
    items: HashMap<String, V>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            items: HashMap::new(),
        }
    }
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace, returning the value that was replaced
    fn insert(&mut self, id: &str, value: V) -> Option<V> {
        let previous = self.items.insert(id.to_string(), value);
        if previous.is_none() {
            self.order.push(id.to_string());
        }
        previous
    }

    /// Undo an `insert` that returned `previous`
    fn restore(&mut self, id: &str, previous: Option<V>) {
        match previous {
            Some(value) => {
                self.items.insert(id.to_string(), value);
            }
            None => {
                self.items.remove(id);
                self.order.retain(|existing| existing != id);
            }
        }
    }
}

impl<V: Clone + Send> Store<V> for MemoryStore<V> {
    fn get(&self, id: &str) -> StoreResult<Option<V>> {
        Ok(self.items.get(id).cloned())
    }

    fn put(&mut self, id: &str, value: V) -> StoreResult<()> {
        self.insert(id, value);
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<(String, V)>> {
        Ok(self
            .order
            .iter()
            .filter_map(|id| self.items.get(id).map(|v| (id.clone(), v.clone())))
            .collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.order.len())
    }
}

/// On-disk record layout
#[derive(Serialize, Deserialize)]
struct StoredRecord<V> {
    id: String,
    value: V,
}

/// JSON-file-backed store
///
/// The whole map is loaded on open and rewritten (via a temp file and
/// rename) after every `put`.
#[derive(Debug)]
pub struct JsonFileStore<V> {
    path: PathBuf,
    inner: MemoryStore<V>,
}

impl<V> JsonFileStore<V>
where
    V: Clone + Send + Serialize + DeserializeOwned,
{
    /// Open (or create) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut inner = MemoryStore::new();

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if !content.trim().is_empty() {
                let records: Vec<StoredRecord<V>> = serde_json::from_str(&content)?;
                for record in records {
                    inner.insert(&record.id, record.value);
                }
            }
        } else if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(Self { path, inner })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> StoreResult<()> {
        let records: Vec<StoredRecord<&V>> = self
            .inner
            .order
            .iter()
            .filter_map(|id| {
                self.inner.items.get(id).map(|value| StoredRecord {
                    id: id.clone(),
                    value,
                })
            })
            .collect();
        let json = serde_json::to_string_pretty(&records)?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl<V> Store<V> for JsonFileStore<V>
where
    V: Clone + Send + Serialize + DeserializeOwned,
{
    fn get(&self, id: &str) -> StoreResult<Option<V>> {
        self.inner.get(id)
    }

    /// Memory only changes if the snapshot reaches disk
    fn put(&mut self, id: &str, value: V) -> StoreResult<()> {
        let previous = self.inner.insert(id, value);
        if let Err(e) = self.flush() {
            self.inner.restore(id, previous);
            return Err(e);
        }
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<(String, V)>> {
        self.inner.list()
    }

    fn len(&self) -> StoreResult<usize> {
        self.inner.len()
    }
}

//! Per-pass bookkeeping of generated and referenced assets.

use std::sync::Arc;

use graft_core::{ImportError, ImportResult, Node, NodeId};
use graft_render_2d::VectorImage;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// A keyed table of artifacts. Keys are unique for the life of a pass.
#[derive(Debug, Clone)]
pub struct AssetCache<T> {
    table: &'static str,
    entries: IndexMap<String, T>,
}

impl<T> AssetCache<T> {
    pub fn new(table: &'static str) -> Self {
        Self {
            table,
            entries: IndexMap::new(),
        }
    }

    /// Name of this table, used in errors and logs.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Insert a new entry. Fails if the key is already present.
    pub fn add(&mut self, key: impl Into<String>, value: T) -> ImportResult<()> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(ImportError::DuplicateKey {
                table: self.table,
                key,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Return the existing entry, or generate and store it.
    ///
    /// `make` runs at most once per key.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        key: &str,
        make: impl FnOnce() -> Result<T, E>,
    ) -> Result<&T, E> {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(entry) => Ok(&*entry.into_mut()),
            Entry::Vacant(entry) => Ok(&*entry.insert(make()?)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<T> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Drop every entry one by one, in insertion order. Returns how many
    /// entries were released.
    pub fn release_all(&mut self) -> usize {
        let mut released = 0;
        for (key, value) in self.entries.drain(..) {
            tracing::trace!(table = self.table, %key, "releasing generated entry");
            drop(value);
            released += 1;
        }
        released
    }

    /// Release every entry added after the first `len`.
    pub fn truncate(&mut self, len: usize) -> usize {
        let mut released = 0;
        for (key, value) in self.entries.drain(len.min(self.entries.len())..) {
            tracing::trace!(table = self.table, %key, "releasing generated entry");
            drop(value);
            released += 1;
        }
        released
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Record of an output node created during a pass.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedNode {
    pub id: NodeId,
    pub name: String,
    /// Converter that produced the node
    pub converter: String,
}

impl GeneratedNode {
    pub fn new(node: &Node, converter: &str) -> Self {
        Self {
            id: node.id.clone(),
            name: node.name.clone(),
            converter: converter.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Font,
    Other,
}

/// A pre-existing asset the generated output refers to.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DependencyAsset {
    pub path: String,
    pub kind: DependencyKind,
}

/// Table lengths at one point of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TablesMark {
    nodes: usize,
    assets: usize,
    dependencies: usize,
}

/// The three tables of one import pass.
#[derive(Debug, Clone)]
pub struct AssetTables {
    /// Output nodes, keyed by source node id
    pub nodes: AssetCache<GeneratedNode>,
    /// Generated images, keyed by source node id
    pub assets: AssetCache<Arc<VectorImage>>,
    /// Referenced external assets, keyed by path
    pub dependencies: AssetCache<DependencyAsset>,
}

impl Default for AssetTables {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetTables {
    pub fn new() -> Self {
        Self {
            nodes: AssetCache::new("nodes"),
            assets: AssetCache::new("assets"),
            dependencies: AssetCache::new("dependencies"),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.assets.clear();
        self.dependencies.clear();
    }

    /// Current length of each table, for [`AssetTables::restore`].
    pub fn mark(&self) -> TablesMark {
        TablesMark {
            nodes: self.nodes.len(),
            assets: self.assets.len(),
            dependencies: self.dependencies.len(),
        }
    }

    /// Release every entry added since `mark` was taken.
    pub fn restore(&mut self, mark: TablesMark) {
        let nodes = self.nodes.truncate(mark.nodes);
        let assets = self.assets.truncate(mark.assets);
        self.dependencies.truncate(mark.dependencies);
        if nodes + assets > 0 {
            tracing::debug!(nodes, assets, "released partial conversion");
        }
    }

    /// Release everything generated so far and empty all tables.
    pub fn rollback(&mut self) {
        let nodes = self.nodes.release_all();
        let assets = self.assets.release_all();
        self.clear();
        tracing::debug!(nodes, assets, "rolled back import pass");
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.assets.is_empty() && self.dependencies.is_empty()
    }
}

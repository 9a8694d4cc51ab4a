//! In-memory library store.

use std::collections::{BTreeMap, BTreeSet};

use crate::types::{LibraryKey, LibraryNode};
use super::LibraryStore;

/// In-memory library store.
///
/// Uses BTreeMap for deterministic iteration order. Adding a node whose key
/// is already present replaces the earlier node.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLibraryStore {
    /// Libraries by key.
    libraries: BTreeMap<LibraryKey, LibraryNode>,
}

impl InMemoryLibraryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a library to the store, returning its key.
    pub fn add_library(&mut self, library: LibraryNode) -> LibraryKey {
        let key = library.key();
        self.libraries.insert(key.clone(), library);
        key
    }

    /// Get number of libraries.
    pub fn num_libraries(&self) -> usize {
        self.libraries.len()
    }

    /// Dependency keys that no stored library resolves.
    pub fn dangling_dependencies(&self) -> BTreeSet<&LibraryKey> {
        self.libraries
            .values()
            .flat_map(|library| library.dependencies.iter())
            .filter(|key| !self.libraries.contains_key(*key))
            .collect()
    }
}

impl FromIterator<LibraryNode> for InMemoryLibraryStore {
    fn from_iter<I: IntoIterator<Item = LibraryNode>>(iter: I) -> Self {
        let mut store = Self::new();
        for library in iter {
            store.add_library(library);
        }
        store
    }
}

impl LibraryStore for InMemoryLibraryStore {
    fn library(&self, key: &LibraryKey) -> Option<&LibraryNode> {
        self.libraries.get(key)
    }
}

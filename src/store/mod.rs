//! Library graph lookup.

pub mod memory;

use crate::types::{LibraryKey, LibraryNode};

/// Source of resolved library nodes, addressed by identity.
///
/// Implementations must return the same node for the same key for the
/// lifetime of a conversion call.
pub trait LibraryStore: Send + Sync {
    /// Fetch a library by key.
    fn library(&self, key: &LibraryKey) -> Option<&LibraryNode>;
}

pub use memory::InMemoryLibraryStore;

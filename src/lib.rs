//! # dependency-snapshot
//!
//! Memoized conversion of resolved library dependency graphs into
//! immutable, serializable snapshots.
//!
//! The resolver hands over a live graph: libraries that depend on
//! libraries, shared by many parents, some still packed in bundles that
//! have not been extracted. This crate turns it into a
//! [`DependencySnapshot`] that can be serialized or handed to another tool.
//!
//! ## Core Contract
//!
//! 1. Each distinct library identity is converted exactly once per cache
//! 2. Shared dependencies stay shared in the snapshot (same `Arc`), also
//!    after a serde round trip
//! 3. Local jars inside an unextracted bundle are still discovered
//!
//! ## Architecture
//!
//! ```text
//! VariantDependencies → SnapshotCache → DependencySnapshot
//!                           ↓      ↓
//!                LibraryStore    ArtifactResolver (exploded folder or bundle)
//! ```
//!
//! ## Failure Model
//!
//! Nothing in the conversion path fails. A missing or corrupt bundle means
//! no local jars for that library; an unknown dependency is omitted; a
//! cycle is cut at the back edge.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod types;
pub mod store;
pub mod resolver;
pub mod cache;
pub mod builder;
pub mod canonical;

// Re-exports
pub use types::{
    MavenCoordinates, CoordinatesError, LibraryKey, LibraryNode,
    JarDependency, PlainJarLibrary, ConvertedLibrary, DependencySnapshot, FlatSnapshotError,
    VariantDependencies, BuildTools, StaticBuildTools,
};
pub use store::{LibraryStore, InMemoryLibraryStore};
pub use resolver::{ArtifactResolver, LocalArtifactResolver, ArchiveLayout, ArchiveScan, ArchiveError};
pub use cache::{SnapshotCache, CacheStats};
pub use canonical::{to_canonical_bytes, canonical_hash, canonical_hash_hex, CanonicalError};

/// Schema version of the serialized snapshot.
/// Increment on breaking changes to any serialized type.
pub const SNAPSHOT_SCHEMA_VERSION: &str = "2.0.0";

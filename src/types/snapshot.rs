//! The immutable dependency snapshot of one variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::converted::ConvertedLibrary;
use super::flat::FlatSnapshot;
use super::jar::PlainJarLibrary;
use crate::canonical::{canonical_hash_hex, CanonicalError};
use crate::SNAPSHOT_SCHEMA_VERSION;

/// Full dependency set of a variant, ready to cross a process boundary.
///
/// Three ordered sequences: Android libraries, plain jars and sibling
/// project paths. Absence is always an empty sequence. Equality is by
/// content.
///
/// Serializes as a flat table holding each distinct library once, with
/// dependencies referenced by position; deserializing restores the shared
/// `Arc`s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "FlatSnapshot", try_from = "FlatSnapshot")]
pub struct DependencySnapshot {
    libraries: Vec<Arc<ConvertedLibrary>>,
    java_libraries: Vec<PlainJarLibrary>,
    projects: Vec<String>,
}

impl DependencySnapshot {
    pub(crate) fn new(
        libraries: Vec<Arc<ConvertedLibrary>>,
        java_libraries: Vec<PlainJarLibrary>,
        projects: Vec<String>,
    ) -> Self {
        Self {
            libraries,
            java_libraries,
            projects,
        }
    }

    /// A snapshot with nothing in it.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A snapshot holding only plain jars.
    pub fn from_java_libraries<I>(java_libraries: I) -> Self
    where
        I: IntoIterator<Item = PlainJarLibrary>,
    {
        Self::new(Vec::new(), java_libraries.into_iter().collect(), Vec::new())
    }

    /// Projection for consumers that only understand plain jars.
    ///
    /// Keeps the jar sequence; libraries and projects are emptied.
    pub fn java_only(&self) -> Self {
        Self::from_java_libraries(self.java_libraries.iter().cloned())
    }

    /// Android libraries, in resolver order.
    pub fn libraries(&self) -> &[Arc<ConvertedLibrary>] {
        &self.libraries
    }

    /// Plain jars, in resolver order.
    pub fn java_libraries(&self) -> &[PlainJarLibrary] {
        &self.java_libraries
    }

    /// Sibling project paths, in resolver order.
    pub fn projects(&self) -> &[String] {
        &self.projects
    }

    /// Whether all three sequences are empty.
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty() && self.java_libraries.is_empty() && self.projects.is_empty()
    }

    /// Stable digest of the snapshot content and schema version.
    ///
    /// Hashes the flat serialized form, so the cost follows the number of
    /// distinct libraries, not the number of paths through them.
    pub fn fingerprint(&self) -> Result<String, CanonicalError> {
        canonical_hash_hex(&FingerprintInput {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            snapshot: FlatSnapshot::from(self),
        })
    }
}

#[derive(Serialize)]
struct FingerprintInput<'a> {
    schema_version: &'a str,
    snapshot: FlatSnapshot,
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, "]")
}

impl fmt::Display for DependencySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DependencySnapshot{{libraries=")?;
        write_list(f, &self.libraries)?;
        write!(f, ", javaLibraries=")?;
        write_list(f, &self.java_libraries)?;
        write!(f, ", projects=")?;
        write_list(f, &self.projects)?;
        write!(f, "}}")
    }
}

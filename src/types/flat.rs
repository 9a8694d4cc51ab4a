//! Flat wire form of a snapshot.
//!
//! Every distinct converted library is written once into a table, ordered
//! so that a library's dependencies precede it. Edges are table indices.
//! Loading rebuilds the table front to back, so each library is allocated
//! once and every parent gets the same `Arc` again.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::converted::ConvertedLibrary;
use super::coordinates::MavenCoordinates;
use super::jar::PlainJarLibrary;
use super::library::LibraryKey;
use super::snapshot::DependencySnapshot;

/// Error raised when a flat snapshot refers to entries it does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlatSnapshotError {
    /// A dependency index does not point at an earlier table entry.
    #[error("Library {library} depends on entry {dependency}, which does not precede it")]
    ForwardReference {
        /// Index of the dependent library.
        library: usize,
        /// The offending dependency index.
        dependency: usize,
    },
    /// A root index is outside the table.
    #[error("Root {0} is outside the library table")]
    UnknownRoot(usize),
}

/// One table entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatLibrary {
    pub(crate) key: LibraryKey,
    pub(crate) folder: PathBuf,
    pub(crate) bundle: Option<PathBuf>,
    pub(crate) dependencies: Vec<usize>,
    pub(crate) java_libraries: Vec<PlainJarLibrary>,
    pub(crate) local_jars: Vec<PathBuf>,
    pub(crate) project: Option<String>,
    pub(crate) project_variant: Option<String>,
    pub(crate) requested_coordinates: Option<MavenCoordinates>,
    pub(crate) resolved_coordinates: Option<MavenCoordinates>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub(crate) cyclic_dependencies: Vec<LibraryKey>,
}

/// Serialized shape of a [`DependencySnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatSnapshot {
    /// Each library once, dependencies first.
    libraries: Vec<FlatLibrary>,
    /// Table indices of the snapshot's libraries, in snapshot order.
    roots: Vec<usize>,
    java_libraries: Vec<PlainJarLibrary>,
    projects: Vec<String>,
}

/// Table under construction, indexed by allocation.
#[derive(Default)]
struct Table {
    libraries: Vec<FlatLibrary>,
    positions: HashMap<*const ConvertedLibrary, usize>,
}

impl Table {
    /// Post-order insert of `root` and everything below it not yet in the table.
    fn insert(&mut self, root: &ConvertedLibrary) -> usize {
        if let Some(&position) = self.positions.get(&(root as *const ConvertedLibrary)) {
            return position;
        }

        let mut stack: Vec<(&ConvertedLibrary, usize)> = vec![(root, 0)];
        while let Some(top) = stack.last_mut() {
            let library = top.0;
            if let Some(child) = library.dependencies().get(top.1) {
                top.1 += 1;
                if !self.positions.contains_key(&Arc::as_ptr(child)) {
                    stack.push((&**child, 0));
                }
                continue;
            }

            stack.pop();
            let dependencies = library
                .dependencies()
                .iter()
                .map(|child| self.positions[&Arc::as_ptr(child)])
                .collect();
            self.positions.insert(library as *const ConvertedLibrary, self.libraries.len());
            self.libraries.push(library.to_flat(dependencies));
        }
        self.libraries.len() - 1
    }
}

impl From<&DependencySnapshot> for FlatSnapshot {
    fn from(snapshot: &DependencySnapshot) -> Self {
        let mut table = Table::default();
        let roots = snapshot
            .libraries()
            .iter()
            .map(|library| table.insert(library))
            .collect();

        Self {
            libraries: table.libraries,
            roots,
            java_libraries: snapshot.java_libraries().to_vec(),
            projects: snapshot.projects().to_vec(),
        }
    }
}

impl From<DependencySnapshot> for FlatSnapshot {
    fn from(snapshot: DependencySnapshot) -> Self {
        Self::from(&snapshot)
    }
}

impl TryFrom<FlatSnapshot> for DependencySnapshot {
    type Error = FlatSnapshotError;

    fn try_from(flat: FlatSnapshot) -> Result<Self, Self::Error> {
        let mut built: Vec<Arc<ConvertedLibrary>> = Vec::with_capacity(flat.libraries.len());
        for (position, library) in flat.libraries.into_iter().enumerate() {
            // `built` holds exactly the entries before `position`.
            let dependencies = library
                .dependencies
                .iter()
                .map(|&dependency| {
                    built.get(dependency).cloned().ok_or(FlatSnapshotError::ForwardReference {
                        library: position,
                        dependency,
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            built.push(Arc::new(ConvertedLibrary::from_flat(library, dependencies)));
        }

        let libraries = flat
            .roots
            .iter()
            .map(|&root| built.get(root).cloned().ok_or(FlatSnapshotError::UnknownRoot(root)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DependencySnapshot::new(libraries, flat.java_libraries, flat.projects))
    }
}

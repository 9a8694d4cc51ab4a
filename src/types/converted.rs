//! Immutable converted libraries.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::coordinates::MavenCoordinates;
use super::flat::FlatLibrary;
use super::jar::PlainJarLibrary;
use super::library::{LibraryKey, LibraryNode};

/// Folder inside an exploded library that holds its jars.
pub const FD_JARS: &str = "jars";

/// Main classes jar inside [`FD_JARS`].
pub const FN_CLASSES_JAR: &str = "classes.jar";

/// Snapshot form of a [`LibraryNode`].
///
/// Children are shared by `Arc`: every parent that depends on the same
/// library holds the same allocation. Never mutated after construction.
///
/// Equality, `Debug` and drop walk the dependency graph without recursion,
/// so arbitrarily deep chains are safe. Serialization goes through
/// [`DependencySnapshot`](super::DependencySnapshot), which writes each
/// shared library once.
#[derive(Clone)]
pub struct ConvertedLibrary {
    key: LibraryKey,
    folder: PathBuf,
    bundle: Option<PathBuf>,
    dependencies: Vec<Arc<ConvertedLibrary>>,
    java_libraries: Vec<PlainJarLibrary>,
    local_jars: Vec<PathBuf>,
    project: Option<String>,
    project_variant: Option<String>,
    requested_coordinates: Option<MavenCoordinates>,
    resolved_coordinates: Option<MavenCoordinates>,
    cyclic_dependencies: Vec<LibraryKey>,
}

impl ConvertedLibrary {
    /// Build the converted form of `source`.
    ///
    /// `dependencies` must already be converted; `cyclic_dependencies` lists
    /// the keys whose edge was cut to keep the result acyclic.
    pub(crate) fn from_node(
        source: &LibraryNode,
        dependencies: Vec<Arc<ConvertedLibrary>>,
        local_jars: Vec<PathBuf>,
        cyclic_dependencies: Vec<LibraryKey>,
    ) -> Self {
        Self {
            key: source.key(),
            folder: source.folder.clone(),
            bundle: source.bundle.clone(),
            dependencies,
            // Reserved for jars nested under an Android library.
            java_libraries: Vec::new(),
            local_jars,
            project: source.project.clone(),
            project_variant: source.project_variant.clone(),
            requested_coordinates: source.requested_coordinates.clone(),
            resolved_coordinates: source.resolved_coordinates.clone(),
            cyclic_dependencies,
        }
    }

    /// Rebuild a library from its flat form, with children already rebuilt.
    pub(crate) fn from_flat(flat: FlatLibrary, dependencies: Vec<Arc<ConvertedLibrary>>) -> Self {
        Self {
            key: flat.key,
            folder: flat.folder,
            bundle: flat.bundle,
            dependencies,
            java_libraries: flat.java_libraries,
            local_jars: flat.local_jars,
            project: flat.project,
            project_variant: flat.project_variant,
            requested_coordinates: flat.requested_coordinates,
            resolved_coordinates: flat.resolved_coordinates,
            cyclic_dependencies: flat.cyclic_dependencies,
        }
    }

    /// Flat form of this library; `dependencies` are table indices.
    pub(crate) fn to_flat(&self, dependencies: Vec<usize>) -> FlatLibrary {
        FlatLibrary {
            key: self.key.clone(),
            folder: self.folder.clone(),
            bundle: self.bundle.clone(),
            dependencies,
            java_libraries: self.java_libraries.clone(),
            local_jars: self.local_jars.clone(),
            project: self.project.clone(),
            project_variant: self.project_variant.clone(),
            requested_coordinates: self.requested_coordinates.clone(),
            resolved_coordinates: self.resolved_coordinates.clone(),
            cyclic_dependencies: self.cyclic_dependencies.clone(),
        }
    }

    // Everything but the dependency list.
    fn same_attributes(&self, other: &Self) -> bool {
        self.key == other.key
            && self.folder == other.folder
            && self.bundle == other.bundle
            && self.java_libraries == other.java_libraries
            && self.local_jars == other.local_jars
            && self.project == other.project
            && self.project_variant == other.project_variant
            && self.requested_coordinates == other.requested_coordinates
            && self.resolved_coordinates == other.resolved_coordinates
            && self.cyclic_dependencies == other.cyclic_dependencies
            && self.dependencies.len() == other.dependencies.len()
    }

    /// Identity of the source library.
    pub fn key(&self) -> &LibraryKey {
        &self.key
    }

    /// Exploded folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Packed bundle, if any.
    pub fn bundle(&self) -> Option<&Path> {
        self.bundle.as_deref()
    }

    /// Converted direct dependencies.
    pub fn dependencies(&self) -> &[Arc<ConvertedLibrary>] {
        &self.dependencies
    }

    /// Plain jars nested under this library. Currently always empty.
    pub fn java_libraries(&self) -> &[PlainJarLibrary] {
        &self.java_libraries
    }

    /// Local jars this library contributes, excluding [`Self::jar_file`].
    pub fn local_jars(&self) -> &[PathBuf] {
        &self.local_jars
    }

    /// Sibling project path.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// Sibling project variant.
    pub fn project_variant(&self) -> Option<&str> {
        self.project_variant.as_deref()
    }

    /// Coordinates as requested.
    pub fn requested_coordinates(&self) -> Option<&MavenCoordinates> {
        self.requested_coordinates.as_ref()
    }

    /// Coordinates after conflict resolution.
    pub fn resolved_coordinates(&self) -> Option<&MavenCoordinates> {
        self.resolved_coordinates.as_ref()
    }

    /// Dependencies dropped because they led back to an ancestor.
    pub fn cyclic_dependencies(&self) -> &[LibraryKey] {
        &self.cyclic_dependencies
    }

    /// `<folder>/jars/classes.jar`
    pub fn jar_file(&self) -> PathBuf {
        self.folder.join(FD_JARS).join(FN_CLASSES_JAR)
    }

    /// `<folder>/AndroidManifest.xml`
    pub fn manifest(&self) -> PathBuf {
        self.folder.join("AndroidManifest.xml")
    }

    /// `<folder>/res`
    pub fn res_folder(&self) -> PathBuf {
        self.folder.join("res")
    }

    /// `<folder>/assets`
    pub fn assets_folder(&self) -> PathBuf {
        self.folder.join("assets")
    }
}

/// Content equality over the whole dependency graph.
impl PartialEq for ConvertedLibrary {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&ConvertedLibrary, &ConvertedLibrary)> = vec![(self, other)];
        let mut compared = HashSet::new();
        while let Some((left, right)) = pending.pop() {
            if std::ptr::eq(left, right) || !compared.insert((left as *const Self, right as *const Self)) {
                continue;
            }
            if !left.same_attributes(right) {
                return false;
            }
            pending.extend(
                left.dependencies
                    .iter()
                    .zip(&right.dependencies)
                    .map(|(l, r)| (&**l, &**r)),
            );
        }
        true
    }
}

impl Eq for ConvertedLibrary {}

impl Drop for ConvertedLibrary {
    fn drop(&mut self) {
        // Unlink uniquely owned children here instead of letting each one
        // drop its own subtree.
        let mut pending = std::mem::take(&mut self.dependencies);
        while let Some(child) = pending.pop() {
            if let Some(mut child) = Arc::into_inner(child) {
                pending.append(&mut child.dependencies);
            }
        }
    }
}

impl fmt::Debug for ConvertedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dependencies: Vec<&LibraryKey> = self.dependencies.iter().map(|d| d.key()).collect();
        f.debug_struct("ConvertedLibrary")
            .field("key", &self.key)
            .field("folder", &self.folder)
            .field("bundle", &self.bundle)
            .field("dependencies", &dependencies)
            .field("local_jars", &self.local_jars)
            .field("project", &self.project)
            .field("project_variant", &self.project_variant)
            .field("resolved_coordinates", &self.resolved_coordinates)
            .field("cyclic_dependencies", &self.cyclic_dependencies)
            .finish()
    }
}

impl fmt::Display for ConvertedLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AndroidLibrary{{{}", self.key)?;
        if let Some(project) = &self.project {
            write!(f, ", project={}", project)?;
        }
        write!(f, ", dependencies={}", self.dependencies.len())?;
        write!(f, ", localJars={}}}", self.local_jars.len())
    }
}

//! Library nodes as handed over by the dependency resolver.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::coordinates::MavenCoordinates;

/// Logical identity of a library.
///
/// Two nodes with equal keys are the same library no matter how many times
/// the resolver instantiated them. Implements `Ord` for deterministic
/// ordering: coordinates sort before paths.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryKey {
    /// Identified by resolved coordinates.
    Coordinates(MavenCoordinates),
    /// Identified by its bundle or exploded folder on disk.
    Path(PathBuf),
}

impl LibraryKey {
    /// Key for the given coordinates.
    pub fn coordinates(coordinates: MavenCoordinates) -> Self {
        Self::Coordinates(coordinates)
    }

    /// Key for the given path.
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

impl fmt::Display for LibraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Coordinates(c) => write!(f, "{}", c),
            Self::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

impl From<MavenCoordinates> for LibraryKey {
    fn from(coordinates: MavenCoordinates) -> Self {
        Self::Coordinates(coordinates)
    }
}

/// A resolved Android library before conversion.
///
/// Dependencies are listed by key and looked up through a
/// [`LibraryStore`](crate::store::LibraryStore), so several parents may
/// share a child and the graph may even loop back on itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryNode {
    /// Folder the bundle is (or will be) extracted into.
    pub folder: PathBuf,
    /// Packed bundle, if the library came from an archive.
    #[serde(default)]
    pub bundle: Option<PathBuf>,
    /// Direct dependencies, by identity.
    #[serde(default)]
    pub dependencies: Vec<LibraryKey>,
    /// Local jars declared by the exploded layout.
    #[serde(default)]
    pub local_jars: Vec<PathBuf>,
    /// Path of the sibling project that produced this library.
    #[serde(default)]
    pub project: Option<String>,
    /// Variant of that sibling project.
    #[serde(default)]
    pub project_variant: Option<String>,
    /// Coordinates as requested in the build script.
    #[serde(default)]
    pub requested_coordinates: Option<MavenCoordinates>,
    /// Coordinates after conflict resolution.
    #[serde(default)]
    pub resolved_coordinates: Option<MavenCoordinates>,
}

impl LibraryNode {
    /// Create a node with only an exploded folder.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            bundle: None,
            dependencies: Vec::new(),
            local_jars: Vec::new(),
            project: None,
            project_variant: None,
            requested_coordinates: None,
            resolved_coordinates: None,
        }
    }

    /// Set the packed bundle.
    pub fn with_bundle(mut self, bundle: impl Into<PathBuf>) -> Self {
        self.bundle = Some(bundle.into());
        self
    }

    /// Set both requested and resolved coordinates.
    pub fn with_coordinates(mut self, coordinates: MavenCoordinates) -> Self {
        self.requested_coordinates = Some(coordinates.clone());
        self.resolved_coordinates = Some(coordinates);
        self
    }

    /// Append a direct dependency.
    pub fn with_dependency(mut self, key: LibraryKey) -> Self {
        self.dependencies.push(key);
        self
    }

    /// Set the declared local jars.
    pub fn with_local_jars(mut self, jars: Vec<PathBuf>) -> Self {
        self.local_jars = jars;
        self
    }

    /// Associate the library with a sibling project.
    pub fn with_project(mut self, project: impl Into<String>, variant: Option<String>) -> Self {
        self.project = Some(project.into());
        self.project_variant = variant;
        self
    }

    /// Logical identity of this node.
    ///
    /// Resolved coordinates win; otherwise the bundle path, otherwise the
    /// exploded folder.
    pub fn key(&self) -> LibraryKey {
        if let Some(coordinates) = &self.resolved_coordinates {
            return LibraryKey::Coordinates(coordinates.clone());
        }
        match &self.bundle {
            Some(bundle) => LibraryKey::Path(bundle.clone()),
            None => LibraryKey::Path(self.folder.clone()),
        }
    }

    /// Exploded folder.
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Packed bundle, if any.
    pub fn bundle(&self) -> Option<&Path> {
        self.bundle.as_deref()
    }
}

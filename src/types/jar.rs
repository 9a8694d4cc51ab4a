//! Jar dependencies and their snapshot form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use super::coordinates::MavenCoordinates;

/// A jar dependency as classified by the resolver.
///
/// Local jars (declared straight from the file system) use the same shape
/// with no coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JarDependency {
    /// The jar on disk.
    pub jar_file: PathBuf,
    /// On the compile classpath.
    #[serde(default = "default_true")]
    pub compiled: bool,
    /// Packaged into the output.
    #[serde(default = "default_true")]
    pub packaged: bool,
    /// Sibling project this jar is built by, if any.
    #[serde(default)]
    pub project_path: Option<String>,
    /// Coordinates after conflict resolution.
    #[serde(default)]
    pub resolved_coordinates: Option<MavenCoordinates>,
}

fn default_true() -> bool {
    true
}

impl JarDependency {
    /// A compiled and packaged jar with no project or coordinates.
    pub fn new(jar_file: impl Into<PathBuf>) -> Self {
        Self {
            jar_file: jar_file.into(),
            compiled: true,
            packaged: true,
            project_path: None,
            resolved_coordinates: None,
        }
    }

    /// Set the compiled/packaged scope flags.
    pub fn with_scope(mut self, compiled: bool, packaged: bool) -> Self {
        self.compiled = compiled;
        self.packaged = packaged;
        self
    }

    /// Mark this jar as produced by a sibling project.
    pub fn with_project(mut self, project_path: impl Into<String>) -> Self {
        self.project_path = Some(project_path.into());
        self
    }

    /// Set resolved coordinates.
    pub fn with_coordinates(mut self, coordinates: MavenCoordinates) -> Self {
        self.resolved_coordinates = Some(coordinates);
        self
    }

    /// Whether the resolved coordinates carry a classifier.
    pub fn is_custom_artifact(&self) -> bool {
        self.resolved_coordinates
            .as_ref()
            .is_some_and(MavenCoordinates::has_classifier)
    }
}

/// A plain jar in a [`DependencySnapshot`](super::DependencySnapshot).
///
/// Has no children.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlainJarLibrary {
    jar_file: PathBuf,
    project: Option<String>,
    is_provided: bool,
    resolved_coordinates: Option<MavenCoordinates>,
}

impl PlainJarLibrary {
    /// Create a plain jar entry.
    pub fn new(
        jar_file: impl Into<PathBuf>,
        is_provided: bool,
        resolved_coordinates: Option<MavenCoordinates>,
    ) -> Self {
        Self {
            jar_file: jar_file.into(),
            project: None,
            is_provided,
            resolved_coordinates,
        }
    }

    /// Snapshot form of a compiled jar dependency: provided iff not packaged.
    pub fn from_dependency(dependency: &JarDependency) -> Self {
        Self::new(
            dependency.jar_file.clone(),
            !dependency.packaged,
            dependency.resolved_coordinates.clone(),
        )
    }

    /// The jar on disk.
    pub fn jar_file(&self) -> &Path {
        &self.jar_file
    }

    /// Sibling project; always `None` for snapshot-built jars.
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    /// On the compile classpath but not packaged.
    pub fn is_provided(&self) -> bool {
        self.is_provided
    }

    /// Resolved coordinates, if the dependency manager knew them.
    pub fn resolved_coordinates(&self) -> Option<&MavenCoordinates> {
        self.resolved_coordinates.as_ref()
    }
}

impl fmt::Display for PlainJarLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JavaLibrary{{jarFile={}", self.jar_file.display())?;
        if self.is_provided {
            write!(f, ", provided")?;
        }
        if let Some(c) = &self.resolved_coordinates {
            write!(f, ", coordinates={}", c)?;
        }
        write!(f, "}}")
    }
}

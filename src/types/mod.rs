//! Core types for dependency snapshots.

pub mod coordinates;
pub mod library;
pub mod jar;
pub mod converted;
mod flat;
pub mod snapshot;
pub mod variant;

pub use coordinates::{MavenCoordinates, CoordinatesError};
pub use library::{LibraryKey, LibraryNode};
pub use jar::{JarDependency, PlainJarLibrary};
pub use converted::{ConvertedLibrary, FD_JARS, FN_CLASSES_JAR};
pub use flat::FlatSnapshotError;
pub use snapshot::DependencySnapshot;
pub use variant::{VariantDependencies, BuildTools, StaticBuildTools};

//! Per-variant input from the dependency resolver and build tools.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::jar::JarDependency;
use super::library::LibraryKey;

/// Classified dependencies of one build variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantDependencies {
    /// Variant name, for logging.
    #[serde(default)]
    pub name: String,
    /// Direct Android library dependencies, by identity.
    #[serde(default)]
    pub libraries: Vec<LibraryKey>,
    /// Jars managed by the dependency manager.
    #[serde(default)]
    pub jar_dependencies: Vec<JarDependency>,
    /// Jars taken straight from the file system.
    #[serde(default)]
    pub local_dependencies: Vec<JarDependency>,
    /// RenderScript support mode is enabled for this variant.
    #[serde(default)]
    pub renderscript_support_mode: bool,
}

impl VariantDependencies {
    /// Empty dependency set for the named variant.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Build-tool surface the snapshot builder queries.
pub trait BuildTools {
    /// Support jar for RenderScript compatibility mode, if the installed
    /// build tools ship one.
    fn renderscript_support_jar(&self) -> Option<&Path>;
}

/// [`BuildTools`] with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticBuildTools {
    renderscript_support_jar: Option<PathBuf>,
}

impl StaticBuildTools {
    /// Build tools without a support jar.
    pub fn none() -> Self {
        Self::default()
    }

    /// Build tools providing the given support jar.
    pub fn with_renderscript_support_jar(jar: impl Into<PathBuf>) -> Self {
        Self {
            renderscript_support_jar: Some(jar.into()),
        }
    }
}

impl BuildTools for StaticBuildTools {
    fn renderscript_support_jar(&self) -> Option<&Path> {
        self.renderscript_support_jar.as_deref()
    }
}

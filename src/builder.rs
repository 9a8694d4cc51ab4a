//! Assembly of a variant's [`DependencySnapshot`].

use tracing::debug;

use crate::cache::SnapshotCache;
use crate::resolver::ArtifactResolver;
use crate::store::LibraryStore;
use crate::types::{
    BuildTools, DependencySnapshot, JarDependency, PlainJarLibrary, VariantDependencies,
};

impl<R: ArtifactResolver> SnapshotCache<R> {
    /// Build the snapshot of one variant.
    ///
    /// - Android libraries go through [`SnapshotCache::convert_graph`].
    /// - Jar dependencies that are not compiled are left out.
    /// - A compiled jar built by a sibling project becomes a project path,
    ///   unless its coordinates carry a classifier.
    /// - Compiled local jars are always plain jars.
    /// - With RenderScript support mode on, the build tools' support jar is
    ///   appended when one exists.
    pub fn build_snapshot<S>(
        &self,
        store: &S,
        variant: &VariantDependencies,
        build_tools: &dyn BuildTools,
    ) -> DependencySnapshot
    where
        S: LibraryStore + ?Sized,
    {
        let libraries = self.convert_graph(store, &variant.libraries);

        let mut java_libraries = Vec::with_capacity(
            variant.jar_dependencies.len() + variant.local_dependencies.len(),
        );
        let mut projects = Vec::new();

        for jar in variant.jar_dependencies.iter().filter(|jar| jar.compiled) {
            match sibling_project(jar) {
                Some(project) => projects.push(project.to_string()),
                None => java_libraries.push(PlainJarLibrary::from_dependency(jar)),
            }
        }

        java_libraries.extend(
            variant
                .local_dependencies
                .iter()
                .filter(|jar| jar.compiled)
                .map(PlainJarLibrary::from_dependency),
        );

        if variant.renderscript_support_mode {
            if let Some(support_jar) = build_tools.renderscript_support_jar() {
                java_libraries.push(PlainJarLibrary::new(support_jar, false, None));
            }
        }

        debug!(
            variant = %variant.name,
            libraries = libraries.len(),
            java_libraries = java_libraries.len(),
            projects = projects.len(),
            "Built dependency snapshot"
        );

        DependencySnapshot::new(libraries, java_libraries, projects)
    }

    /// Re-present `snapshot` to a consumer that only understands plain jars.
    pub fn build_java_only_snapshot(&self, snapshot: &DependencySnapshot) -> DependencySnapshot {
        snapshot.java_only()
    }
}

/// Project path of a jar that should be referenced as a sibling project.
fn sibling_project(jar: &JarDependency) -> Option<&str> {
    if jar.is_custom_artifact() {
        return None;
    }
    jar.project_path.as_deref()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::tests::{key, make_library, CountingResolver};
    use crate::store::InMemoryLibraryStore;
    use crate::types::{MavenCoordinates, StaticBuildTools};
    use std::path::Path;
    use std::sync::Arc;

    fn make_store() -> InMemoryLibraryStore {
        vec![
            make_library("ui", &["base"]),
            make_library("net", &["base"]),
            make_library("base", &[]),
        ]
        .into_iter()
        .collect()
    }

    fn make_variant() -> VariantDependencies {
        let mut variant = VariantDependencies::new("debug");
        variant.libraries = vec![key("ui"), key("net")];
        variant
    }

    #[test]
    fn test_libraries_converted_in_order() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());

        let snapshot = cache.build_snapshot(&store, &make_variant(), &StaticBuildTools::none());

        assert_eq!(snapshot.libraries().len(), 2);
        assert_eq!(snapshot.libraries()[0].key(), &key("ui"));
        assert_eq!(snapshot.libraries()[1].key(), &key("net"));
        assert!(Arc::ptr_eq(
            &snapshot.libraries()[0].dependencies()[0],
            &snapshot.libraries()[1].dependencies()[0],
        ));
    }

    #[test]
    fn test_package_only_jars_excluded() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let mut variant = make_variant();
        variant.jar_dependencies = vec![
            JarDependency::new("/repo/compile.jar"),
            JarDependency::new("/repo/apk-only.jar").with_scope(false, true),
        ];
        variant.local_dependencies = vec![
            JarDependency::new("/libs/local.jar"),
            JarDependency::new("/libs/runtime.jar").with_scope(false, true),
        ];

        let snapshot = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        let jars: Vec<&Path> = snapshot.java_libraries().iter().map(|j| j.jar_file()).collect();
        assert_eq!(jars, vec![Path::new("/repo/compile.jar"), Path::new("/libs/local.jar")]);
    }

    #[test]
    fn test_provided_flag() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let mut variant = make_variant();
        variant.jar_dependencies = vec![JarDependency::new("/repo/provided.jar").with_scope(true, false)];

        let snapshot = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        assert!(snapshot.java_libraries()[0].is_provided());
    }

    #[test]
    fn test_project_routing() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let coords = MavenCoordinates::new("com.example", "shared", "unspecified");

        let mut variant = make_variant();
        variant.jar_dependencies = vec![JarDependency::new("/build/shared.jar")
            .with_project(":shared")
            .with_coordinates(coords.clone())];
        let snapshot = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        assert_eq!(snapshot.projects(), &[":shared".to_string()]);
        assert!(snapshot.java_libraries().is_empty());

        variant.jar_dependencies = vec![JarDependency::new("/build/shared-tests.jar")
            .with_project(":shared")
            .with_coordinates(coords.with_classifier("tests"))];
        let snapshot = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        assert!(snapshot.projects().is_empty());
        assert_eq!(snapshot.java_libraries().len(), 1);
        assert_eq!(
            snapshot.java_libraries()[0]
                .resolved_coordinates()
                .and_then(|c| c.classifier.as_deref()),
            Some("tests")
        );
    }

    #[test]
    fn test_local_jars_never_routed_to_projects() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let mut variant = make_variant();
        variant.local_dependencies = vec![JarDependency::new("/libs/x.jar").with_project(":x")];

        let snapshot = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        assert!(snapshot.projects().is_empty());
        assert_eq!(snapshot.java_libraries().len(), 1);
    }

    #[test]
    fn test_renderscript_support_jar() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let tools = StaticBuildTools::with_renderscript_support_jar("/sdk/renderscript-v8.jar");
        let mut variant = make_variant();
        variant.local_dependencies = vec![JarDependency::new("/libs/local.jar")];

        let off = cache.build_snapshot(&store, &variant, &tools);
        assert_eq!(off.java_libraries().len(), 1);

        variant.renderscript_support_mode = true;
        let on = cache.build_snapshot(&store, &variant, &tools);
        assert_eq!(on.java_libraries().len(), 2);
        let shim = &on.java_libraries()[1];
        assert_eq!(shim.jar_file(), Path::new("/sdk/renderscript-v8.jar"));
        assert!(!shim.is_provided());
        assert!(shim.resolved_coordinates().is_none());

        let missing = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        assert_eq!(missing.java_libraries().len(), 1);
    }

    #[test]
    fn test_java_only_snapshot() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let mut variant = make_variant();
        variant.jar_dependencies = vec![
            JarDependency::new("/repo/a.jar"),
            JarDependency::new("/build/b.jar").with_project(":b"),
        ];

        let full = cache.build_snapshot(&store, &variant, &StaticBuildTools::none());
        let java = cache.build_java_only_snapshot(&full);
        assert_eq!(java.java_libraries(), full.java_libraries());
        assert!(java.libraries().is_empty());
        assert!(java.projects().is_empty());
    }

    #[test]
    fn test_snapshot_survives_clear() {
        let store = make_store();
        let cache = SnapshotCache::with_resolver(CountingResolver::default());
        let snapshot = cache.build_snapshot(&store, &make_variant(), &StaticBuildTools::none());
        let copy = snapshot.clone();

        cache.clear();
        assert_eq!(snapshot, copy);
        assert_eq!(snapshot.libraries()[0].dependencies()[0].key(), &key("base"));

        let rebuilt = cache.build_snapshot(&store, &make_variant(), &StaticBuildTools::none());
        assert_eq!(rebuilt, snapshot);
        assert!(!Arc::ptr_eq(&rebuilt.libraries()[0], &snapshot.libraries()[0]));
        assert_eq!(cache.resolver().scans_of(&key("base")), 2);
    }
}

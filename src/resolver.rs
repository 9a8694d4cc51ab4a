//! Local artifact lookup for Android libraries.
//!
//! The exploded folder is trusted when it exists. Before extraction the
//! packed bundle is opened read-only and its `libs/*.jar` entries are mapped
//! to where they will land once the bundle is exploded. Every failure
//! degrades to "no local jars" for that one library.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};
use zip::ZipArchive;

use crate::types::{LibraryNode, FD_JARS};

/// Failure while reading a bundle.
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// Opening or reading the file failed.
    #[error("I/O error reading bundle: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a readable zip container.
    #[error("Malformed bundle: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Outcome of scanning a library's packed bundle.
#[derive(Debug)]
pub enum ArchiveScan {
    /// The bundle was read; these are the synthesized jar paths.
    Found(Vec<PathBuf>),
    /// No bundle, or the bundle path is not a regular file.
    NotFound,
    /// The bundle exists but could not be read.
    Unreadable(ArchiveError),
}

impl ArchiveScan {
    /// Jar paths, treating every non-`Found` state as empty.
    pub fn into_jars(self) -> Vec<PathBuf> {
        match self {
            Self::Found(jars) => jars,
            Self::NotFound | Self::Unreadable(_) => Vec::new(),
        }
    }
}

/// Where jars live inside a bundle and inside its exploded folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLayout {
    /// Entry prefix marking a local jar inside the bundle.
    pub libs_prefix: String,
    /// File extension of a jar entry.
    pub jar_extension: String,
    /// Subfolder of the exploded folder that receives the jars.
    pub jars_folder: String,
}

impl Default for ArchiveLayout {
    fn default() -> Self {
        Self {
            libs_prefix: "libs/".to_string(),
            jar_extension: ".jar".to_string(),
            jars_folder: FD_JARS.to_string(),
        }
    }
}

impl ArchiveLayout {
    /// Whether a bundle entry name is a local jar.
    pub fn is_local_jar(&self, entry_name: &str) -> bool {
        entry_name.starts_with(&self.libs_prefix) && entry_name.ends_with(&self.jar_extension)
    }

    /// Path the entry will occupy once `folder` is exploded.
    ///
    /// `None` when the entry name has `.` or `..` segments, which could
    /// land outside the jars folder.
    pub fn extracted_path(&self, folder: &Path, entry_name: &str) -> Option<PathBuf> {
        let mut path = folder.join(&self.jars_folder);
        for segment in entry_name.split(['/', '\\']).filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }
}

/// Resolves the local jars a library contributes.
///
/// Excludes the library's own classes jar and anything its dependencies
/// contribute. Must never fail: lookups that cannot complete return an
/// empty list.
pub trait ArtifactResolver: Send + Sync {
    /// Local jars of `library`.
    fn local_jars(&self, library: &LibraryNode) -> Vec<PathBuf>;
}

impl<R: ArtifactResolver + ?Sized> ArtifactResolver for Arc<R> {
    fn local_jars(&self, library: &LibraryNode) -> Vec<PathBuf> {
        (**self).local_jars(library)
    }
}

/// File-system backed [`ArtifactResolver`].
#[derive(Debug, Clone, Default)]
pub struct LocalArtifactResolver {
    layout: ArchiveLayout,
}

impl LocalArtifactResolver {
    /// Resolver using the standard bundle layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver using a custom layout.
    pub fn with_layout(layout: ArchiveLayout) -> Self {
        Self { layout }
    }

    /// The layout in use.
    pub fn layout(&self) -> &ArchiveLayout {
        &self.layout
    }

    /// Scan the packed bundle of `library`, ignoring its exploded folder.
    pub fn scan_bundle(&self, library: &LibraryNode) -> ArchiveScan {
        let Some(bundle) = library.bundle() else {
            return ArchiveScan::NotFound;
        };
        if !bundle.is_file() {
            return ArchiveScan::NotFound;
        }

        match self.read_jar_entries(bundle, library.folder()) {
            Ok(jars) => ArchiveScan::Found(jars),
            Err(e) => ArchiveScan::Unreadable(e),
        }
    }

    // The archive and its file handle are dropped on every return path.
    fn read_jar_entries(&self, bundle: &Path, folder: &Path) -> Result<Vec<PathBuf>, ArchiveError> {
        let file = File::open(bundle)?;
        let mut zip = ZipArchive::new(file)?;

        let mut jars = Vec::new();
        for index in 0..zip.len() {
            let entry = zip.by_index_raw(index)?;
            let name = entry.name();
            if !self.layout.is_local_jar(name) {
                continue;
            }
            match self.layout.extracted_path(folder, name) {
                Some(path) => {
                    trace!(bundle = %bundle.display(), entry = name, "Found local jar in bundle");
                    jars.push(path);
                }
                None => {
                    trace!(bundle = %bundle.display(), entry = name, "Skipping jar entry with relative segments");
                }
            }
        }
        Ok(jars)
    }
}

impl ArtifactResolver for LocalArtifactResolver {
    fn local_jars(&self, library: &LibraryNode) -> Vec<PathBuf> {
        if library.folder().is_dir() {
            return library.local_jars.clone();
        }

        match self.scan_bundle(library) {
            ArchiveScan::Found(jars) => {
                debug!(
                    folder = %library.folder().display(),
                    count = jars.len(),
                    "Resolved local jars from unexploded bundle"
                );
                jars
            }
            ArchiveScan::NotFound => Vec::new(),
            ArchiveScan::Unreadable(e) => {
                debug!(
                    folder = %library.folder().display(),
                    error = %e,
                    "Bundle unreadable, assuming no local jars"
                );
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_zip_file(path: &Path, entries: &[&str]) {
        let mut zip = zip::ZipWriter::new(File::create(path).unwrap());
        let options = SimpleFileOptions::default();
        for name in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(b"PK").unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_bundle_fallback_when_not_exploded() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("widgets.aar");
        write_zip_file(&bundle, &["libs/foo.jar", "libs/bar/baz.jar", "assets/x.png"]);

        let folder = dir.path().join("exploded/widgets");
        let library = LibraryNode::new(&folder).with_bundle(&bundle);

        let jars = LocalArtifactResolver::new().local_jars(&library);
        assert_eq!(
            jars,
            vec![
                folder.join("jars").join("libs").join("foo.jar"),
                folder.join("jars").join("libs").join("bar").join("baz.jar"),
            ]
        );
    }

    #[test]
    fn test_exploded_folder_wins() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("widgets.aar");
        write_zip_file(&bundle, &["libs/foo.jar"]);

        let folder = dir.path().join("exploded");
        std::fs::create_dir_all(&folder).unwrap();
        let declared = vec![folder.join("jars/libs/declared.jar")];
        let library = LibraryNode::new(&folder)
            .with_bundle(&bundle)
            .with_local_jars(declared.clone());

        assert_eq!(LocalArtifactResolver::new().local_jars(&library), declared);
    }

    #[test]
    fn test_nothing_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let library = LibraryNode::new(dir.path().join("nope"))
            .with_bundle(dir.path().join("nope.aar"));

        let resolver = LocalArtifactResolver::new();
        assert!(matches!(resolver.scan_bundle(&library), ArchiveScan::NotFound));
        assert!(resolver.local_jars(&library).is_empty());

        let unbundled = LibraryNode::new(dir.path().join("nope"));
        assert!(matches!(resolver.scan_bundle(&unbundled), ArchiveScan::NotFound));
    }

    #[test]
    fn test_bundle_path_is_directory() {
        let dir = tempfile::tempdir().unwrap();
        let library = LibraryNode::new(dir.path().join("nope")).with_bundle(dir.path());
        assert!(matches!(
            LocalArtifactResolver::new().scan_bundle(&library),
            ArchiveScan::NotFound
        ));
    }

    #[test]
    fn test_corrupt_bundle_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("broken.aar");
        std::fs::write(&bundle, b"definitely not a zip").unwrap();
        let library = LibraryNode::new(dir.path().join("exploded")).with_bundle(&bundle);

        let resolver = LocalArtifactResolver::new();
        let scan = resolver.scan_bundle(&library);
        assert!(matches!(scan, ArchiveScan::Unreadable(ArchiveError::Zip(_))));
        assert!(scan.into_jars().is_empty());
        assert!(resolver.local_jars(&library).is_empty());
    }

    #[test]
    fn test_bundle_without_libs() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("plain.aar");
        write_zip_file(&bundle, &["classes.jar", "AndroidManifest.xml", "libsx/foo.jar"]);
        let library = LibraryNode::new(dir.path().join("exploded")).with_bundle(&bundle);

        let scan = LocalArtifactResolver::new().scan_bundle(&library);
        assert!(matches!(scan, ArchiveScan::Found(ref jars) if jars.is_empty()));
    }

    #[test]
    fn test_custom_layout() {
        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("custom.aar");
        write_zip_file(&bundle, &["vendor/a.jar", "libs/b.jar"]);
        let folder = dir.path().join("exploded");
        let library = LibraryNode::new(&folder).with_bundle(&bundle);

        let resolver = LocalArtifactResolver::with_layout(ArchiveLayout {
            libs_prefix: "vendor/".to_string(),
            jar_extension: ".jar".to_string(),
            jars_folder: "out".to_string(),
        });
        assert_eq!(
            resolver.local_jars(&library),
            vec![folder.join("out").join("vendor").join("a.jar")]
        );
    }

    #[test]
    fn test_extracted_path_normalizes_separators() {
        let layout = ArchiveLayout::default();
        assert_eq!(
            layout.extracted_path(Path::new("/e"), "libs\\nested/deep.jar"),
            Some(PathBuf::from("/e/jars/libs/nested/deep.jar"))
        );
        assert!(layout.is_local_jar("libs/a.jar"));
        assert!(!layout.is_local_jar("libs/a.jar.sha1"));
        assert!(!layout.is_local_jar("assets/libs/a.jar"));
    }

    #[test]
    fn test_relative_segments_stay_inside_jars_folder() {
        let layout = ArchiveLayout::default();
        let folder = Path::new("/e");
        assert_eq!(layout.extracted_path(folder, "libs/../../evil.jar"), None);
        assert_eq!(layout.extracted_path(folder, "libs\\..\\evil.jar"), None);
        assert_eq!(layout.extracted_path(folder, "libs/./a.jar"), None);
        assert_eq!(
            layout.extracted_path(folder, "libs/..hidden.jar"),
            Some(PathBuf::from("/e/jars/libs/..hidden.jar"))
        );

        let dir = tempfile::tempdir().unwrap();
        let bundle = dir.path().join("sneaky.aar");
        write_zip_file(&bundle, &["libs/../../evil.jar", "libs/ok.jar"]);
        let exploded = dir.path().join("exploded");
        let library = LibraryNode::new(&exploded).with_bundle(&bundle);

        let jars = LocalArtifactResolver::new().local_jars(&library);
        assert_eq!(jars, vec![exploded.join("jars").join("libs").join("ok.jar")]);
        assert!(jars.iter().all(|jar| jar.starts_with(exploded.join("jars"))));
    }
}

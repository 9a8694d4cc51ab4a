//! Memoized conversion of library graphs.
//!
//! ## Guarantees
//!
//! - Each distinct [`LibraryKey`] is converted at most once per cache
//!   lifetime, however many parents reach it.
//! - Every parent holding the same dependency holds the same `Arc`.
//! - Conversions are serialized behind one lock, so two callers racing on
//!   the same key observe the same instance.
//! - Cycles terminate: an edge leading back to a library that is still
//!   being converted is cut and recorded on the descendant.
//!
//! ## Algorithm
//!
//! 1. Look the key up in the cache; a hit ends the walk for that subtree
//! 2. Mark the key in progress
//! 3. Convert dependencies depth-first (post-order)
//! 4. Resolve local jars through the [`ArtifactResolver`]
//! 5. Build the [`ConvertedLibrary`], publish it, unmark the key

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::resolver::{ArtifactResolver, LocalArtifactResolver};
use crate::store::LibraryStore;
use crate::types::{ConvertedLibrary, LibraryKey, LibraryNode};

/// Cache statistics.
///
/// Counters are cumulative over the cache's lifetime and survive
/// [`SnapshotCache::clear`]; `entries` reflects the current contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of converted libraries held.
    pub entries: usize,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Libraries converted.
    pub conversions: u64,
    /// Calls made to the artifact resolver.
    pub artifact_scans: u64,
    /// Dependency edges cut because they closed a cycle.
    pub cycles_cut: u64,
}

/// Create-on-miss cache from library identity to converted library.
///
/// Thread-safe. Each instance is independent; there is no global cache.
///
/// # Example
///
/// ```rust,ignore
/// let cache = SnapshotCache::new();
/// let converted = cache.convert_graph(&store, &variant.libraries);
/// ```
pub struct SnapshotCache<R: ArtifactResolver = LocalArtifactResolver> {
    resolver: R,
    entries: Mutex<HashMap<LibraryKey, Arc<ConvertedLibrary>>>,
    hits: AtomicU64,
    conversions: AtomicU64,
    artifact_scans: AtomicU64,
    cycles_cut: AtomicU64,
}

impl SnapshotCache<LocalArtifactResolver> {
    /// Cache backed by the file-system resolver.
    pub fn new() -> Self {
        Self::with_resolver(LocalArtifactResolver::new())
    }
}

impl Default for SnapshotCache<LocalArtifactResolver> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ArtifactResolver> SnapshotCache<R> {
    /// Cache backed by a custom resolver.
    pub fn with_resolver(resolver: R) -> Self {
        Self {
            resolver,
            entries: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            conversions: AtomicU64::new(0),
            artifact_scans: AtomicU64::new(0),
            cycles_cut: AtomicU64::new(0),
        }
    }

    /// The resolver used for local jars.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Convert each root, reusing cached conversions.
    ///
    /// Roots unknown to both the cache and `store` are skipped, so the
    /// result may be shorter than `roots`.
    pub fn convert_graph<S>(&self, store: &S, roots: &[LibraryKey]) -> Vec<Arc<ConvertedLibrary>>
    where
        S: LibraryStore + ?Sized,
    {
        let mut entries = self.entries.lock();
        let mut walk = Walk::new(self, store, &mut entries);
        let converted: Vec<_> = roots
            .iter()
            .filter_map(|key| walk.visit(key).converted())
            .collect();
        converted
    }

    /// Convert a single library, reusing the cached conversion if any.
    pub fn get_or_convert<S>(&self, store: &S, key: &LibraryKey) -> Option<Arc<ConvertedLibrary>>
    where
        S: LibraryStore + ?Sized,
    {
        let mut entries = self.entries.lock();
        let visit = Walk::new(self, store, &mut entries).visit(key);
        visit.converted()
    }

    /// Cached conversion for `key`, without converting on a miss.
    pub fn get(&self, key: &LibraryKey) -> Option<Arc<ConvertedLibrary>> {
        self.entries.lock().get(key).cloned()
    }

    /// Number of cached conversions.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache holds nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every cached conversion.
    ///
    /// Values handed out earlier stay valid; later calls convert afresh.
    pub fn clear(&self) {
        let mut entries = self.entries.lock();
        let dropped = entries.len();
        entries.clear();
        info!(dropped, "Cleared snapshot cache");
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            conversions: self.conversions.load(Ordering::Relaxed),
            artifact_scans: self.artifact_scans.load(Ordering::Relaxed),
            cycles_cut: self.cycles_cut.load(Ordering::Relaxed),
        }
    }
}

/// Result of visiting one key during a walk.
enum Visit {
    Converted(Arc<ConvertedLibrary>),
    /// The key is an ancestor still being converted.
    InProgress,
    /// Neither cached nor known to the store.
    Missing,
}

impl Visit {
    fn converted(self) -> Option<Arc<ConvertedLibrary>> {
        match self {
            Self::Converted(library) => Some(library),
            Self::InProgress | Self::Missing => None,
        }
    }
}

/// A library whose dependencies are still being converted.
struct Frame<'s> {
    key: LibraryKey,
    source: &'s LibraryNode,
    /// Index of the next dependency to visit.
    next: usize,
    dependencies: Vec<Arc<ConvertedLibrary>>,
    cyclic_dependencies: Vec<LibraryKey>,
}

/// What entering a key produced.
enum Enter<'s> {
    Frame(Frame<'s>),
    Done(Visit),
}

/// One depth-first walk, run while holding the cache lock.
///
/// Uses an explicit frame stack, so chain depth is bounded by memory rather
/// than by the thread's stack.
struct Walk<'a, R: ArtifactResolver, S: LibraryStore + ?Sized> {
    cache: &'a SnapshotCache<R>,
    store: &'a S,
    entries: &'a mut HashMap<LibraryKey, Arc<ConvertedLibrary>>,
    in_progress: HashSet<LibraryKey>,
}

impl<'a, R: ArtifactResolver, S: LibraryStore + ?Sized> Walk<'a, R, S> {
    fn new(
        cache: &'a SnapshotCache<R>,
        store: &'a S,
        entries: &'a mut HashMap<LibraryKey, Arc<ConvertedLibrary>>,
    ) -> Self {
        Self {
            cache,
            store,
            entries,
            in_progress: HashSet::new(),
        }
    }

    fn visit(&mut self, key: &LibraryKey) -> Visit {
        let mut stack = match self.enter(key) {
            Enter::Frame(frame) => vec![frame],
            Enter::Done(visit) => return visit,
        };

        while let Some(top) = stack.last_mut() {
            let source = top.source;
            if let Some(child) = source.dependencies.get(top.next) {
                top.next += 1;
                match self.enter(child) {
                    Enter::Frame(frame) => stack.push(frame),
                    Enter::Done(Visit::Converted(library)) => top.dependencies.push(library),
                    Enter::Done(Visit::InProgress) => {
                        warn!(library = %top.key, dependency = %child, "Dependency cycle, cutting edge");
                        self.cache.cycles_cut.fetch_add(1, Ordering::Relaxed);
                        top.cyclic_dependencies.push(child.clone());
                    }
                    Enter::Done(Visit::Missing) => {}
                }
                continue;
            }

            let Some(frame) = stack.pop() else { break };
            let converted = self.finish(frame);
            match stack.last_mut() {
                Some(parent) => parent.dependencies.push(converted),
                None => return Visit::Converted(converted),
            }
        }
        Visit::Missing
    }

    /// Resolve `key` from the cache, or open a frame to convert it.
    fn enter(&mut self, key: &LibraryKey) -> Enter<'a> {
        if let Some(library) = self.entries.get(key) {
            self.cache.hits.fetch_add(1, Ordering::Relaxed);
            return Enter::Done(Visit::Converted(Arc::clone(library)));
        }
        if self.in_progress.contains(key) {
            return Enter::Done(Visit::InProgress);
        }
        let store: &'a S = self.store;
        let Some(source) = store.library(key) else {
            debug!(library = %key, "Library not found in store, skipping");
            return Enter::Done(Visit::Missing);
        };

        self.in_progress.insert(key.clone());
        Enter::Frame(Frame {
            key: key.clone(),
            source,
            next: 0,
            dependencies: Vec::with_capacity(source.dependencies.len()),
            cyclic_dependencies: Vec::new(),
        })
    }

    /// Convert a library whose dependencies are all done, and publish it.
    fn finish(&mut self, frame: Frame<'a>) -> Arc<ConvertedLibrary> {
        // Computed even when the bundle has not been exploded yet.
        self.cache.artifact_scans.fetch_add(1, Ordering::Relaxed);
        let local_jars = self.cache.resolver.local_jars(frame.source);

        let converted = Arc::new(ConvertedLibrary::from_node(
            frame.source,
            frame.dependencies,
            local_jars,
            frame.cyclic_dependencies,
        ));
        self.cache.conversions.fetch_add(1, Ordering::Relaxed);
        debug!(
            library = %frame.key,
            dependencies = converted.dependencies().len(),
            local_jars = converted.local_jars().len(),
            "Converted library"
        );

        self.in_progress.remove(&frame.key);
        self.entries.insert(frame.key, Arc::clone(&converted));
        converted
    }
}

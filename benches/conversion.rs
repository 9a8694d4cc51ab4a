//! Performance benchmarks for graph conversion.
//!
//! Run with: `cargo bench --bench conversion`
//!
//! ## Scenarios
//!
//! | Operation | Notes |
//! |-----------|-------|
//! | Cold conversion | Layered graph where every node depends on the whole next layer |
//! | Warm conversion | Same roots, every lookup a cache hit |
//! | Snapshot build | Cold conversion plus jar classification |
//! | Contention | Threads racing on the same roots |

use criterion::{
    black_box, criterion_group, criterion_main,
    BenchmarkId, Criterion, Throughput,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use dependency_snapshot::{
    ArtifactResolver, InMemoryLibraryStore, JarDependency, LibraryKey, LibraryNode,
    MavenCoordinates, SnapshotCache, StaticBuildTools, VariantDependencies,
};

/// Resolver that never touches the disk.
struct DeclaredJars;

impl ArtifactResolver for DeclaredJars {
    fn local_jars(&self, library: &LibraryNode) -> Vec<PathBuf> {
        library.local_jars.clone()
    }
}

fn key(layer: usize, index: usize) -> LibraryKey {
    LibraryKey::coordinates(MavenCoordinates::new("bench", format!("l{}n{}", layer, index), "1"))
}

/// Build `layers` layers of `width` nodes, each depending on the full next layer.
///
/// The number of root-to-leaf paths is `width^layers`; distinct nodes are
/// `width * layers`.
fn make_layered_store(layers: usize, width: usize) -> (InMemoryLibraryStore, Vec<LibraryKey>) {
    let mut store = InMemoryLibraryStore::new();
    for layer in 0..layers {
        for index in 0..width {
            let mut node = LibraryNode::new(format!("/exploded/l{}n{}", layer, index))
                .with_coordinates(MavenCoordinates::new("bench", format!("l{}n{}", layer, index), "1"))
                .with_local_jars(vec![PathBuf::from(format!("/jars/l{}n{}.jar", layer, index))]);
            if layer + 1 < layers {
                for next in 0..width {
                    node = node.with_dependency(key(layer + 1, next));
                }
            }
            store.add_library(node);
        }
    }
    let roots = (0..width).map(|index| key(0, index)).collect();
    (store, roots)
}

/// Benchmark cold conversion (fresh cache every iteration).
fn bench_cold_conversion(c: &mut Criterion) {
    let mut group = c.benchmark_group("cold_conversion");

    for layers in [4, 8, 16] {
        let (store, roots) = make_layered_store(layers, 8);

        group.throughput(Throughput::Elements((layers * 8) as u64));
        group.bench_with_input(BenchmarkId::new("layers", layers), &roots, |b, roots| {
            b.iter(|| {
                let cache = SnapshotCache::with_resolver(DeclaredJars);
                cache.convert_graph(&store, black_box(roots))
            })
        });
    }

    group.finish();
}

/// Benchmark warm conversion (all roots cached).
fn bench_warm_conversion(c: &mut Criterion) {
    let (store, roots) = make_layered_store(16, 8);
    let cache = SnapshotCache::with_resolver(DeclaredJars);
    cache.convert_graph(&store, &roots);

    c.bench_function("warm_conversion", |b| {
        b.iter(|| cache.convert_graph(&store, black_box(&roots)))
    });
}

/// Benchmark a full snapshot build.
fn bench_build_snapshot(c: &mut Criterion) {
    let (store, roots) = make_layered_store(8, 8);
    let mut variant = VariantDependencies::new("bench");
    variant.libraries = roots;
    variant.jar_dependencies = (0..100)
        .map(|i| {
            let jar = JarDependency::new(format!("/repo/dep{}.jar", i));
            if i % 10 == 0 {
                jar.with_project(format!(":module{}", i))
            } else {
                jar
            }
        })
        .collect();
    let tools = StaticBuildTools::none();

    c.bench_function("build_snapshot", |b| {
        b.iter(|| {
            let cache = SnapshotCache::with_resolver(DeclaredJars);
            cache.build_snapshot(&store, black_box(&variant), &tools)
        })
    });
}

/// Benchmark multi-threaded access to a shared cache.
fn bench_cache_contention(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_contention");
    let (store, roots) = make_layered_store(8, 8);
    let store = Arc::new(store);
    let roots = Arc::new(roots);

    for num_threads in [1, 2, 4, 8] {
        group.throughput(Throughput::Elements(num_threads as u64));
        group.bench_with_input(
            BenchmarkId::new("threads", num_threads),
            &num_threads,
            |b, &n| {
                b.iter(|| {
                    let cache = Arc::new(SnapshotCache::with_resolver(DeclaredJars));
                    let handles: Vec<_> = (0..n)
                        .map(|_| {
                            let cache = Arc::clone(&cache);
                            let store = Arc::clone(&store);
                            let roots = Arc::clone(&roots);
                            thread::spawn(move || {
                                let converted = cache.convert_graph(&*store, black_box(&roots));
                                assert_eq!(converted.len(), roots.len());
                            })
                        })
                        .collect();

                    for h in handles {
                        h.join().unwrap();
                    }
                })
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_cold_conversion,
    bench_warm_conversion,
    bench_build_snapshot,
    bench_cache_contention,
);
criterion_main!(benches);

//! Snapshot Tool Binary
//!
//! Reads a resolved variant description (JSON) and prints its dependency
//! snapshot.
//!
//! ## Input
//!
//! ```json
//! {
//!   "libraries": [ { "folder": "...", "bundle": "...", "dependencies": [...] } ],
//!   "variant": { "name": "debug", "libraries": [...], "jar_dependencies": [...] }
//! }
//! ```
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RENDERSCRIPT_SUPPORT_JAR`: support jar offered by the build tools (optional)
//! - `RUST_LOG`: Log level filter (default: info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: pretty)
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin snapshot_tool --features tool -- variant.json [--text]
//! ```

use std::path::PathBuf;
use std::time::Instant;

use serde::Deserialize;
use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use dependency_snapshot::{
    InMemoryLibraryStore, LibraryNode, SnapshotCache, StaticBuildTools, VariantDependencies,
};

/// Errors surfaced to the command line.
#[derive(Debug, thiserror::Error)]
enum ToolError {
    #[error("Usage: snapshot_tool <variant.json> [--text]")]
    Usage,
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid variant description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Canonical(#[from] dependency_snapshot::CanonicalError),
}

/// Tool input: every known library plus the variant to snapshot.
#[derive(Debug, Deserialize)]
struct VariantInput {
    #[serde(default)]
    libraries: Vec<LibraryNode>,
    variant: VariantDependencies,
}

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "snapshot_tool=info,dependency_snapshot=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

fn run() -> Result<(), ToolError> {
    let mut args = std::env::args().skip(1);
    let path = PathBuf::from(args.next().ok_or(ToolError::Usage)?);
    let text = match args.next().as_deref() {
        None => false,
        Some("--text") => true,
        Some(_) => return Err(ToolError::Usage),
    };

    let raw = std::fs::read_to_string(&path).map_err(|source| ToolError::Read {
        path: path.clone(),
        source,
    })?;
    let input: VariantInput = serde_json::from_str(&raw)?;

    let build_tools = match std::env::var("RENDERSCRIPT_SUPPORT_JAR") {
        Ok(jar) if !jar.is_empty() => StaticBuildTools::with_renderscript_support_jar(jar),
        _ => StaticBuildTools::none(),
    };

    let store: InMemoryLibraryStore = input.libraries.into_iter().collect();
    let dangling = store.dangling_dependencies().len();
    info!(
        libraries = store.num_libraries(),
        dangling,
        variant = %input.variant.name,
        "Loaded variant description"
    );

    let start = Instant::now();
    let cache = SnapshotCache::new();
    let snapshot = cache.build_snapshot(&store, &input.variant, &build_tools);
    let stats = cache.stats();
    let fingerprint = snapshot.fingerprint()?;

    info!(
        latency_ms = start.elapsed().as_millis() as u64,
        conversions = stats.conversions,
        cycles_cut = stats.cycles_cut,
        fingerprint = %fingerprint,
        "Snapshot built"
    );

    if text {
        println!("{}", snapshot);
    } else {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn main() -> std::process::ExitCode {
    init_tracing();

    match run() {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "snapshot_tool failed");
            eprintln!("{}", e);
            std::process::ExitCode::FAILURE
        }
    }
}

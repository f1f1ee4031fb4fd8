//! Incremental loading: discovering partition files and merging them into one index.

pub mod snapshot;

use crate::error::IndexError;
use crate::partition::{PartitionKey, PartitionSource};
use crate::store::{EntryStore, LoadSummary, SearchIndex};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

pub use snapshot::{fingerprint, load_or_build};

/// Load every source into a fresh index.
///
/// Sources may come in any order. The first unreadable or undecodable source
/// aborts the load; malformed records inside a readable source are skipped.
pub fn load_all(sources: &[PartitionSource]) -> Result<SearchIndex, IndexError> {
    let start = Instant::now();
    let mut store = EntryStore::new();
    let mut total = LoadSummary::default();

    for source in sources {
        let partition = source.read().inspect_err(|e| {
            tracing::error!("Aborting index load: {}", e);
        })?;
        let summary = store.load(&partition);
        total.loaded += summary.loaded;
        total.skipped += summary.skipped;
    }

    let index = store.into_index();
    tracing::info!(
        "Built search index: {} partitions, {} keywords, {} entries, {} targets ({} records skipped) in {:?}",
        sources.len(),
        index.keyword_count(),
        index.len(),
        index.target_count(),
        total.skipped,
        start.elapsed()
    );
    Ok(index)
}

/// Run [`load_or_build`] on the blocking pool, giving up after `timeout`.
///
/// The in-flight load is not cancelled on timeout; its result is discarded.
pub async fn load_all_with_timeout(
    sources: Vec<PartitionSource>,
    snapshot: Option<PathBuf>,
    timeout: Duration,
) -> Result<SearchIndex, IndexError> {
    let task = tokio::task::spawn_blocking(move || load_or_build(&sources, snapshot.as_deref()));
    match tokio::time::timeout(timeout, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(IndexError::partition_load("<loader>", join_error)),
        Err(_) => {
            tracing::warn!("Index load exceeded {:?}", timeout);
            Err(IndexError::LoadTimeout { elapsed: timeout })
        }
    }
}

/// Expand files and directories into partition sources.
///
/// Files are taken as given. Directories are walked (honouring ignore files) for
/// `.json` partitions and for `.js` files named like generated buckets
/// (`functions_2.js`), which leaves out the front-end's own `search.js` and
/// `searchdata.js`. Results are sorted by path.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PartitionSource>, IndexError> {
    let mut found = Vec::new();

    for path in paths {
        if path.is_file() {
            found.push(path.clone());
        } else if path.is_dir() {
            let before = found.len();
            for entry in WalkBuilder::new(path).build() {
                let entry = entry.map_err(|e| IndexError::partition_load(path.display().to_string(), e))?;
                let candidate = entry.path();
                if entry.file_type().is_some_and(|t| t.is_file()) && is_partition_file(candidate) {
                    found.push(candidate.to_path_buf());
                }
            }
            tracing::debug!(
                "Discovered {} partitions under {}",
                found.len() - before,
                path.display()
            );
        } else {
            return Err(IndexError::partition_load(
                path.display().to_string(),
                "no such file or directory",
            ));
        }
    }

    found.sort();
    found.dedup();
    Ok(found.into_iter().map(PartitionSource::File).collect())
}

fn is_partition_file(path: &Path) -> bool {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => true,
        Some("js") => PartitionKey::from_path(path).bucket().is_some(),
        _ => false,
    }
}

//! On-disk snapshots of a built index, keyed by a fingerprint of its sources.
//!
//! A snapshot is reused only when the fingerprint stored inside it matches the
//! current source set. Stale or unreadable snapshots are removed and rebuilt.

use super::load_all;
use crate::error::{IndexError, Result};
use crate::partition::PartitionSource;
use crate::store::SearchIndex;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::UNIX_EPOCH;
use xxhash_rust::xxh3::Xxh3;

/// Bumped whenever the serialized layout changes.
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    fingerprint: u64,
    index: SearchIndex,
}

/// Serialization twin of [`Snapshot`] that borrows the index.
#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    fingerprint: u64,
    index: &'a SearchIndex,
}

/// Hash the identity of a source set: path, length, and mtime of each file, or
/// the text of in-memory sources. Independent of source order.
pub fn fingerprint(sources: &[PartitionSource]) -> std::result::Result<u64, IndexError> {
    let mut parts = Vec::with_capacity(sources.len());

    for source in sources {
        let mut hasher = Xxh3::new();
        hasher.update(source.describe().as_bytes());
        match source {
            PartitionSource::File(path) => {
                let meta = std::fs::metadata(path)
                    .map_err(|e| IndexError::partition_load(source.describe(), e))?;
                hasher.update(&meta.len().to_le_bytes());
                let mtime = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                    .map_or(0, |d| d.as_nanos());
                hasher.update(&mtime.to_le_bytes());
            }
            PartitionSource::Memory { text, .. } => hasher.update(text.as_bytes()),
        }
        parts.push(hasher.digest());
    }

    parts.sort_unstable();
    let mut combined = Xxh3::new();
    for part in parts {
        combined.update(&part.to_le_bytes());
    }
    Ok(combined.digest())
}

/// Read a snapshot if it exists and matches `expected`.
pub fn load_snapshot(path: &Path, expected: u64) -> Option<SearchIndex> {
    let bytes = std::fs::read(path).ok()?;

    match postcard::from_bytes::<Snapshot>(&bytes) {
        Ok(snapshot) if snapshot.version == SNAPSHOT_VERSION && snapshot.fingerprint == expected => {
            tracing::debug!("Using cached index snapshot at {}", path.display());
            Some(snapshot.index)
        }
        Ok(_) => {
            tracing::info!(
                "Snapshot stale, will rebuild index (file: {})",
                path.display()
            );
            let _ = std::fs::remove_file(path);
            None
        }
        Err(e) => {
            tracing::warn!("Failed to deserialize snapshot at {}: {}", path.display(), e);
            let _ = std::fs::remove_file(path);
            None
        }
    }
}

/// Write a snapshot, replacing any previous file atomically.
pub fn store_snapshot(path: &Path, fingerprint: u64, index: &SearchIndex) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let snapshot = SnapshotRef {
        version: SNAPSHOT_VERSION,
        fingerprint,
        index,
    };
    let bytes = postcard::to_stdvec(&snapshot).context("Failed to serialize index snapshot")?;

    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)
        .with_context(|| format!("Failed to write snapshot to {}", tmp.display()))?;
    std::fs::rename(&tmp, path)
        .with_context(|| format!("Failed to move snapshot into {}", path.display()))?;

    tracing::debug!("Cached index snapshot to {}", path.display());
    Ok(())
}

/// Load from a matching snapshot, or build from sources and refresh the snapshot.
///
/// Snapshot problems are logged and never fail the load.
pub fn load_or_build(
    sources: &[PartitionSource],
    snapshot: Option<&Path>,
) -> std::result::Result<SearchIndex, IndexError> {
    let Some(snapshot) = snapshot else {
        return load_all(sources);
    };

    let fingerprint = fingerprint(sources)?;
    if let Some(index) = load_snapshot(snapshot, fingerprint) {
        return Ok(index);
    }

    let index = load_all(sources)?;
    if let Err(e) = store_snapshot(snapshot, fingerprint, &index) {
        tracing::warn!("{:#}", e);
    }
    Ok(index)
}

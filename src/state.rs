//! Shared server state: the active index plus recently loaded ones.
//!
//! A published [`SearchIndex`] is never mutated. Loading a different source set
//! builds a new index and swaps the `Arc`; queries already holding the old one
//! finish against it undisturbed.

use crate::config::Config;
use crate::error::IndexError;
use crate::loader::{discover, fingerprint, load_all_with_timeout};
use crate::store::SearchIndex;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

/// An index together with the inputs it was built from.
#[derive(Debug)]
pub struct LoadedIndex {
    pub index: SearchIndex,
    pub paths: Vec<PathBuf>,
    pub partition_files: usize,
    pub fingerprint: u64,
}

pub struct IndexState {
    active: RwLock<Option<Arc<LoadedIndex>>>,
    /// Recently built indices keyed by source fingerprint.
    recent: Mutex<LruCache<u64, Arc<LoadedIndex>>>,
    config: Config,
}

impl std::fmt::Debug for IndexState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexState")
            .field("has_index", &self.active.try_read().map(|a| a.is_some()).ok())
            .field("sources", &self.config.index.sources)
            .finish_non_exhaustive()
    }
}

impl IndexState {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.index.cached_indices).unwrap_or(NonZeroUsize::MIN);
        Self {
            active: RwLock::new(None),
            recent: Mutex::new(LruCache::new(capacity)),
            config,
        }
    }

    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The index queries should run against, if one has been loaded.
    pub async fn current(&self) -> Option<Arc<LoadedIndex>> {
        self.active.read().await.clone()
    }

    /// Load the sources named in the config, using the configured snapshot.
    pub async fn load_configured(&self) -> Result<Arc<LoadedIndex>, IndexError> {
        let paths = self.config.index.sources.clone();
        let snapshot = self.config.index.snapshot.clone();
        self.load(paths, snapshot).await
    }

    /// Discover and load `paths`, then make the result the active index.
    ///
    /// A source set loaded recently (same fingerprint) is reused from memory.
    /// On failure the previously active index stays in place.
    pub async fn load(
        &self,
        paths: Vec<PathBuf>,
        snapshot: Option<PathBuf>,
    ) -> Result<Arc<LoadedIndex>, IndexError> {
        self.load_with_timeout(paths, snapshot, self.config.index.load_timeout())
            .await
    }

    /// [`load`](Self::load) with an explicit deadline instead of the configured one.
    pub async fn load_with_timeout(
        &self,
        paths: Vec<PathBuf>,
        snapshot: Option<PathBuf>,
        timeout: Duration,
    ) -> Result<Arc<LoadedIndex>, IndexError> {
        let sources = discover(&paths)?;
        let fingerprint = fingerprint(&sources)?;

        let cached = self.recent.lock().await.get(&fingerprint).cloned();
        let loaded = if let Some(loaded) = cached {
            tracing::debug!("Reusing in-memory index for {} partitions", sources.len());
            loaded
        } else {
            let partition_files = sources.len();
            let index = load_all_with_timeout(sources, snapshot, timeout).await?;
            let loaded = Arc::new(LoadedIndex {
                index,
                paths,
                partition_files,
                fingerprint,
            });
            self.recent.lock().await.put(fingerprint, loaded.clone());
            loaded
        };

        *self.active.write().await = Some(loaded.clone());
        tracing::info!(
            "Active index: {} keywords from {} partition files",
            loaded.index.keyword_count(),
            loaded.partition_files
        );
        Ok(loaded)
    }

    /// Check whether a source set with this fingerprint is held in memory.
    pub async fn is_cached(&self, fingerprint: u64) -> bool {
        self.recent.lock().await.contains(&fingerprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    const BUILD: &str = r#"[["build", "build", [["a.html#1", "icu::LocaleBuilder::build()"]]]]"#;

    #[tokio::test]
    async fn test_state_starts_empty() {
        let state = IndexState::new(Config::default());
        check!(state.current().await.is_none());
    }

    #[tokio::test]
    async fn test_load_sets_active_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("functions_2.json"), BUILD).unwrap();

        let state = IndexState::new(Config::default());
        let loaded = state
            .load(vec![dir.path().to_path_buf()], None)
            .await
            .unwrap();

        check!(loaded.partition_files == 1);
        check!(state.is_cached(loaded.fingerprint).await);
        let_assert!(Some(active) = state.current().await);
        check!(active.index.contains("build"));

        let again = state
            .load(vec![dir.path().to_path_buf()], None)
            .await
            .unwrap();
        check!(Arc::ptr_eq(&loaded, &again));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_index() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("functions_2.json"), BUILD).unwrap();

        let state = IndexState::new(Config::default());
        state
            .load(vec![dir.path().to_path_buf()], None)
            .await
            .unwrap();

        let_assert!(
            Err(IndexError::PartitionLoad { .. }) = state
                .load(vec![dir.path().join("missing")], None)
                .await
        );
        let_assert!(Some(active) = state.current().await);
        check!(active.index.contains("build"));
    }

    #[tokio::test]
    async fn test_timed_out_load_keeps_previous_index() {
        let small = tempfile::tempdir().unwrap();
        std::fs::write(small.path().join("functions_2.json"), BUILD).unwrap();
        let large = tempfile::tempdir().unwrap();
        std::fs::write(large.path().join("all_0.json"), large_partition(100_000)).unwrap();

        let state = IndexState::new(Config::default());
        state
            .load(vec![small.path().to_path_buf()], None)
            .await
            .unwrap();

        let_assert!(
            Err(IndexError::LoadTimeout { elapsed }) = state
                .load_with_timeout(vec![large.path().to_path_buf()], None, Duration::ZERO)
                .await
        );
        check!(elapsed == Duration::ZERO);

        let_assert!(Some(active) = state.current().await);
        check!(active.index.contains("build"));
        check!(active.partition_files == 1);
    }

    fn large_partition(records: usize) -> String {
        let body: Vec<String> = (0..records)
            .map(|i| format!(r#"["kw{i}", "Kw{i}", [["p{i}.html#a", "icu::K{i}"]]]"#))
            .collect();
        format!("[{}]", body.join(","))
    }
}

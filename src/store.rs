//! The entry store and the immutable search index it produces.

use crate::entry::{IndexEntry, RawEntry, Target, normalize_keyword};
use ahash::AHashSet;
use crate::error::IndexError;
use crate::partition::{IndexPartition, PartitionKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, btree_map};

/// Counts reported by [`EntryStore::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Records accepted (new entries plus merges into existing ones).
    pub loaded: usize,
    /// Records rejected as malformed.
    pub skipped: usize,
}

/// Mutable keyword table filled by the loader during startup.
///
/// Entries are bucketed by normalized keyword. Inside a bucket, records with the
/// same display name are merged; differently cased display names (`Format` vs
/// `format`) stay separate entries.
#[derive(Debug, Default)]
pub struct EntryStore {
    entries: BTreeMap<String, Vec<IndexEntry>>,
    partitions: BTreeSet<PartitionKey>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append every valid record of `partition`, skipping malformed ones with a warning.
    pub fn load(&mut self, partition: &IndexPartition) -> LoadSummary {
        let mut summary = LoadSummary::default();
        let key = partition.key();

        for (position, raw) in partition.entries().iter().enumerate() {
            match self.insert_raw(raw.clone(), key.as_str(), position) {
                Ok(()) => summary.loaded += 1,
                Err(e) => {
                    tracing::warn!("Skipping {}", e);
                    summary.skipped += 1;
                }
            }
        }

        self.partitions.insert(key.clone());
        tracing::debug!(
            "Loaded partition '{}': {} records, {} skipped",
            key,
            summary.loaded,
            summary.skipped
        );
        summary
    }

    /// Validate and insert a single record.
    pub fn insert_raw(
        &mut self,
        raw: RawEntry,
        partition: &str,
        position: usize,
    ) -> Result<(), IndexError> {
        let entry = raw.validate(partition, position)?;
        self.insert(entry);
        Ok(())
    }

    /// Insert an entry, merging its targets into an existing entry with the same
    /// keyword and display name.
    ///
    /// A target already held by any entry under the keyword is not added again, so
    /// `get` never returns the same `(page_anchor, owner_signature)` twice. An entry
    /// left with no new targets is dropped.
    pub fn insert(&mut self, mut entry: IndexEntry) {
        let bucket = self.entries.entry(entry.keyword().to_string()).or_default();
        let held: AHashSet<&Target> = bucket.iter().flat_map(IndexEntry::targets).collect();
        entry.retain_targets(|target| !held.contains(target));
        if entry.targets().is_empty() {
            tracing::trace!(
                "Dropped '{}': every target already listed under '{}'",
                entry.display_name(),
                entry.keyword()
            );
            return;
        }

        match bucket
            .iter_mut()
            .find(|existing| existing.display_name() == entry.display_name())
        {
            Some(existing) => {
                let added = existing.merge_targets(entry.targets().iter().cloned());
                tracing::trace!(
                    "Merged '{}' ({} new targets)",
                    entry.display_name(),
                    added
                );
            }
            None => bucket.push(entry),
        }
    }

    /// Exact lookup; empty when the keyword is unknown.
    pub fn get(&self, keyword: &str) -> &[IndexEntry] {
        self.entries
            .get(&normalize_keyword(keyword))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of entries across all keywords.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keyword_count(&self) -> usize {
        self.entries.len()
    }

    pub fn target_count(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .map(|entry| entry.targets().len())
            .sum()
    }

    /// Freeze the store into a read-only index with ranked buckets.
    pub fn into_index(self) -> SearchIndex {
        let mut entries = self.entries;
        for bucket in entries.values_mut() {
            bucket.sort_by(|a, b| {
                b.targets()
                    .len()
                    .cmp(&a.targets().len())
                    .then_with(|| a.display_name().cmp(b.display_name()))
            });
        }
        SearchIndex {
            entries,
            partitions: self.partitions,
        }
    }
}

/// The union of all loaded partitions, ordered by keyword.
///
/// Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    entries: BTreeMap<String, Vec<IndexEntry>>,
    partitions: BTreeSet<PartitionKey>,
}

impl SearchIndex {
    /// Exact lookup; empty when the keyword is unknown.
    ///
    /// Entries sharing a keyword are ordered by target count, most first.
    pub fn get(&self, keyword: &str) -> &[IndexEntry] {
        self.entries
            .get(&normalize_keyword(keyword))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.entries.contains_key(&normalize_keyword(keyword))
    }

    /// Number of entries across all keywords.
    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keyword_count(&self) -> usize {
        self.entries.len()
    }

    pub fn target_count(&self) -> usize {
        self.entries
            .values()
            .flatten()
            .map(|entry| entry.targets().len())
            .sum()
    }

    pub fn partitions(&self) -> impl Iterator<Item = &PartitionKey> {
        self.partitions.iter()
    }

    /// All keywords in lexicographic order.
    pub fn keywords(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Keyword buckets starting at `from`, in order.
    pub(crate) fn buckets_from(&self, from: &str) -> btree_map::Range<'_, String, Vec<IndexEntry>> {
        self.entries.range::<str, _>((
            std::ops::Bound::Included(from),
            std::ops::Bound::Unbounded,
        ))
    }

    pub(crate) fn buckets(&self) -> btree_map::Iter<'_, String, Vec<IndexEntry>> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::{check, let_assert};

    fn raw(keyword: &str, display: &str, targets: &[(&str, &str)]) -> RawEntry {
        RawEntry {
            keyword: Some(keyword.to_string()),
            display_name: Some(display.to_string()),
            targets: Some(targets.iter().map(|(a, o)| Target::new(*a, *o)).collect()),
        }
    }

    fn partition(key: &str, entries: Vec<RawEntry>) -> IndexPartition {
        IndexPartition::new(PartitionKey::new(key), entries)
    }

    #[test]
    fn test_get_absent_is_empty() {
        let store = EntryStore::new();
        check!(store.get("nothing").is_empty());
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let mut store = EntryStore::new();
        store.load(&partition(
            "classes_0",
            vec![raw("bytesink", "ByteSink", &[("c.html#1", "icu::ByteSink")])],
        ));
        check!(store.get("ByteSink").len() == 1);
        check!(store.get(" BYTESINK ").len() == 1);
    }

    #[test]
    fn test_malformed_entry_skipped() {
        let mut store = EntryStore::new();
        let summary = store.load(&partition(
            "functions_2",
            vec![
                raw("before", "before", &[("a.html#1", "icu::Calendar")]),
                RawEntry {
                    keyword: None,
                    display_name: Some("orphan".into()),
                    targets: Some(vec![Target::new("x.html", "X")]),
                },
                raw("build", "build", &[]),
                raw("bydouble", "byDouble", &[("s.html#2", "icu::number::Scale")]),
            ],
        ));

        check!(summary == LoadSummary { loaded: 2, skipped: 2 });
        check!(store.get("before").len() == 1);
        check!(store.get("bydouble").len() == 1);
        check!(store.get("build").is_empty());
    }

    #[test]
    fn test_insert_raw_surfaces_error() {
        let mut store = EntryStore::new();
        let_assert!(
            Err(IndexError::MalformedEntry { position: 3, .. }) =
                store.insert_raw(RawEntry::default(), "p", 3)
        );
        check!(store.is_empty());
    }

    #[test]
    fn test_merge_across_partitions() {
        let mut store = EntryStore::new();
        store.load(&partition(
            "functions_2",
            vec![raw(
                "build",
                "build",
                &[("a.html#1", "icu::LocaleBuilder::build()"), ("b.html#2", "icu::BytesTrieBuilder::build()")],
            )],
        ));
        store.load(&partition(
            "all_2",
            vec![raw(
                "build",
                "build",
                &[("b.html#2", "icu::BytesTrieBuilder::build()"), ("c.html#3", "icu::UCharsTrieBuilder::build()")],
            )],
        ));

        let entries = store.get("build");
        check!(entries.len() == 1);
        let anchors: Vec<&str> = entries[0]
            .targets()
            .iter()
            .map(|t| t.page_anchor.as_str())
            .collect();
        check!(anchors == ["a.html#1", "b.html#2", "c.html#3"]);
    }

    #[test]
    fn test_case_variants_stay_separate() {
        let mut store = EntryStore::new();
        store.load(&partition(
            "all_5",
            vec![
                raw("format", "format", &[("f.html#1", "icu::Format::format()")]),
                raw(
                    "format",
                    "Format",
                    &[("f.html#0", "icu::Format"), ("f.html#9", "icu::Format::Format()")],
                ),
            ],
        ));

        let index = store.into_index();
        let entries = index.get("format");
        check!(entries.len() == 2);
        // More targets rank first inside a keyword.
        check!(entries[0].display_name() == "Format");
        check!(entries[1].display_name() == "format");
        check!(index.keyword_count() == 1);
        check!(index.len() == 2);
        check!(index.target_count() == 3);
    }

    #[test]
    fn test_loading_twice_is_idempotent() {
        let p = partition(
            "functions_2",
            vec![
                raw("build", "build", &[("a.html#1", "A"), ("b.html#2", "B")]),
                raw("before", "before", &[("c.html#3", "icu::Calendar")]),
            ],
        );

        let mut once = EntryStore::new();
        once.load(&p);

        let mut twice = EntryStore::new();
        twice.load(&p);
        twice.load(&p);

        check!(once.into_index() == twice.into_index());
    }

    #[test]
    fn test_partitions_recorded() {
        let mut store = EntryStore::new();
        store.load(&partition("functions_2", vec![]));
        store.load(&partition("classes_1", vec![]));
        let index = store.into_index();
        let keys: Vec<&str> = index.partitions().map(PartitionKey::as_str).collect();
        check!(keys == ["classes_1", "functions_2"]);
    }

    #[test]
    fn test_shared_target_listed_once_across_display_names() {
        let mut store = EntryStore::new();
        store.load(&partition(
            "functions_2",
            vec![raw("build", "build", &[("a.html#1", "icu::X::build()")])],
        ));
        store.load(&partition(
            "all_2",
            vec![raw("build", "Build", &[("a.html#1", "icu::X::build()")])],
        ));

        let pairs: Vec<&Target> = store.get("build").iter().flat_map(IndexEntry::targets).collect();
        check!(pairs.len() == 1);
        check!(store.get("build").len() == 1);
    }

    #[test]
    fn test_new_targets_kept_under_other_display_name() {
        let mut store = EntryStore::new();
        store.load(&partition(
            "all_5",
            vec![
                raw("format", "format", &[("f.html#1", "icu::Format::format()")]),
                raw(
                    "format",
                    "Format",
                    &[("f.html#1", "icu::Format::format()"), ("f.html#0", "icu::Format")],
                ),
            ],
        ));

        let entries = store.get("format");
        check!(entries.len() == 2);
        check!(entries[1].display_name() == "Format");
        check!(entries[1].targets() == [Target::new("f.html#0", "icu::Format")]);
    }
}

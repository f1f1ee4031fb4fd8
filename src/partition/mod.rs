//! Index partitions: one generated data file per lexical bucket of keywords.

mod decode;

pub use decode::PartitionFormat;

use crate::entry::RawEntry;
use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Identifies a partition, e.g. `functions_2` for the second bucket of the
/// `functions` category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartitionKey(String);

impl PartitionKey {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Derive the key from a file name by dropping its extension.
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |s| s.to_string_lossy().into_owned());
        Self(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The category for `<category>_<bucket>` keys (`functions`, `classes`, `all`, ...).
    pub fn category(&self) -> Option<&str> {
        self.split().map(|(category, _)| category)
    }

    /// The bucket for `<category>_<bucket>` keys.
    pub fn bucket(&self) -> Option<&str> {
        self.split().map(|(_, bucket)| bucket)
    }

    fn split(&self) -> Option<(&str, &str)> {
        let (category, bucket) = self.0.rsplit_once('_')?;
        let valid = !category.is_empty()
            && !bucket.is_empty()
            && bucket.chars().all(|c| c.is_ascii_alphanumeric());
        valid.then_some((category, bucket))
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An immutable, ordered sequence of records produced by the documentation generator.
///
/// Records are kept exactly as decoded; validation happens when the partition is
/// loaded into an [`EntryStore`](crate::store::EntryStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexPartition {
    key: PartitionKey,
    entries: Vec<RawEntry>,
}

impl IndexPartition {
    pub fn new(key: PartitionKey, entries: Vec<RawEntry>) -> Self {
        Self { key, entries }
    }

    /// Decode partition text, detecting the format from its first token.
    pub fn decode(key: PartitionKey, text: &str) -> Result<Self, IndexError> {
        let format = PartitionFormat::detect(text)
            .ok_or_else(|| IndexError::partition_load(key.as_str(), "unrecognized partition format"))?;
        let entries = decode::decode(format, text)
            .map_err(|reason| IndexError::partition_load(key.as_str(), reason))?;

        tracing::trace!(
            "Decoded partition '{}' ({:?}, {} records)",
            key,
            format,
            entries.len()
        );
        Ok(Self { key, entries })
    }

    pub fn key(&self) -> &PartitionKey {
        &self.key
    }

    pub fn entries(&self) -> &[RawEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Where a partition's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartitionSource {
    File(PathBuf),
    Memory { key: PartitionKey, text: String },
}

impl PartitionSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    pub fn memory(key: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Memory {
            key: PartitionKey::new(key),
            text: text.into(),
        }
    }

    pub fn key(&self) -> PartitionKey {
        match self {
            Self::File(path) => PartitionKey::from_path(path),
            Self::Memory { key, .. } => key.clone(),
        }
    }

    /// Human-readable origin used in errors and logs.
    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Memory { key, .. } => format!("<memory:{}>", key),
        }
    }

    /// Read and decode the partition.
    pub fn read(&self) -> Result<IndexPartition, IndexError> {
        match self {
            Self::File(path) => {
                let bytes = std::fs::read(path)
                    .map_err(|e| IndexError::partition_load(self.describe(), e))?;
                let text = String::from_utf8(bytes).map_err(|e| {
                    IndexError::partition_load(self.describe(), format!("not valid UTF-8: {}", e))
                })?;
                IndexPartition::decode(self.key(), &text).map_err(|e| self.relabel(e))
            }
            Self::Memory { key, text } => {
                IndexPartition::decode(key.clone(), text).map_err(|e| self.relabel(e))
            }
        }
    }

    /// Report decode failures against the source location rather than the bare key.
    fn relabel(&self, err: IndexError) -> IndexError {
        match err {
            IndexError::PartitionLoad { reason, .. } => {
                IndexError::partition_load(self.describe(), reason)
            }
            other => other,
        }
    }
}

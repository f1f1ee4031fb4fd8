//! Error handling types and utilities.

use std::time::Duration;

/// A specialized Result type for application plumbing (config, snapshots, server).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Failures produced by the index engine itself.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// A record is missing its keyword or target list. Non-fatal during a bulk load.
    #[error("malformed entry #{position} in partition '{partition}': {reason}")]
    MalformedEntry {
        partition: String,
        position: usize,
        reason: String,
    },
    /// A partition source could not be read or decoded. Aborts the whole load.
    #[error("failed to load partition '{source_name}': {reason}")]
    PartitionLoad { source_name: String, reason: String },
    /// The query was empty or whitespace-only.
    #[error("invalid query {query:?}: query must contain at least one non-whitespace character")]
    InvalidQuery { query: String },
    #[error("index load did not finish within {elapsed:?}")]
    LoadTimeout { elapsed: Duration },
}

impl IndexError {
    pub(crate) fn partition_load(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::PartitionLoad {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

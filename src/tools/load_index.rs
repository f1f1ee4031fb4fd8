//! Loading documentation indices on request.

use crate::config::expand_tilde;
use crate::state::{IndexState, LoadedIndex};
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LoadIndexRequest {
    /// Partition files or search directories to load (`~` is expanded)
    pub paths: Vec<String>,
}

/// Replace the active index with one built from the requested paths.
pub async fn handle_load_index(
    state: &Arc<IndexState>,
    request: LoadIndexRequest,
) -> Result<String, String> {
    if request.paths.is_empty() {
        return Err("No paths given. Pass one or more partition files or search directories.".to_string());
    }

    let paths: Vec<PathBuf> = request
        .paths
        .iter()
        .map(|p| PathBuf::from(expand_tilde(p).as_ref()))
        .collect();
    let snapshot = state.config().index.snapshot.clone();

    let loaded = state
        .load(paths, snapshot)
        .await
        .map_err(|e| format!("Failed to load index: {}", e))?;

    Ok(format_summary(&loaded))
}

pub(crate) fn format_summary(loaded: &LoadedIndex) -> String {
    let index = &loaded.index;
    let mut output = String::from("Index loaded.\n\n");
    let _ = writeln!(output, "Partition files: {}", loaded.partition_files);
    let _ = writeln!(output, "Keywords: {}", index.keyword_count());
    let _ = writeln!(output, "Entries: {}", index.len());
    let _ = writeln!(output, "Targets: {}", index.target_count());

    output.push_str("\nSources:\n");
    for path in &loaded.paths {
        let _ = writeln!(output, "• {}", path.display());
    }
    output
}

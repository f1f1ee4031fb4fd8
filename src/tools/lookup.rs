//! Exact keyword lookup handler.

use super::{NO_INDEX, write_suggestions};
use crate::entry::normalize_keyword;
use crate::error::IndexError;
use crate::search::suggest;
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LookupRequest {
    /// Exact keyword to look up (case-insensitive), e.g. "UnicodeString"
    pub keyword: String,
}

/// List every entry and target recorded under one keyword.
pub async fn handle_lookup(
    state: &Arc<IndexState>,
    request: LookupRequest,
) -> Result<String, String> {
    let Some(loaded) = state.current().await else {
        return Err(NO_INDEX.to_string());
    };

    let keyword = normalize_keyword(&request.keyword);
    if keyword.is_empty() {
        return Err(IndexError::InvalidQuery {
            query: request.keyword,
        }
        .to_string());
    }

    let entries = loaded.index.get(&keyword);
    if entries.is_empty() {
        let settings = &state.config().search;
        let mut msg = format!("Keyword '{}' not found.\n\n", request.keyword);
        let suggestions = suggest(
            &loaded.index,
            &keyword,
            settings.suggestion_limit,
            settings.min_similarity,
        );
        write_suggestions(&mut msg, &suggestions);
        return Ok(msg);
    }

    let mut output = String::new();
    for entry in entries {
        let _ = writeln!(output, "# {}\n", entry.display_name());
        for target in entry.targets() {
            let _ = writeln!(output, "• {}", target.owner_signature);
            let _ = writeln!(output, "  {}", target.page_anchor);
        }
        output.push('\n');
    }
    Ok(output)
}

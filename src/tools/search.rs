//! Keyword search handler.

use super::{NO_INDEX, SHOWN_TARGETS, write_suggestions};
use crate::entry::IndexEntry;
use crate::search::{Query, SearchMode, run, suggest};
use crate::state::IndexState;
use rmcp::schemars;
use serde::Deserialize;
use std::fmt::Write as _;
use std::sync::Arc;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchRequest {
    /// Keyword text to match (case-insensitive)
    pub query: String,
    /// Match keywords starting with the query (prefix, default) or containing it (substring)
    #[serde(default)]
    pub mode: Option<SearchMode>,
    /// Maximum number of entries to return, at least 1 (default from config, usually 20)
    #[serde(default)]
    pub limit: Option<usize>,
}

pub async fn handle_search(
    state: &Arc<IndexState>,
    request: SearchRequest,
) -> Result<String, String> {
    let Some(loaded) = state.current().await else {
        return Err(NO_INDEX.to_string());
    };
    let settings = &state.config().search;

    let mode = request.mode.unwrap_or_default();
    let query = Query::new(&request.query, mode).map_err(|e| e.to_string())?;
    // A zero limit would hide every match; show at least one.
    let limit = request.limit.unwrap_or(settings.default_limit).max(1);

    // One past the limit tells us whether the list was cut short.
    let mut results: Vec<&IndexEntry> = run(&loaded.index, query)
        .take(limit.saturating_add(1))
        .collect();
    let truncated = results.len() > limit;
    results.truncate(limit);

    if results.is_empty() {
        let mut msg = format!("No results found for '{}' ({} match).\n\n", request.query, mode);
        let suggestions = suggest(
            &loaded.index,
            &request.query,
            settings.suggestion_limit,
            settings.min_similarity,
        );
        if suggestions.is_empty() {
            msg.push_str("Search tips:\n");
            msg.push_str("• Try a shorter prefix\n");
            msg.push_str("• Use mode \"substring\" to match inside names\n");
            if request.query.contains("::") {
                msg.push_str("• Search by member or class name only, not qualified paths\n");
            }
        } else {
            write_suggestions(&mut msg, &suggestions);
        }
        return Ok(msg);
    }

    Ok(format_search_results(&results, &request.query, truncated))
}

fn format_search_results(results: &[&IndexEntry], query: &str, truncated: bool) -> String {
    let mut output = format!("Search results for '{}':\n\n", query);

    for (idx, entry) in results.iter().enumerate() {
        let _ = writeln!(
            output,
            "{}. `{}` ({} {})",
            idx + 1,
            entry.display_name(),
            entry.targets().len(),
            if entry.targets().len() == 1 { "target" } else { "targets" }
        );
        for target in entry.targets().iter().take(SHOWN_TARGETS) {
            let _ = writeln!(output, "   {} - {}", target.owner_signature, target.page_anchor);
        }
        if entry.targets().len() > SHOWN_TARGETS {
            let _ = writeln!(
                output,
                "   ... and {} more (use lookup for all)",
                entry.targets().len() - SHOWN_TARGETS
            );
        }
        output.push('\n');
    }

    if truncated {
        let _ = writeln!(
            output,
            "Showing the first {} results. Raise `limit` or narrow the query for more.",
            results.len()
        );
    }
    output
}

//! "Did you mean" suggestions for queries with no match.

use crate::entry::normalize_keyword;
use crate::store::SearchIndex;
use rapidfuzz::distance::jaro_winkler;

/// A keyword close to the query text.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion<'a> {
    pub keyword: &'a str,
    /// Display name of the best-ranked entry under the keyword.
    pub display_name: &'a str,
    /// Jaro-Winkler similarity, 0.0 to 1.0 (higher is better).
    pub score: f64,
}

/// Rank every keyword by similarity to `text` and keep the best `limit` at or
/// above `min_score`.
pub fn suggest<'a>(
    index: &'a SearchIndex,
    text: &str,
    limit: usize,
    min_score: f64,
) -> Vec<Suggestion<'a>> {
    let needle = normalize_keyword(text);
    if needle.is_empty() || limit == 0 {
        return vec![];
    }

    let mut suggestions: Vec<Suggestion<'a>> = index
        .buckets()
        .filter_map(|(keyword, bucket)| {
            let score = jaro_winkler::similarity(needle.chars(), keyword.chars());
            (score >= min_score).then(|| Suggestion {
                keyword: keyword.as_str(),
                display_name: bucket.first().map_or(keyword.as_str(), |e| e.display_name()),
                score,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.keyword.cmp(b.keyword)));
    suggestions.truncate(limit);
    suggestions
}

//! Keyword matching over a [`SearchIndex`].

use crate::entry::{IndexEntry, normalize_keyword};
use crate::error::IndexError;
use crate::store::SearchIndex;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::{Flatten, FusedIterator};

/// How the query text is compared against keywords.
///
/// DO NOT add doc comments to individual variants - this causes schemars to generate
/// `oneOf` schemas instead of simple `enum` arrays, breaking MCP client enum handling.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Prefix,
    Substring,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prefix => f.write_str("prefix"),
            Self::Substring => f.write_str("substring"),
        }
    }
}

/// A validated, normalized query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    text: String,
    mode: SearchMode,
}

impl Query {
    /// Normalize `text`, rejecting empty and whitespace-only input.
    pub fn new(text: &str, mode: SearchMode) -> Result<Self, IndexError> {
        let normalized = normalize_keyword(text);
        if normalized.is_empty() {
            return Err(IndexError::InvalidQuery {
                query: text.to_string(),
            });
        }
        Ok(Self {
            text: normalized,
            mode,
        })
    }

    pub fn prefix(text: &str) -> Result<Self, IndexError> {
        Self::new(text, SearchMode::Prefix)
    }

    pub fn substring(text: &str) -> Result<Self, IndexError> {
        Self::new(text, SearchMode::Substring)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub const fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn matches(&self, keyword: &str) -> bool {
        match self.mode {
            SearchMode::Prefix => keyword.starts_with(&self.text),
            SearchMode::Substring => keyword.contains(&self.text),
        }
    }
}

type Buckets<'a> = Box<dyn Iterator<Item = &'a Vec<IndexEntry>> + Send + 'a>;

/// Lazily yields matching entries in rank order.
///
/// Nothing is collected up front, so `.take(n)` only walks as many keywords as it
/// needs. Call [`search`] again to restart.
pub struct Matches<'a> {
    inner: Flatten<Buckets<'a>>,
}

impl<'a> Iterator for Matches<'a> {
    type Item = &'a IndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl FusedIterator for Matches<'_> {}

impl fmt::Debug for Matches<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matches").finish_non_exhaustive()
    }
}

/// All entries whose keyword starts with `prefix`, case-insensitively.
///
/// Results are ordered by keyword, then by target count (most first).
pub fn search<'a>(index: &'a SearchIndex, prefix: &str) -> Result<Matches<'a>, IndexError> {
    Ok(run(index, Query::prefix(prefix)?))
}

/// Run an explicit [`Query`] against `index`.
pub fn run(index: &SearchIndex, query: Query) -> Matches<'_> {
    tracing::trace!("Running {} query '{}'", query.mode, query.text);

    let buckets: Buckets<'_> = match query.mode {
        SearchMode::Prefix => Box::new(
            index
                .buckets_from(&query.text)
                .take_while(move |(keyword, _)| keyword.starts_with(&query.text))
                .map(|(_, bucket)| bucket),
        ),
        SearchMode::Substring => Box::new(
            index
                .buckets()
                .filter(move |(keyword, _)| query.matches(keyword))
                .map(|(_, bucket)| bucket),
        ),
    };

    Matches {
        inner: buckets.flatten(),
    }
}

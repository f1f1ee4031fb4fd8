//! Query matching over a loaded search index.
//!
//! Prefix and substring matching walk the keyword-ordered index lazily; fuzzy
//! suggestions cover queries that match nothing.

pub(crate) mod query;
pub(crate) mod suggest;

pub use query::{Matches, Query, SearchMode, run, search};
pub use suggest::{Suggestion, suggest};

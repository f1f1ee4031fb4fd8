pub mod load_index;
pub mod lookup;
pub mod search;

pub use load_index::*;
pub use lookup::*;
pub use search::*;

use crate::search::Suggestion;
use std::fmt::Write as _;

/// Targets listed per entry before the rest are summarized.
const SHOWN_TARGETS: usize = 3;

const NO_INDEX: &str = "No documentation index loaded.\n\n\
     Use load_index with the path of a generated search directory \
     (e.g. `html/search/`) or list sources under [index] in the config file.";

/// Append a "did you mean" list, or nothing when there are no suggestions.
fn write_suggestions(output: &mut String, suggestions: &[Suggestion<'_>]) {
    if suggestions.is_empty() {
        return;
    }
    output.push_str("Did you mean one of these?\n\n");
    for suggestion in suggestions {
        let _ = writeln!(
            output,
            "• `{}` ({:.0}% similar)",
            suggestion.display_name,
            suggestion.score * 100.0
        );
    }
}

mod common;

use assert2::{check, let_assert};
use common::{ALL_2_JSON, FUNCTIONS_2_JS};
use docsearch::search::run;
use docsearch::{IndexEntry, IndexError, PartitionSource, Query, SearchIndex, load_all, search, suggest};
use rstest::{fixture, rstest};

#[fixture]
fn index() -> SearchIndex {
    load_all(&[
        PartitionSource::memory("functions_2", FUNCTIONS_2_JS),
        PartitionSource::memory("all_2", ALL_2_JSON),
    ])
    .unwrap()
}

fn names<'a>(matches: impl Iterator<Item = &'a IndexEntry>) -> Vec<&'a str> {
    matches.map(IndexEntry::display_name).collect()
}

#[rstest]
fn prefix_results_are_keyword_ordered(index: SearchIndex) {
    check!(
        names(search(&index, "build").unwrap())
            == [
                "build",
                "Builder",
                "buildImmutableIndex",
                "buildStringPiece",
                "buildUnicodeString"
            ]
    );
}

#[rstest]
fn single_letter_prefix_spans_partitions(index: SearchIndex) {
    let found = names(search(&index, "b").unwrap());
    check!(found.first() == Some(&"BasicTimeZone"));
    check!(found.last() == Some(&"ByteSink"));
    check!(found.len() == index.len());
}

#[rstest]
#[case("")]
#[case("    ")]
fn blank_query_is_invalid(index: SearchIndex, #[case] text: &str) {
    let_assert!(Err(IndexError::InvalidQuery { .. }) = search(&index, text));
}

#[rstest]
fn results_are_lazy_and_restartable(index: SearchIndex) {
    let mut matches = search(&index, "build").unwrap();
    check!(matches.next().map(IndexEntry::display_name) == Some("build"));
    check!(matches.next().map(IndexEntry::display_name) == Some("Builder"));

    let first_two = names(search(&index, "build").unwrap().take(2));
    check!(first_two == ["build", "Builder"]);
}

#[rstest]
fn substring_query_matches_inside_keywords(index: SearchIndex) {
    let query = Query::substring("string").unwrap();
    check!(names(run(&index, query)) == ["buildStringPiece", "buildUnicodeString"]);

    let query = Query::substring("index").unwrap();
    check!(names(run(&index, query)) == ["buildImmutableIndex"]);
}

#[rstest]
fn typo_gets_suggestions(index: SearchIndex) {
    let suggestions = suggest(&index, "bytesnk", 3, 0.8);
    let_assert!(Some(first) = suggestions.first());
    check!(first.display_name == "ByteSink");
}

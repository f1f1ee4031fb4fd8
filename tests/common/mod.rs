//! Shared test fixtures for integration tests.
//!
//! Each test gets its own temporary search directory populated with a small
//! slice of ICU's generated index: `all_*` and `functions_*` partitions that
//! overlap on purpose, so merge behavior across partitions is exercised.

use docsearch::config::LogFormat;
use docsearch::{Config, IndexState};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// `functions_2` in the Doxygen script layout.
pub const FUNCTIONS_2_JS: &str = r"var searchData=
[
  ['before_7158',['before',['../classicu_1_1Calendar.html#a88835aa482481df5726c90830d75dec6',1,'icu::Calendar']]],
  ['build_7160',['build',['../classicu_1_1LocaleBuilder.html#a1a5a1f5a1c5e3c2b9e1b1c8d3b9f2e6a',1,'icu::LocaleBuilder::build()'],['../classicu_1_1BytesTrieBuilder.html#a2b7c3d8e9f0a1b2c3d4e5f6a7b8c9d0e',1,'icu::BytesTrieBuilder::build()']]],
  ['builder_7161',['Builder',['../classicu_1_1LocaleMatcher_1_1Builder.html#afb194bfc06a8af52054e2f246fd4a11b',1,'icu::LocaleMatcher::Builder::Builder()'],['../classicu_1_1LocaleMatcher_1_1Builder.html#ace56464330028c07da772c182ae546fd',1,'icu::LocaleMatcher::Builder::Builder(Builder &amp;&amp;src) U_NOEXCEPT']]],
  ['buildimmutableindex_7162',['buildImmutableIndex',['../classicu_1_1AlphabeticIndex.html#a3f1c2a7de8d6b1f4a9e0c5d2b7a8e9f1',1,'icu::AlphabeticIndex']]],
  ['buildstringpiece_7163',['buildStringPiece',['../classicu_1_1BytesTrieBuilder.html#a4e5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b',1,'icu::BytesTrieBuilder']]],
  ['buildunicodestring_7164',['buildUnicodeString',['../classicu_1_1UCharsTrieBuilder.html#a5f6a7b8c9d0e1f2a3b4c5d6e7f8a9b0c',1,'icu::UCharsTrieBuilder']]]
];
";

/// `all_2` in the JSON record layout. Repeats `build` with one shared and one
/// new target, and carries a malformed record.
pub const ALL_2_JSON: &str = r#"[
  ["build", "build", [
    ["../classicu_1_1LocaleBuilder.html#a1a5a1f5a1c5e3c2b9e1b1c8d3b9f2e6a", "icu::LocaleBuilder::build()"],
    ["../classicu_1_1UCharsTrieBuilder.html#a9a8b7c6d5e4f3a2b1c0d9e8f7a6b5c4d", "icu::UCharsTrieBuilder::build()"]
  ]],
  ["basictimezone", "BasicTimeZone", [["../classicu_1_1BasicTimeZone.html", "icu"]]],
  ["bytesink", "ByteSink", [["../classicu_1_1ByteSink.html", "icu"]]],
  ["missingtargets", "missingTargets"]
]"#;

/// A partition that fails to parse.
#[allow(dead_code)]
pub const BROKEN_JS: &str = "var searchData=\n[\n  ['build_1',['build',\n";

/// A temporary search directory, removed when dropped.
#[allow(dead_code)] // Methods used across different integration test crates
pub struct TempSearchDir {
    _temp: TempDir,
    root: PathBuf,
}

#[allow(dead_code)] // Methods used across different integration test crates
impl TempSearchDir {
    pub fn new() -> Self {
        docsearch::logging::init(LogFormat::default());
        let temp = TempDir::new().expect("Failed to create temp directory");
        let root = temp.path().to_path_buf();
        Self { _temp: temp, root }
    }

    /// A directory with the sample `functions_2.js` and `all_2.json` partitions,
    /// plus the front-end scripts a real search directory carries.
    pub fn sample() -> Self {
        let dir = Self::new();
        dir.create_file("search/functions_2.js", FUNCTIONS_2_JS);
        dir.create_file("search/all_2.json", ALL_2_JSON);
        dir.create_file("search/search.js", "function SearchBox() {}\n");
        dir.create_file("search/searchdata.js", "var indexSectionsWithContent = {};\n");
        dir
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn search_dir(&self) -> PathBuf {
        self.root.join("search")
    }

    /// Creates a file, including parent directories.
    ///
    /// # Panics
    /// Panics if file creation fails.
    pub fn create_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent).unwrap_or_else(|e| {
                panic!("Failed to create parent directory for '{}': {}", path, e)
            });
        }
        std::fs::write(&full_path, content)
            .unwrap_or_else(|e| panic!("Failed to write file '{}': {}", path, e));
    }
}

impl Default for TempSearchDir {
    fn default() -> Self {
        Self::new()
    }
}

/// Server state with the sample directory already loaded.
#[allow(dead_code)] // Fields used across different integration test crates
pub struct LoadedState {
    pub dir: TempSearchDir,
    pub state: Arc<IndexState>,
}

#[allow(dead_code)]
#[fixture]
pub fn sample_dir() -> TempSearchDir {
    TempSearchDir::sample()
}

#[allow(dead_code)]
pub async fn loaded_state(dir: TempSearchDir) -> LoadedState {
    let state = Arc::new(IndexState::new(Config::default()));
    state
        .load(vec![dir.search_dir()], None)
        .await
        .expect("Sample index should load");
    LoadedState { dir, state }
}

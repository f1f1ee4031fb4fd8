//! Index records: link targets, validated entries, and raw on-disk records.

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A link from a keyword into a generated documentation page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    /// Page URL including the `#fragment` anchor.
    pub page_anchor: String,
    /// Qualified name of the class or member the keyword belongs to.
    pub owner_signature: String,
}

impl Target {
    pub fn new(page_anchor: impl Into<String>, owner_signature: impl Into<String>) -> Self {
        Self {
            page_anchor: page_anchor.into(),
            owner_signature: owner_signature.into(),
        }
    }

    /// The page part of the anchor, without the fragment.
    pub fn page(&self) -> &str {
        self.page_anchor
            .split_once('#')
            .map_or(self.page_anchor.as_str(), |(page, _)| page)
    }

    /// The fragment part of the anchor, if any.
    pub fn fragment(&self) -> Option<&str> {
        self.page_anchor.split_once('#').map(|(_, frag)| frag)
    }
}

/// A searchable keyword and every place it is documented.
///
/// The keyword is always normalized and the target list is never empty and never
/// holds two targets with the same `(page_anchor, owner_signature)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    keyword: String,
    display_name: String,
    targets: Vec<Target>,
}

impl IndexEntry {
    /// Build an entry, normalizing the keyword and dropping duplicate targets.
    ///
    /// Fails when the keyword normalizes to nothing or no targets remain.
    pub fn new(
        keyword: &str,
        display_name: impl Into<String>,
        targets: Vec<Target>,
    ) -> Result<Self, &'static str> {
        let keyword = normalize_keyword(keyword);
        if keyword.is_empty() {
            return Err("keyword is empty");
        }
        if targets.is_empty() {
            return Err("target list is empty");
        }

        let mut entry = Self {
            keyword,
            display_name: display_name.into(),
            targets: Vec::with_capacity(targets.len()),
        };
        entry.merge_targets(targets);
        Ok(entry)
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub(crate) fn retain_targets(&mut self, keep: impl FnMut(&Target) -> bool) {
        self.targets.retain(keep);
    }

    /// Append targets not already present, preserving first-seen order.
    /// Returns how many were added.
    pub(crate) fn merge_targets(&mut self, incoming: impl IntoIterator<Item = Target>) -> usize {
        let mut seen: ahash::AHashSet<Target> = self.targets.iter().cloned().collect();
        let before = self.targets.len();
        for target in incoming {
            if seen.insert(target.clone()) {
                self.targets.push(target);
            }
        }
        self.targets.len() - before
    }
}

/// A record exactly as decoded from a partition file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub keyword: Option<String>,
    pub display_name: Option<String>,
    pub targets: Option<Vec<Target>>,
}

impl RawEntry {
    /// Validate into an [`IndexEntry`].
    ///
    /// A missing display name falls back to the keyword as written.
    pub fn validate(self, partition: &str, position: usize) -> Result<IndexEntry, IndexError> {
        let malformed = |reason: &str| IndexError::MalformedEntry {
            partition: partition.to_string(),
            position,
            reason: reason.to_string(),
        };

        let keyword = self.keyword.ok_or_else(|| malformed("missing keyword"))?;
        let targets = self.targets.ok_or_else(|| malformed("missing target list"))?;
        let display_name = self
            .display_name
            .unwrap_or_else(|| keyword.trim().to_string());

        IndexEntry::new(&keyword, display_name, targets).map_err(malformed)
    }
}

/// Lowercase and trim a keyword or query.
pub fn normalize_keyword(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Decode the handful of HTML entities documentation generators emit in signatures.
pub fn decode_html_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail.find(';').and_then(|end| {
            let replacement = match &tail[1..end] {
                "amp" => '&',
                "lt" => '<',
                "gt" => '>',
                "quot" => '"',
                "apos" | "#39" => '\'',
                _ => return None,
            };
            Some((replacement, end + 1))
        });

        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

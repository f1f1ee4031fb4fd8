//! Decoders for the on-disk partition layouts.
//!
//! Two layouts are understood:
//!
//! - **JSON records**: `[[keyword, displayName, [[anchor, owner], ...]], ...]`
//! - **Doxygen scripts**: `var searchData=[[id, [displayName, [anchor, flag, owner], ...]], ...];`
//!   using single-quoted strings. The keyword is recovered from `id`.
//!
//! Structural problems with the file as a whole are errors. Problems with a single
//! record are not: the record is decoded with the offending field left empty so the
//! entry store can report and skip it.

use crate::entry::{RawEntry, Target, decode_html_entities};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// `var searchData =` (or any other identifier) at the head of a generated script.
static SCRIPT_HEAD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*var\s+[A-Za-z_$][A-Za-z0-9_$]*\s*=\s*").expect("script head regex is valid")
});

/// Trailing `_<counter>` Doxygen appends to make ids unique.
static ID_COUNTER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_[0-9]+$").expect("id counter regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionFormat {
    JsonRecords,
    DoxygenScript,
}

impl PartitionFormat {
    /// Sniff the layout from the first meaningful token.
    pub fn detect(text: &str) -> Option<Self> {
        let trimmed = text.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('[') {
            Some(Self::JsonRecords)
        } else if SCRIPT_HEAD.is_match(trimmed) {
            Some(Self::DoxygenScript)
        } else {
            None
        }
    }
}

pub(super) fn decode(format: PartitionFormat, text: &str) -> Result<Vec<RawEntry>, String> {
    let text = text.trim_start_matches('\u{feff}');
    match format {
        PartitionFormat::JsonRecords => {
            let records = parse_array(text)?;
            Ok(records.iter().map(json_record).collect())
        }
        PartitionFormat::DoxygenScript => {
            let body = SCRIPT_HEAD.replace(text, "");
            let body = body.trim_end();
            let body = body.strip_suffix(';').unwrap_or(body);
            let json = script_literal_to_json(body)?;
            let records = parse_array(&json)?;
            Ok(records.iter().flat_map(script_record).collect())
        }
    }
}

fn parse_array(text: &str) -> Result<Vec<Value>, String> {
    match serde_json::from_str::<Value>(text).map_err(|e| format!("invalid record array: {}", e))? {
        Value::Array(records) => Ok(records),
        other => Err(format!("expected a top-level array, found {}", kind_of(&other))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// `[keyword, displayName, [[anchor, owner], ...]]`
fn json_record(record: &Value) -> RawEntry {
    let Some(fields) = record.as_array() else {
        return RawEntry::default();
    };

    RawEntry {
        keyword: non_empty_str(fields.first()),
        display_name: display_name(fields.get(1)),
        targets: fields.get(2).and_then(targets),
    }
}

/// `[id, [displayName, target, target, ...], ...]`
///
/// A record may carry several display groups under one id; each becomes its own entry.
fn script_record(record: &Value) -> Vec<RawEntry> {
    let Some(fields) = record.as_array() else {
        return vec![RawEntry::default()];
    };

    let keyword = fields
        .first()
        .and_then(Value::as_str)
        .map(keyword_from_id)
        .filter(|k| !k.trim().is_empty());

    let groups: Vec<&Vec<Value>> = fields.iter().skip(1).filter_map(Value::as_array).collect();
    if groups.is_empty() {
        return vec![RawEntry {
            keyword,
            ..RawEntry::default()
        }];
    }

    groups
        .into_iter()
        .map(|group| {
            let display_name = display_name(group.first());
            let targets: Vec<Target> = group.iter().skip(1).filter_map(target).collect();
            RawEntry {
                keyword: keyword.clone(),
                display_name,
                targets: (group.len() > 1).then_some(targets),
            }
        })
        .collect()
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

/// Display names are shown verbatim, so entities are decoded like owner signatures.
fn display_name(value: Option<&Value>) -> Option<String> {
    non_empty_str(value).map(|name| decode_html_entities(&name).into_owned())
}

fn targets(value: &Value) -> Option<Vec<Target>> {
    value
        .as_array()
        .map(|items| items.iter().filter_map(target).collect())
}

/// `[anchor, owner]` or `[anchor, flag, owner]`.
fn target(value: &Value) -> Option<Target> {
    let parts = value.as_array()?;
    let anchor = parts.first()?.as_str()?;
    let owner = parts.last()?.as_str()?;
    if parts.len() < 2 || anchor.is_empty() {
        tracing::trace!("Dropping undecodable target {}", value);
        return None;
    }
    Some(Target::new(anchor, decode_html_entities(owner)))
}

/// Recover a keyword from a Doxygen search id such as `build_7160` or `operator_3d_3d_12`.
///
/// Doxygen lowercases alphanumerics and writes every other byte as `_xx` hex.
pub(crate) fn keyword_from_id(id: &str) -> String {
    let id = ID_COUNTER.replace(id, "");
    let bytes = id.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'_'
            && i + 2 < bytes.len()
            && let Some(byte) = hex_byte(bytes[i + 1], bytes[i + 2])
        {
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_byte(hi: u8, lo: u8) -> Option<u8> {
    let hi = (hi as char).to_digit(16)?;
    let lo = (lo as char).to_digit(16)?;
    u8::try_from(hi * 16 + lo).ok()
}

/// Rewrite a JavaScript array literal with single-quoted strings into JSON.
fn script_literal_to_json(body: &str) -> Result<String, String> {
    let mut out = String::with_capacity(body.len() + body.len() / 8);
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                let literal = read_string(&mut chars, c)?;
                out.push_str(
                    &serde_json::to_string(&literal).map_err(|e| e.to_string())?,
                );
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}

/// Read a quoted JS string whose opening quote was already consumed.
fn read_string(chars: &mut std::str::Chars<'_>, quote: char) -> Result<String, String> {
    let mut literal = String::new();
    loop {
        match chars.next() {
            None => return Err("unterminated string literal".to_string()),
            Some(c) if c == quote => return Ok(literal),
            Some('\\') => match chars.next() {
                None => return Err("unterminated escape sequence".to_string()),
                Some('n') => literal.push('\n'),
                Some('t') => literal.push('\t'),
                Some('r') => literal.push('\r'),
                Some(other) => literal.push(other),
            },
            Some(c) => literal.push(c),
        }
    }
}

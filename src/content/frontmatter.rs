//! Front-matter splitting and schema.
//!
//! A lesson file starts with a YAML block fenced by `---` lines:
//!
//! ```text
//! ---
//! slug: why-flutter
//! title: Why Flutter
//! date: 2024-01-15
//! tags: [flutter, intro]
//! order: 2
//! ---
//! # Body starts here
//! ```
//!
//! A file that does not start with `---` has no front matter; the whole file
//! is the body.

use regex::Regex;
use serde::{Deserialize, Deserializer, de::Error as _};
use serde_yaml::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Opening delimiter, only recognised at the very start of the file.
static OPENING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---[ \t]*\r?\n").expect("valid opening regex"));

/// Closing delimiter, a whole line of `---`.
static CLOSING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^---[ \t]*(?:\r?\n|\z)").expect("valid closing regex"));

/// Front-matter parse failures.
#[derive(Debug, Error)]
pub enum FrontMatterError {
    #[error("front matter opened with `---` but never closed")]
    Unclosed,

    #[error("front matter is not valid YAML for a lesson")]
    Yaml(#[from] serde_yaml::Error),
}

/// Lesson metadata as written by the author.
///
/// Every field is optional. `null` is treated the same as a missing key and
/// unknown keys are ignored, so drafts can carry their own notes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    /// Required for the lesson to be published.
    #[serde(deserialize_with = "scalar")]
    pub slug: Option<String>,

    #[serde(deserialize_with = "scalar")]
    pub title: Option<String>,

    /// ISO 8601 date, kept verbatim.
    #[serde(deserialize_with = "scalar")]
    pub date: Option<String>,

    #[serde(deserialize_with = "scalar")]
    pub description: Option<String>,

    /// A list, or a single tag written as a plain string.
    #[serde(deserialize_with = "scalar_list")]
    pub tags: Option<Vec<String>>,

    /// Overrides the order derived from the file name.
    pub order: Option<i64>,
}

/// Split a source file into front matter and body.
pub fn split(source: &str) -> Result<(FrontMatter, &str), FrontMatterError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    let Some(open) = OPENING.find(source) else {
        return Ok((FrontMatter::default(), source));
    };
    let rest = &source[open.end()..];
    let close = CLOSING.find(rest).ok_or(FrontMatterError::Unclosed)?;

    let yaml = &rest[..close.start()];
    let body = &rest[close.end()..];

    Ok((parse_yaml(yaml)?, body))
}

/// Parse the YAML between the delimiters. An empty block is empty metadata.
fn parse_yaml(yaml: &str) -> Result<FrontMatter, FrontMatterError> {
    if yaml.trim().is_empty() {
        return Ok(FrontMatter::default());
    }
    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Null => Ok(FrontMatter::default()),
        value => Ok(serde_yaml::from_value(value)?),
    }
}

fn scalar_to_string(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected a scalar, found {other:?}")),
    }
}

fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(None),
        Some(value) => scalar_to_string(value).map_err(D::Error::custom),
    }
}

fn scalar_list<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Sequence(items)) => {
            let mut tags = Vec::with_capacity(items.len());
            for item in items {
                if let Some(tag) = scalar_to_string(item).map_err(D::Error::custom)? {
                    tags.push(tag);
                }
            }
            Ok(Some(tags))
        }
        Some(value) => scalar_to_string(value)
            .map(|tag| tag.map(|tag| vec![tag]))
            .map_err(D::Error::custom),
    }
}

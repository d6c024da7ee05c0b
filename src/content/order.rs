//! Lesson ordering and chapter titles.
//!
//! Lessons are named `NN-name.md`; the leading number is the position inside
//! the chapter. Chapters are folders named `NN-chapter`, and their display
//! title comes from a lookup table.

use regex::Regex;
use std::{collections::BTreeMap, sync::LazyLock};

/// Order given to files without a numeric prefix. Sorts them last.
pub const UNORDERED: i64 = 999;

static ORDER_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)-").expect("valid order regex"));

/// Built-in chapter titles of the course.
const BUILTIN_CHAPTERS: &[(&str, &str)] = &[
    ("01-introduction", "Введение"),
    ("02-dart-basics", "Основы Dart"),
    ("03-oop", "Объектно-ориентированное программирование"),
    ("04-flutter-basics", "Основы Flutter"),
];

/// Derive the sort order from a file name.
///
/// `"02-intro.md"` → `2`, `"index.md"` → [`UNORDERED`], `"intro-01.md"` → [`UNORDERED`].
/// A prefix too large for `i64` saturates to `i64::MAX`.
pub fn derive_order(file_name: &str) -> i64 {
    ORDER_PREFIX
        .captures(file_name)
        .map(|caps| caps[1].parse().unwrap_or(i64::MAX))
        .unwrap_or(UNORDERED)
}

/// Chapter id → display title.
#[derive(Debug, Clone)]
pub struct ChapterTitles {
    titles: BTreeMap<String, String>,
}

impl Default for ChapterTitles {
    fn default() -> Self {
        Self {
            titles: BUILTIN_CHAPTERS
                .iter()
                .map(|(id, title)| ((*id).to_owned(), (*title).to_owned()))
                .collect(),
        }
    }
}

impl ChapterTitles {
    /// Built-in table extended (or overridden) by `extra`.
    pub fn with_overrides<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut titles = Self::default();
        titles
            .titles
            .extend(extra.into_iter().map(|(id, title)| (id.into(), title.into())));
        titles
    }

    /// Display title for `id`, or the id itself when unknown.
    pub fn title<'a>(&'a self, id: &'a str) -> &'a str {
        self.titles.get(id).map(String::as_str).unwrap_or(id)
    }
}

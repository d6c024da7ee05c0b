//! Syntax highlighter.
//!
//! Built once per process: loading grammars is the expensive part, a
//! highlight call is cheap and holds no shared mutable state.

use super::{RenderError, escape_html};
use crate::config::HighlightConfig;
use rustc_hash::FxHashSet;
use syntect::{
    html::{ClassStyle, ClassedHTMLGenerator},
    parsing::{SyntaxDefinition, SyntaxReference, SyntaxSet},
    util::LinesWithEndings,
};

/// Prefix of every highlight class (`hl-keyword`, `hl-string`, ...).
pub const CLASS_PREFIX: &str = "hl-";

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
    prefix: CLASS_PREFIX,
};

/// Dart is not part of syntect's default grammar set.
const DART_SYNTAX: &str = include_str!("../embed/syntaxes/Dart.sublime-syntax");

/// Labels rendered as plain text without a diagnostic.
const PLAIN_LABELS: &[&str] = &["text", "txt", "plain", "plaintext"];

pub struct Highlighter {
    syntaxes: SyntaxSet,
    /// Names of the grammars enabled by the configured language list.
    enabled: FxHashSet<String>,
}

impl Highlighter {
    /// Load the grammar set and restrict it to `config.languages`.
    ///
    /// A configured language without a grammar is a configuration error.
    pub fn new(config: &HighlightConfig) -> Result<Self, RenderError> {
        let mut builder = SyntaxSet::load_defaults_newlines().into_builder();
        let dart = SyntaxDefinition::load_from_str(DART_SYNTAX, true, Some("dart"))
            .map_err(|err| RenderError::Grammar(err.to_string()))?;
        builder.add(dart);
        let syntaxes = builder.build();

        let mut enabled = FxHashSet::default();
        for language in &config.languages {
            let syntax = syntaxes
                .find_syntax_by_token(language)
                .ok_or_else(|| RenderError::UnknownLanguage(language.clone()))?;
            enabled.insert(syntax.name.clone());
        }

        Ok(Self { syntaxes, enabled })
    }

    /// Whether `label` (or one of its aliases, e.g. `yml`) is highlighted.
    #[cfg(test)]
    pub fn supports(&self, label: &str) -> bool {
        self.syntax_for(label).is_some()
    }

    fn syntax_for(&self, label: &str) -> Option<&SyntaxReference> {
        self.syntaxes
            .find_syntax_by_token(label)
            .filter(|syntax| self.enabled.contains(&syntax.name))
    }

    /// Highlight `code` as `label`, returning the markup for the inside of
    /// a `<code>` element.
    ///
    /// Plain labels are escaped, not highlighted. Anything else outside the
    /// enabled set is [`RenderError::UnsupportedLanguage`].
    pub fn highlight(&self, code: &str, label: &str) -> Result<String, RenderError> {
        if PLAIN_LABELS.contains(&label.to_ascii_lowercase().as_str()) {
            return Ok(escape_html(code));
        }
        let syntax = self
            .syntax_for(label)
            .ok_or_else(|| RenderError::UnsupportedLanguage(label.to_owned()))?;

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntaxes, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlighter() -> Highlighter {
        Highlighter::new(&HighlightConfig::default()).unwrap()
    }

    fn config(languages: &[&str]) -> HighlightConfig {
        HighlightConfig {
            languages: languages.iter().map(|s| s.to_string()).collect(),
            ..HighlightConfig::default()
        }
    }

    #[test]
    fn test_default_languages_supported() {
        let hl = highlighter();
        for label in ["dart", "yaml", "bash", "json", "xml"] {
            assert!(hl.supports(label), "{label} should be supported");
        }
    }

    #[test]
    fn test_aliases_follow_grammar() {
        let hl = highlighter();
        assert!(hl.supports("yml"));
        assert!(hl.supports("sh"));
    }

    #[test]
    fn test_outside_language_set() {
        let hl = highlighter();
        assert!(!hl.supports("python"));
        assert!(!hl.supports("cobol"));
    }

    #[test]
    fn test_restricted_language_set() {
        let hl = Highlighter::new(&config(&["dart"])).unwrap();
        assert!(hl.supports("dart"));
        assert!(!hl.supports("yaml"));
    }

    #[test]
    fn test_unknown_configured_language() {
        let err = Highlighter::new(&config(&["dart", "klingon"])).err().unwrap();
        assert!(matches!(err, RenderError::UnknownLanguage(lang) if lang == "klingon"));
    }

    #[test]
    fn test_highlight_dart() {
        let html = highlighter()
            .highlight("// greet\nvoid main() {\n  print('hi');\n}\n", "dart")
            .unwrap();

        assert!(html.contains("hl-source hl-dart"));
        assert!(html.contains("hl-comment"));
        assert!(html.contains("hl-string"));
        assert!(html.contains("hl-entity hl-name hl-function"));
        assert!(html.contains("print"));
    }

    #[test]
    fn test_highlight_escapes_markup() {
        let html = highlighter()
            .highlight("List<int> xs = [];\n", "dart")
            .unwrap();
        assert!(html.contains("&lt;"));
        assert!(!html.contains("<int>"));
    }

    #[test]
    fn test_plain_label() {
        let html = highlighter().highlight("a < b", "text").unwrap();
        assert_eq!(html, "a &lt; b");
    }

    #[test]
    fn test_unsupported_label() {
        let err = highlighter().highlight("PROGRAM-ID. X.", "cobol").unwrap_err();
        assert!(matches!(err, RenderError::UnsupportedLanguage(lang) if lang == "cobol"));
    }

    #[test]
    fn test_highlighter_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Highlighter>();
    }
}

//! Code color themes.
//!
//! A theme never carries literal colors. It binds highlight classes to CSS
//! custom properties, and the page stylesheet decides what those properties
//! resolve to (per site theme, per code scheme). Switching light/dark or the
//! code scheme is therefore a pure CSS change on already highlighted markup.

use super::highlight::CLASS_PREFIX;
use std::fmt::Write;

/// Token category, one CSS variable each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Comment,
    Constant,
    Function,
    Keyword,
    String,
    Parameter,
}

impl Token {
    /// CSS custom property holding the color of this token.
    pub const fn var(self) -> &'static str {
        match self {
            Self::Comment => "--code-token-comment",
            Self::Constant => "--code-token-constant",
            Self::Function => "--code-token-function",
            Self::Keyword => "--code-token-keyword",
            Self::String => "--code-token-string",
            Self::Parameter => "--code-token-parameter",
        }
    }
}

/// Scope selectors painted with one token color.
#[derive(Debug)]
pub struct TokenRule {
    pub scopes: &'static [&'static str],
    pub token: Token,
}

/// A named set of token rules.
#[derive(Debug)]
pub struct CodeTheme {
    name: &'static str,
    rules: &'static [TokenRule],
}

/// Rules are listed general first; a longer selector has higher CSS
/// specificity, so `entity.name.tag` beats `entity` regardless of order.
const CSS_VARIABLES: CodeTheme = CodeTheme {
    name: "css-variables",
    rules: &[
        TokenRule {
            scopes: &["comment", "punctuation.definition.comment", "string.comment"],
            token: Token::Comment,
        },
        TokenRule {
            scopes: &[
                "constant",
                "entity.name.constant",
                "variable.other.constant",
                "variable.language",
                "support.constant",
                "meta.preprocessor",
            ],
            token: Token::Constant,
        },
        TokenRule {
            scopes: &["entity", "entity.name", "support.class", "support.type", "markup.heading"],
            token: Token::Function,
        },
        TokenRule {
            scopes: &["entity.name.function", "support.function", "meta.function-call"],
            token: Token::Function,
        },
        TokenRule {
            scopes: &["keyword", "storage", "storage.type", "entity.name.tag", "punctuation.definition.tag"],
            token: Token::Keyword,
        },
        TokenRule {
            scopes: &["string", "string.template", "constant.other.symbol"],
            token: Token::String,
        },
        TokenRule {
            scopes: &["variable.parameter", "meta.parameter"],
            token: Token::Parameter,
        },
    ],
};

const THEMES: &[CodeTheme] = &[CSS_VARIABLES];

impl CodeTheme {
    /// Look a theme up by name.
    pub fn by_name(name: &str) -> Option<&'static CodeTheme> {
        THEMES.iter().find(|theme| theme.name == name)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Token category of an exact scope selector, if the theme paints it.
    #[cfg(test)]
    pub fn token_for(&self, scope: &str) -> Option<Token> {
        self.rules
            .iter()
            .find(|rule| rule.scopes.contains(&scope))
            .map(|rule| rule.token)
    }

    /// Stylesheet binding highlight classes to the theme's variables.
    ///
    /// Rules are scoped under the theme name, which the renderer puts on the
    /// `<pre>` element.
    pub fn stylesheet(&self) -> String {
        let mut css = String::with_capacity(2048);
        let root = self.name;

        let _ = writeln!(
            css,
            ".{root} {{ color: var(--code-fg); background-color: var(--code-bg); }}"
        );
        for rule in self.rules {
            let selectors = rule
                .scopes
                .iter()
                .map(|scope| format!(".{root} {}", scope_selector(scope)))
                .collect::<Vec<_>>()
                .join(",\n");
            let _ = writeln!(css, "{selectors} {{ color: var({}); }}", rule.token.var());
        }
        css
    }
}

/// `entity.name.function` → `.hl-entity.hl-name.hl-function`
fn scope_selector(scope: &str) -> String {
    scope
        .split('.')
        .map(|atom| format!(".{CLASS_PREFIX}{atom}"))
        .collect()
}

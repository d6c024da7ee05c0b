//! Markdown → HTML rendering for lesson bodies.
//!
//! Standard markdown goes through pulldown-cmark. Code blocks are pulled out
//! of the event stream and replaced with a highlighted block carrying a
//! language label and a copy button:
//!
//! ```html
//! <div class="code-block-wrapper">
//!   <div class="code-header">
//!     <span class="code-lang">dart</span>
//!     <button class="copy-btn" ...><svg>...</svg></button>
//!   </div>
//!   <pre class="code-highlight css-variables" tabindex="0"><code>...</code></pre>
//! </div>
//! ```

pub mod highlight;
pub mod theme;

pub use highlight::Highlighter;
pub use theme::CodeTheme;

use crate::log;
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, html::push_html};
use std::{fmt::Write, sync::Arc};
use thiserror::Error;

/// Label of a code block without a language tag.
pub const DEFAULT_LABEL: &str = "text";

const COPY_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24" aria-hidden="true"><path fill="currentColor" d="M16 1H4c-1.1 0-2 .9-2 2v14h2V3h12zm3 4H8c-1.1 0-2 .9-2 2v14c0 1.1.9 2 2 2h11c1.1 0 2-.9 2-2V7c0-1.1-.9-2-2-2m0 16H8V7h11z"/></svg>"#;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown code theme `{0}`")]
    UnknownTheme(String),

    #[error("language `{0}` is not in the highlight set")]
    UnsupportedLanguage(String),

    #[error("no grammar for configured language `{0}`")]
    UnknownLanguage(String),

    #[error("failed to load grammar: {0}")]
    Grammar(String),

    #[error("highlighting failed")]
    Highlight(#[from] syntect::Error),
}

/// Lesson body renderer. Cloning shares the highlighter.
#[derive(Clone)]
pub struct Renderer {
    highlighter: Arc<Highlighter>,
}

impl Renderer {
    pub fn new(highlighter: Arc<Highlighter>) -> Self {
        Self { highlighter }
    }

    /// Render a markdown body with code blocks painted by `theme`.
    ///
    /// Only an unknown theme fails the call. A block in an unsupported
    /// language is emitted escaped and unhighlighted, keeping its label.
    pub fn render(&self, markdown: &str, theme: &str) -> Result<String, RenderError> {
        let theme =
            CodeTheme::by_name(theme).ok_or_else(|| RenderError::UnknownTheme(theme.to_owned()))?;

        let options =
            Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;

        let mut events = Vec::new();
        // (label, collected text) while inside a code block
        let mut block: Option<(String, String)> = None;

        for event in Parser::new_ext(markdown, options) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    block = Some((block_label(&kind), String::new()));
                }
                Event::Text(text) if block.is_some() => {
                    if let Some((_, code)) = block.as_mut() {
                        code.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((label, code)) = block.take() {
                        events.push(Event::Html(self.code_block(&label, &code, theme).into()));
                    }
                }
                other => events.push(other),
            }
        }

        let mut html = String::with_capacity(markdown.len() * 2);
        push_html(&mut html, events.into_iter());
        Ok(html)
    }

    fn code_block(&self, label: &str, code: &str, theme: &CodeTheme) -> String {
        let body = match self.highlighter.highlight(code, label) {
            Ok(body) => body,
            Err(err) => {
                log!("render"; "{err}, rendering `{label}` block as plain text");
                escape_html(code)
            }
        };

        let mut html = String::with_capacity(body.len() + 512);
        let _ = write!(
            html,
            concat!(
                r#"<div class="code-block-wrapper">"#,
                r#"<div class="code-header">"#,
                r#"<span class="code-lang">{label}</span>"#,
                r#"<button class="copy-btn" type="button" aria-label="Копировать код" title="Скопировать">{icon}</button>"#,
                r#"</div>"#,
                r#"<pre class="code-highlight {theme}" tabindex="0"><code>{body}</code></pre>"#,
                r#"</div>"#,
                "\n"
            ),
            label = escape_html(label),
            icon = COPY_ICON,
            theme = theme.name(),
            body = body,
        );
        html
    }
}

/// First word of a fence info string, or [`DEFAULT_LABEL`].
fn block_label(kind: &CodeBlockKind) -> String {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .map(|word| word.split(',').next().unwrap_or(word))
            .filter(|word| !word.is_empty())
            .unwrap_or(DEFAULT_LABEL)
            .to_owned(),
        CodeBlockKind::Indented => DEFAULT_LABEL.to_owned(),
    }
}

/// Escape text for HTML element content and attribute values.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + s.len() / 8);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

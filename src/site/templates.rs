//! HTML templates.
//!
//! Templates are embedded at compile time and filled in one pass, so a
//! `{name}` appearing inside a substituted value is never expanded again.

use crate::{
    content::{Chapter, Post},
    render::escape_html,
    settings::Settings,
    ui::UiState,
};
use std::fmt::Write;

const LAYOUT_TEMPLATE: &str = include_str!("../embed/templates/layout.html");
const LESSON_TEMPLATE: &str = include_str!("../embed/templates/lesson.html");
pub const SITE_CSS: &str = include_str!("../embed/templates/site.css");

/// Everything the layout needs besides the page body.
pub struct Layout<'a> {
    pub lang: &'a str,
    pub site_title: &'a str,
    /// Page title; the site title alone when `None`.
    pub page_title: Option<&'a str>,
    pub description: &'a str,
    /// Pre-rendered `<html>` attributes (leading space included).
    pub root_attributes: &'a str,
    pub code_css: &'a str,
    pub search_index: &'a str,
    pub settings: &'a Settings,
    pub ui: UiState,
}

impl Layout<'_> {
    /// Wrap `content` (already HTML) into a full page.
    pub fn page(&self, content: &str) -> String {
        let page_title = match self.page_title {
            Some(title) if !title.is_empty() => format!("{title} | {}", self.site_title),
            _ => self.site_title.to_owned(),
        };
        let s = self.settings;
        let hidden = |open: bool| if open { "" } else { " hidden" };

        fill(
            LAYOUT_TEMPLATE,
            &[
                ("lang", &escape_html(self.lang)),
                ("root_attributes", self.root_attributes),
                ("page_title", &escape_html(&page_title)),
                ("site_title", &escape_html(self.site_title)),
                ("description", &escape_html(self.description)),
                ("site_css", SITE_CSS),
                ("code_css", self.code_css),
                ("search_index", &escape_html(self.search_index)),
                ("search_hidden", hidden(self.ui.is_search_open())),
                ("settings_hidden", hidden(self.ui.is_settings_open())),
                ("search_expanded", bool_str(self.ui.is_search_open())),
                ("settings_expanded", bool_str(self.ui.is_settings_open())),
                ("theme", s.theme.as_str()),
                ("font_size", &s.font_size.to_string()),
                ("letter_spacing", &s.letter_spacing.to_string()),
                ("line_height", &s.line_height.to_string()),
                ("code_theme", s.code_theme.as_str()),
                ("code_scheme", &escape_html(&s.code_scheme)),
                ("code_font_size", &s.code_font_size.to_string()),
                ("code_letter_spacing", &s.code_letter_spacing.to_string()),
                ("code_line_height", &s.code_line_height.to_string()),
                ("content", content),
            ],
        )
    }
}

const fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Home page body: intro plus a few featured lessons.
pub fn home(title: &str, description: &str, featured: &[&Post]) -> String {
    let mut html = String::with_capacity(1024);
    let _ = write!(
        html,
        r#"<section class="hero"><h1>{}</h1><p>{}</p><a class="button" href="/rubricator">Все уроки</a></section>"#,
        escape_html(title),
        escape_html(description),
    );
    if !featured.is_empty() {
        html.push_str(r#"<section class="featured"><h2>Популярные уроки</h2><ul class="lesson-list">"#);
        for post in featured {
            html.push_str(&lesson_card(post));
        }
        html.push_str("</ul></section>");
    }
    html
}

/// Rubricator body: every chapter with its ordered lessons.
pub fn rubricator(chapters: &[Chapter]) -> String {
    let mut html = String::with_capacity(4096);
    html.push_str(r#"<h1>Рубрикатор</h1>"#);
    if chapters.is_empty() {
        html.push_str(r#"<p class="empty">Уроков пока нет.</p>"#);
    }
    for chapter in chapters {
        let _ = write!(
            html,
            r#"<section class="chapter" id="{}"><h2>{}</h2><ol class="lesson-list">"#,
            escape_html(&chapter.id),
            escape_html(&chapter.title),
        );
        for post in &chapter.posts {
            html.push_str(&lesson_card(post));
        }
        html.push_str("</ol></section>");
    }
    html
}

/// Lesson body around the rendered markdown.
pub fn lesson(post: &Post, chapter_title: &str, body: &str) -> String {
    fill(
        LESSON_TEMPLATE,
        &[
            ("chapter_id", &escape_html(&post.chapter)),
            ("chapter_title", &escape_html(chapter_title)),
            ("title", &escape_html(&post.title)),
            ("date", &escape_html(&post.date)),
            ("tags", &tag_list(&post.tags)),
            ("body", body),
        ],
    )
}

pub fn not_found() -> String {
    r#"<section class="not-found"><h1>404</h1><p>Урок не найден.</p><a href="/rubricator">К списку уроков</a></section>"#.to_owned()
}

fn lesson_card(post: &Post) -> String {
    let mut html = String::with_capacity(256);
    let _ = write!(
        html,
        r#"<li class="lesson-card"><a href="/lessons/{}">{}</a>"#,
        urlencoding::encode(&post.slug),
        escape_html(&post.title),
    );
    if !post.description.is_empty() {
        let _ = write!(html, "<p>{}</p>", escape_html(&post.description));
    }
    if !post.tags.is_empty() {
        let _ = write!(html, r#"<ul class="tags">{}</ul>"#, tag_list(&post.tags));
    }
    html.push_str("</li>");
    html
}

fn tag_list(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("<li>#{}</li>", escape_html(tag)))
        .collect()
}

/// Single-pass `{name}` substitution. Unknown names are left as is.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let extra: usize = vars.iter().map(|(_, value)| value.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open + 1..];
        let value = tail.find('}').and_then(|close| {
            let name = &tail[..close];
            vars.iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &tail[close + 1..];
            }
            None => {
                out.push('{');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(slug: &str, title: &str) -> Post {
        Post {
            slug: slug.into(),
            title: title.into(),
            date: "2024-01-15".into(),
            description: "Short".into(),
            tags: vec!["dart".into()],
            order: 1,
            chapter: "02-dart-basics".into(),
            content: String::new(),
        }
    }

    fn layout<'a>(settings: &'a Settings, ui: UiState) -> Layout<'a> {
        Layout {
            lang: "ru",
            site_title: "EasyFlutter",
            page_title: Some("Variables"),
            description: "Course",
            root_attributes: r#" data-theme="dark""#,
            code_css: ".css-variables {}",
            search_index: "/search-index.json",
            settings,
            ui,
        }
    }

    #[test]
    fn test_fill_single_pass() {
        let out = fill("<p>{a}</p><p>{b}</p>", &[("a", "{b}"), ("b", "x")]);
        assert_eq!(out, "<p>{b}</p><p>x</p>");
    }

    #[test]
    fn test_fill_keeps_unknown_and_unclosed() {
        assert_eq!(fill("a {x} {", &[]), "a {x} {");
        assert_eq!(fill("css { color: red }", &[("color", "no")]), "css { color: red }");
    }

    #[test]
    fn test_layout_page() {
        let settings = Settings::default();
        let html = layout(&settings, UiState::new()).page("<p>Body</p>");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<html lang="ru" data-theme="dark">"#));
        assert!(html.contains("<title>Variables | EasyFlutter</title>"));
        assert!(html.contains("<p>Body</p>"));
        assert!(html.contains(".css-variables {}"));
        assert!(html.contains(r#"value="16""#));
        assert!(html.contains("Тема кода: dark"));
        assert!(!html.contains("{content}"));
    }

    #[test]
    fn test_layout_panels_follow_ui_state() {
        let settings = Settings::default();

        let closed = layout(&settings, UiState::new()).page("");
        assert!(closed.contains(r#"data-index="/search-index.json" hidden>"#));
        assert!(closed.contains(r#"id="settings-panel" hidden>"#));

        let search = layout(&settings, UiState::from_panel_query(Some("search"))).page("");
        assert!(search.contains(r#"data-index="/search-index.json">"#));
        assert!(search.contains(r#"id="settings-panel" hidden>"#));
        assert!(search.contains(r#"data-panel="search" aria-expanded="true""#));
    }

    #[test]
    fn test_home() {
        let a = post("a", "First");
        let html = home("EasyFlutter", "Learn", &[&a]);
        assert!(html.contains("<h1>EasyFlutter</h1>"));
        assert!(html.contains(r#"<a href="/lessons/a">First</a>"#));

        let empty = home("EasyFlutter", "Learn", &[]);
        assert!(!empty.contains("featured"));
    }

    #[test]
    fn test_rubricator() {
        let chapters = vec![Chapter {
            id: "02-dart-basics".into(),
            title: "Основы Dart".into(),
            posts: vec![post("variables", "Variables"), post("functions", "Functions")],
        }];
        let html = rubricator(&chapters);

        assert!(html.contains(r#"<section class="chapter" id="02-dart-basics"><h2>Основы Dart</h2>"#));
        let first = html.find("/lessons/variables").unwrap();
        let second = html.find("/lessons/functions").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_lesson_escapes_metadata() {
        let mut p = post("x", "<b>Bold</b>");
        p.tags = vec!["a&b".into()];
        let html = lesson(&p, "Основы Dart", "<p>rendered</p>");

        assert!(html.contains("<h1>&lt;b&gt;Bold&lt;/b&gt;</h1>"));
        assert!(html.contains("<li>#a&amp;b</li>"));
        assert!(html.contains("<p>rendered</p>"));
        assert!(html.contains(r#"href="/rubricator#02-dart-basics""#));
    }
}

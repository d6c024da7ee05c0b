//! Site pages.
//!
//! [`Site`] is built once per process (build or serve) and renders every
//! route from memory. It is `Sync`, so build workers share one instance.

pub mod templates;

use crate::{
    config::SiteConfig,
    content::{ChapterTitles, Post, PostRepository},
    log,
    render::{CodeTheme, Highlighter, RenderError, Renderer},
    settings::{ExecutionContext, FileStorage, RootElement, Settings, SettingsStore},
    ui::UiState,
};
use anyhow::{Context, Result};
use rand::Rng;
use std::sync::Arc;
use templates::Layout;

pub struct Site<'a> {
    config: &'a SiteConfig,
    repo: PostRepository,
    renderer: Renderer,
    theme: &'static CodeTheme,
    code_css: String,
    settings: Settings,
    root_attributes: String,
}

impl<'a> Site<'a> {
    /// Load content, the highlighter and the persisted reader settings.
    pub fn load(config: &'a SiteConfig) -> Result<Self> {
        let titles = ChapterTitles::with_overrides(config.chapters.clone());
        let repo = PostRepository::load(&config.build.content, titles)
            .with_context(|| format!("Failed to load lessons from {}", config.build.content.display()))?;

        let highlighter = Highlighter::new(&config.build.highlight)
            .context("Failed to initialize syntax highlighter")?;

        let mut store = SettingsStore::new(
            ExecutionContext::Server,
            &config.settings.key,
            FileStorage::new(&config.settings.path),
            RootElement::new(),
        );
        store.load();
        store.apply();
        let settings = store.settings().clone();

        Self::new(config, repo, Renderer::new(Arc::new(highlighter)), settings, &store.into_surface())
    }

    /// Assemble a site from already loaded parts.
    pub fn new(
        config: &'a SiteConfig,
        repo: PostRepository,
        renderer: Renderer,
        settings: Settings,
        root: &RootElement,
    ) -> Result<Self> {
        let theme_name = &config.build.highlight.theme;
        let theme = CodeTheme::by_name(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(theme_name.clone()))?;

        Ok(Self {
            config,
            repo,
            renderer,
            theme,
            code_css: theme.stylesheet(),
            settings,
            root_attributes: root.html_attributes(),
        })
    }

    pub fn config(&self) -> &SiteConfig {
        self.config
    }

    pub fn repo(&self) -> &PostRepository {
        &self.repo
    }

    fn layout<'p>(&'p self, page_title: Option<&'p str>, description: &'p str, ui: UiState) -> Layout<'p> {
        Layout {
            lang: &self.config.base.language,
            site_title: &self.config.base.title,
            page_title,
            description,
            root_attributes: &self.root_attributes,
            code_css: &self.code_css,
            search_index: self.search_index_url(),
            settings: &self.settings,
            ui,
        }
    }

    fn search_index_url(&self) -> &str {
        if self.config.build.search.enable {
            "/search-index.json"
        } else {
            ""
        }
    }

    /// `/`
    pub fn home_page<R: Rng + ?Sized>(&self, ui: UiState, rng: &mut R) -> String {
        let base = &self.config.base;
        let featured = self.repo.featured(self.config.build.featured, rng);
        let body = templates::home(&base.title, &base.description, &featured);
        self.layout(None, &base.description, ui).page(&body)
    }

    /// `/rubricator`
    pub fn rubricator_page(&self, ui: UiState) -> String {
        let body = templates::rubricator(&self.repo.grouped_posts());
        self.layout(Some("Рубрикатор"), &self.config.base.description, ui)
            .page(&body)
    }

    /// `/lessons/<slug>`. `Ok(None)` when no lesson has that slug.
    pub fn lesson_page(&self, slug: &str, ui: UiState) -> Result<Option<String>, RenderError> {
        let Some(post) = self.repo.post_by_slug(slug) else {
            return Ok(None);
        };
        self.render_lesson(post, ui).map(Some)
    }

    pub fn render_lesson(&self, post: &Post, ui: UiState) -> Result<String, RenderError> {
        let body = self.renderer.render(&post.content, self.theme.name())?;
        let chapter_title = self.repo.chapter_title(&post.chapter);
        let html = templates::lesson(post, chapter_title, &body);
        Ok(self.layout(Some(&post.title), &post.description, ui).page(&html))
    }

    /// Page served for unknown routes and missing lessons.
    pub fn not_found_page(&self, ui: UiState) -> String {
        self.layout(Some("404"), &self.config.base.description, ui)
            .page(&templates::not_found())
    }

    /// Log a one-line summary of what was loaded.
    pub fn log_summary(&self) {
        if self.repo.is_empty() {
            log!("warn"; "no lessons found in {}", self.config.build.content.display());
            return;
        }
        let chapters = self.repo.grouped_posts().len();
        log!("content"; "{} lessons in {} chapters", self.repo.len(), chapters);
    }
}

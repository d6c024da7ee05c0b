//! In-memory lesson repository.
//!
//! Built once from the loader output. Queries never touch the filesystem.

use super::loader::{self, SourceFile};
use super::order::{ChapterTitles, derive_order};
use super::ContentError;
use crate::log;
use rand::{Rng, seq::SliceRandom};
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::{collections::BTreeMap, path::Path};

/// A published lesson.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub date: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Position inside the chapter (front matter `order` or file name prefix).
    pub order: i64,
    /// Chapter id, i.e. the folder name.
    pub chapter: String,
    /// Raw markdown body.
    pub content: String,
}

impl Post {
    /// Build a post from a source file. `None` when the slug is missing or empty.
    pub fn from_source(source: SourceFile) -> Option<Self> {
        let SourceFile {
            file_name,
            chapter,
            front_matter: meta,
            body,
            ..
        } = source;

        let slug = meta.slug.filter(|slug| !slug.is_empty())?;

        Some(Self {
            slug,
            title: meta.title.unwrap_or_default(),
            date: meta.date.unwrap_or_default(),
            description: meta.description.unwrap_or_default(),
            tags: meta.tags.unwrap_or_default(),
            order: meta.order.unwrap_or_else(|| derive_order(&file_name)),
            chapter,
            content: body,
        })
    }
}

/// Lessons of one chapter, sorted by `order`.
#[derive(Debug, Clone, Serialize)]
pub struct Chapter {
    pub id: String,
    pub title: String,
    pub posts: Vec<Post>,
}

/// Entry of the client-side search index. Never carries the lesson body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchEntry {
    pub title: String,
    pub slug: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Query layer over all published lessons.
#[derive(Debug, Clone, Default)]
pub struct PostRepository {
    /// Discovery order.
    posts: Vec<Post>,
    /// slug → index into `posts`
    by_slug: FxHashMap<String, usize>,
    titles: ChapterTitles,
}

impl PostRepository {
    /// Load every lesson under `root`.
    pub fn load(root: &Path, titles: ChapterTitles) -> Result<Self, ContentError> {
        let sources = loader::load_sources(root)?;
        let repo = Self::from_sources(sources, titles);
        log!("content"; "loaded {} lessons from {}", repo.len(), root.display());
        Ok(repo)
    }

    /// Build the repository from already loaded sources.
    ///
    /// Sources without a slug, or whose slug is not a single path segment,
    /// are dropped. When two sources share a slug the first one wins.
    pub fn from_sources(sources: Vec<SourceFile>, titles: ChapterTitles) -> Self {
        let mut posts = Vec::with_capacity(sources.len());
        let mut by_slug = FxHashMap::default();

        for source in sources {
            let path = source.path.clone();
            let Some(post) = Post::from_source(source) else {
                log!("warn"; "{}: missing `slug`, skipped", path.display());
                continue;
            };
            if !is_path_segment(&post.slug) {
                log!("warn"; "{}: slug `{}` is not usable as a path, skipped", path.display(), post.slug);
                continue;
            }
            if by_slug.contains_key(&post.slug) {
                log!("warn"; "{}: duplicate slug `{}`, skipped", path.display(), post.slug);
                continue;
            }
            by_slug.insert(post.slug.clone(), posts.len());
            posts.push(post);
        }

        Self {
            posts,
            by_slug,
            titles,
        }
    }

    /// Every published lesson, in discovery order.
    pub fn all_posts(&self) -> &[Post] {
        &self.posts
    }

    /// Lookup by slug. `None` means "not found".
    pub fn post_by_slug(&self, slug: &str) -> Option<&Post> {
        self.by_slug.get(slug).map(|&index| &self.posts[index])
    }

    /// Lessons grouped by chapter.
    ///
    /// Chapters are sorted by id; lessons inside a chapter by `order`, ties
    /// keep discovery order.
    pub fn grouped_posts(&self) -> Vec<Chapter> {
        let mut grouped: BTreeMap<&str, Vec<Post>> = BTreeMap::new();
        for post in &self.posts {
            grouped.entry(&post.chapter).or_default().push(post.clone());
        }

        grouped
            .into_iter()
            .map(|(id, mut posts)| {
                posts.sort_by_key(|post| post.order);
                Chapter {
                    id: id.to_owned(),
                    title: self.titles.title(id).to_owned(),
                    posts,
                }
            })
            .collect()
    }

    /// Projection used by the client-side search.
    pub fn search_index(&self) -> Vec<SearchEntry> {
        self.posts
            .iter()
            .map(|post| SearchEntry {
                title: post.title.clone(),
                slug: post.slug.clone(),
                tags: post.tags.clone(),
                description: post.description.clone(),
            })
            .collect()
    }

    /// Random sample of up to `count` distinct lessons for the home page.
    pub fn featured<R: Rng + ?Sized>(&self, count: usize, rng: &mut R) -> Vec<&Post> {
        self.posts.choose_multiple(rng, count).collect()
    }

    /// Display title of a chapter id.
    pub fn chapter_title<'a>(&'a self, id: &'a str) -> &'a str {
        self.titles.title(id)
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}

/// A slug becomes one directory name under `lessons/`.
fn is_path_segment(slug: &str) -> bool {
    !slug.contains(['/', '\\']) && slug != "." && slug != ".."
}

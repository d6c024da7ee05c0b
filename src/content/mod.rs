//! Lesson content pipeline.
//!
//! ```text
//! load_sources() ──► Post::from_source() ──► PostRepository
//!   (walkdir +          (slug check,           (all / by slug /
//!    front matter)       order, chapter)         grouped / search)
//! ```

pub mod frontmatter;
pub mod loader;
pub mod order;
pub mod repo;

pub use order::ChapterTitles;
pub use repo::{Chapter, Post, PostRepository};

use std::path::PathBuf;
use thiserror::Error;

/// Failures of the loading pass. Any of them aborts the whole load.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to read `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to walk content directory")]
    Walk(#[from] walkdir::Error),

    #[error("invalid front matter in `{0}`")]
    FrontMatter(PathBuf, #[source] frontmatter::FrontMatterError),
}

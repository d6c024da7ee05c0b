//! Client-side search index.
//!
//! A JSON array of `{title, slug, tags, description}`, one per lesson.
//! Lesson bodies are never included.

use crate::{config::SiteConfig, content::PostRepository, log};
use anyhow::{Context, Result};
use std::fs;

/// Serialize the search index of `repo`.
pub fn search_index_json(repo: &PostRepository) -> Result<String> {
    serde_json::to_string(&repo.search_index()).context("Failed to serialize search index")
}

/// Write the search index if enabled in config.
pub fn build_search_index(config: &SiteConfig, repo: &PostRepository) -> Result<()> {
    if !config.build.search.enable {
        return Ok(());
    }
    let json = search_index_json(repo)?;
    let path = config.search_index_path();
    fs::write(&path, json)
        .with_context(|| format!("Failed to write search index to {}", path.display()))?;

    log!("search"; "{} entries", repo.len());
    Ok(())
}
